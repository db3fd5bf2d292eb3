use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, Local, NaiveDate};
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::domain::models::{Device, ForecastDay};

pub const DEFAULT_HOST: &str = "https://api.weatherxm.com";

const API_PREFIX: [&str; 2] = ["api", "v1"];
const LOGIN_PATH: [&str; 2] = ["auth", "login"];
const REFRESH_PATH: [&str; 2] = ["auth", "refresh"];
const DEVICES_PATH: [&str; 2] = ["me", "devices"];
const FORECAST_WINDOW_DAYS: u64 = 7;
const DATE_FORMAT: &str = "%Y-%m-%d";

#[async_trait]
pub trait StationApi: Send + Sync + 'static {
    async fn is_authenticated(&self) -> bool;
    async fn authenticate(&self, username: &str, password: &str) -> Result<(), ApiError>;
    async fn get_devices(&self) -> Result<Vec<Device>, ApiError>;
    async fn get_forecast(&self, device_id: &str) -> Result<Vec<ForecastDay>, ApiError>;
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("request failed with status {status}: {body}")]
    Request { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn authentication<E: fmt::Display>(error: E) -> Self {
        Self::Authentication(error.to_string())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
struct TokenPair {
    #[serde(rename = "token")]
    access: String,
    #[serde(rename = "refreshToken")]
    refresh: String,
}

pub struct WeatherXmClient {
    base_url: String,
    http: Client,
    tokens: RwLock<Option<TokenPair>>,
    refresh_lock: Mutex<()>,
}

impl WeatherXmClient {
    pub fn new(host: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        let base_url = host.trim().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|error| ApiError::InvalidUrl(format!("{base_url}: {error}")))?;

        Ok(Self {
            base_url,
            http,
            tokens: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let pair = self
            .exchange(
                &LOGIN_PATH,
                &json!({ "username": username, "password": password }),
            )
            .await
            .inspect_err(|error| tracing::error!(error = %error, "WeatherXM login failed"))?;

        *self.tokens.write().await = Some(pair);
        tracing::info!(host = %self.base_url, "authenticated against WeatherXM API");
        Ok(())
    }

    /// Exchanges the refresh token for a new pair. Any failure clears the session, so the
    /// next request needs a fresh login instead of refreshing again.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.tokens.read().await.is_some()
    }

    /// A 401 triggers exactly one refresh and one retry of the original request.
    pub async fn request(
        &self,
        method: Method,
        path: &[&str],
        query: &[(&str, String)],
    ) -> Result<Value, ApiError> {
        let url = self.url(path)?;
        let access = self.access_token().await?;
        tracing::debug!(%method, path = url.path(), "sending WeatherXM request");

        let mut response = self.send(method.clone(), url.clone(), query, &access).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!(path = url.path(), "access token rejected; refreshing session");
            let renewed = self.renew_after_rejection(&access).await?;

            response = self.send(method, url.clone(), query, &renewed).await?;
            if response.status() == StatusCode::UNAUTHORIZED {
                tracing::warn!(path = url.path(), "refreshed access token was rejected as well");
                return Err(ApiError::authentication(format!(
                    "{} rejected the refreshed access token",
                    url.path()
                )));
            }
        }

        read_json(url.path(), response).await
    }

    pub async fn get_devices(&self) -> Result<Vec<Device>, ApiError> {
        let value = self.request(Method::GET, &DEVICES_PATH, &[]).await?;
        if value.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(value).map_err(ApiError::from)
    }

    pub async fn get_forecast_from(
        &self,
        device_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<ForecastDay>, ApiError> {
        let (from_date, to_date) = forecast_window(today);
        let [me, devices] = DEVICES_PATH;
        let value = self
            .request(
                Method::GET,
                &[me, devices, device_id, "forecast"],
                &[("fromDate", from_date), ("toDate", to_date)],
            )
            .await?;

        if value.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(value).map_err(ApiError::from)
    }

    pub async fn close(&self) {
        *self.tokens.write().await = None;
        tracing::info!(host = %self.base_url, "WeatherXM session closed");
    }

    async fn renew_after_rejection(&self, rejected: &str) -> Result<String, ApiError> {
        let _guard = self.refresh_lock.lock().await;

        let current = self
            .tokens
            .read()
            .await
            .as_ref()
            .map(|pair| pair.access.clone());
        match current {
            // another request refreshed while we waited for the lock
            Some(access) if access != rejected => return Ok(access),
            Some(_) => {}
            None => {
                return Err(ApiError::authentication(
                    "session was cleared by a failed token refresh",
                ));
            }
        }

        self.refresh_locked()
            .await
            .map_err(|error| ApiError::authentication(format!("token refresh failed: {error}")))?;
        self.access_token().await
    }

    async fn refresh_locked(&self) -> Result<(), ApiError> {
        let refresh_token = self
            .tokens
            .read()
            .await
            .as_ref()
            .map(|pair| pair.refresh.clone());

        let result = match refresh_token {
            Some(refresh_token) => {
                self.exchange(&REFRESH_PATH, &json!({ "refreshToken": refresh_token }))
                    .await
            }
            None => Err(ApiError::authentication("no refresh token available")),
        };

        let mut tokens = self.tokens.write().await;
        match result {
            Ok(pair) => {
                *tokens = Some(pair);
                tracing::debug!("WeatherXM access token refreshed");
                Ok(())
            }
            Err(error) => {
                *tokens = None;
                tracing::warn!(error = %error, "token refresh failed; session cleared");
                Err(error)
            }
        }
    }

    async fn access_token(&self) -> Result<String, ApiError> {
        self.tokens
            .read()
            .await
            .as_ref()
            .map(|pair| pair.access.clone())
            .ok_or_else(|| ApiError::authentication("not authenticated"))
    }

    async fn exchange(&self, path: &[&str], body: &Value) -> Result<TokenPair, ApiError> {
        let url = self.url(path)?;
        let response = self
            .http
            .post(url.clone())
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::authentication(format!(
                "{} returned status {}: {text}",
                url.path(),
                status.as_u16()
            )));
        }

        let pair: TokenPair = serde_json::from_str(&text)?;
        if pair.access.is_empty() || pair.refresh.is_empty() {
            return Err(ApiError::authentication(format!(
                "{} returned an empty token",
                url.path()
            )));
        }
        Ok(pair)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, String)],
        access: &str,
    ) -> Result<Response, ApiError> {
        self.http
            .request(method, url)
            .bearer_auth(access)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(ApiError::from)
    }

    // each segment is percent-encoded, so ids cannot escape their path position
    fn url(&self, path: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|error| ApiError::InvalidUrl(format!("{}: {error}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(path);
        Ok(url)
    }
}

#[async_trait]
impl StationApi for WeatherXmClient {
    async fn is_authenticated(&self) -> bool {
        WeatherXmClient::is_authenticated(self).await
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<(), ApiError> {
        WeatherXmClient::authenticate(self, username, password).await
    }

    async fn get_devices(&self) -> Result<Vec<Device>, ApiError> {
        WeatherXmClient::get_devices(self).await
    }

    async fn get_forecast(&self, device_id: &str) -> Result<Vec<ForecastDay>, ApiError> {
        self.get_forecast_from(device_id, Local::now().date_naive())
            .await
    }
}

pub fn forecast_window(today: NaiveDate) -> (String, String) {
    let until = today
        .checked_add_days(Days::new(FORECAST_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MAX);
    (
        today.format(DATE_FORMAT).to_string(),
        until.format(DATE_FORMAT).to_string(),
    )
}

async fn read_json(path: &str, response: Response) -> Result<Value, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::warn!(path, status = status.as_u16(), body = %body, "WeatherXM request failed");
        return Err(ApiError::Request {
            status: status.as_u16(),
            body,
        });
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(ApiError::from)
}
