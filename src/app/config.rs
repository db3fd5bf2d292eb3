use std::fmt;

use reqwest::Url;

use crate::adapters::weatherxm::{Credentials, DEFAULT_HOST};
use crate::app::AppError;

#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub owned_only: bool,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub http_bind: String,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("owned_only", &self.owned_only)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("http_bind", &self.http_bind)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        if let Err(error) = dotenvy::dotenv()
            && !error.not_found()
        {
            return Err(AppError::config(format!("failed to read .env file: {error}")));
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = non_empty(&lookup, "WXM_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host = validate_host(&host)?;

        let username = non_empty(&lookup, "WXM_USERNAME")
            .ok_or_else(|| AppError::config("WXM_USERNAME is required"))?;
        let password = lookup("WXM_PASSWORD")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::config("WXM_PASSWORD is required"))?;

        Ok(Self {
            host,
            username,
            password,
            owned_only: parse_bool_or_default(&lookup, "WXM_OWNED_ONLY", true)?,
            poll_interval_secs: parse_positive_or_default(&lookup, "POLL_INTERVAL_SECS", 300)?,
            request_timeout_secs: parse_positive_or_default(&lookup, "REQUEST_TIMEOUT_SECS", 30)?,
            http_bind: non_empty(&lookup, "HTTP_BIND")
                .unwrap_or_else(|| "0.0.0.0:8080".to_string()),
        })
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_host(raw: &str) -> Result<String, AppError> {
    let url = Url::parse(raw)
        .map_err(|error| AppError::config(format!("WXM_HOST is not a valid URL: {error}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::config("WXM_HOST must use http or https"));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

fn parse_positive_or_default<F>(lookup: &F, key: &str, default: u64) -> Result<u64, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|value| *value > 0)
            .ok_or_else(|| AppError::config(format!("{key} must be a positive number"))),
        None => Ok(default),
    }
}

fn parse_bool_or_default<F>(lookup: &F, key: &str, default: bool) -> Result<bool, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(AppError::config(format!("{key} must be a boolean"))),
        },
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::AppConfig;

    fn required(key: &str) -> Option<String> {
        match key {
            "WXM_USERNAME" => Some("user@example.com".to_string()),
            "WXM_PASSWORD" => Some("secret".to_string()),
            _ => None,
        }
    }

    #[test]
    fn rejects_missing_username() {
        let result = AppConfig::from_lookup(|key| match key {
            "WXM_PASSWORD" => Some("secret".to_string()),
            _ => None,
        });

        assert_eq!(
            result.unwrap_err().to_string(),
            "invalid configuration: WXM_USERNAME is required"
        );
    }

    #[test]
    fn applies_defaults_for_optional_fields() {
        let config = AppConfig::from_lookup(required).expect("config should be valid");

        assert_eq!(config.host, "https://api.weatherxm.com");
        assert_eq!(config.username, "user@example.com");
        assert!(config.owned_only);
        assert_eq!(config.poll_interval_secs, 300);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.http_bind, "0.0.0.0:8080");
    }

    #[test]
    fn trims_trailing_slash_and_reads_flags() {
        let config = AppConfig::from_lookup(|key| match key {
            "WXM_HOST" => Some("http://localhost:9000/".to_string()),
            "WXM_OWNED_ONLY" => Some("false".to_string()),
            "POLL_INTERVAL_SECS" => Some("60".to_string()),
            other => required(other),
        })
        .expect("config should be valid");

        assert_eq!(config.host, "http://localhost:9000");
        assert!(!config.owned_only);
        assert_eq!(config.poll_interval_secs, 60);
    }

    #[test]
    fn rejects_non_http_host() {
        let result = AppConfig::from_lookup(|key| match key {
            "WXM_HOST" => Some("ftp://api.weatherxm.com".to_string()),
            other => required(other),
        });

        assert_eq!(
            result.unwrap_err().to_string(),
            "invalid configuration: WXM_HOST must use http or https"
        );
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let result = AppConfig::from_lookup(|key| match key {
            "POLL_INTERVAL_SECS" => Some("0".to_string()),
            other => required(other),
        });

        assert_eq!(
            result.unwrap_err().to_string(),
            "invalid configuration: POLL_INTERVAL_SECS must be a positive number"
        );
    }

    #[test]
    fn rejects_invalid_boolean() {
        let result = AppConfig::from_lookup(|key| match key {
            "WXM_OWNED_ONLY" => Some("maybe".to_string()),
            other => required(other),
        });

        assert!(result.is_err());
    }

    #[test]
    fn debug_output_redacts_password() {
        let config = AppConfig::from_lookup(required).expect("config should be valid");
        let rendered = format!("{config:?}");

        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
