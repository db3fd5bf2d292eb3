pub mod config;
pub mod coordinator;
pub mod error;
mod logging;
pub mod runtime;
pub mod services;
pub mod status_report;

pub use error::AppError;

fn bootstrap() -> Result<config::AppConfig, AppError> {
    logging::init()?;

    let config = config::AppConfig::from_env()?;

    tracing::info!(
        host = %config.host,
        username = %config.username,
        owned_only = config.owned_only,
        poll_interval_secs = config.poll_interval_secs,
        request_timeout_secs = config.request_timeout_secs,
        http_bind = %config.http_bind,
        "application bootstrap initialized"
    );

    Ok(config)
}

pub fn run_service() -> Result<(), AppError> {
    runtime::run(bootstrap()?)
}

pub fn run_status() -> Result<(), AppError> {
    runtime::run_once(bootstrap()?)
}
