//! Logger and HTTP client construction.

use std::io::Write;
use std::time::Duration;

use colored::Colorize;
use log::LevelFilter;
use reqwest::ClientBuilder;

use crate::config::{LogFormat, HTTP_TIMEOUT_SECS};
use crate::error_handling::InitializationError;

/// Initializes the logger with the specified level and format.
///
/// Configures `env_logger` with custom formatting. The logger reads from
/// the `RUST_LOG` environment variable by default, but the provided `level`
/// overrides it; this allows `RUST_LOG=debug` for quick debugging while
/// still supporting explicit CLI control via `--log-level` / `--verbose`.
///
/// All log output goes to stderr, leaving stdout to the KML document.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if logger setup fails (e.g.
/// a second initialization in the same process).
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.filter_module("nearby_kml", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{{\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
                    record.level(),
                    record.target(),
                    serde_json::to_string(&record.args().to_string())
                        .unwrap_or_else(|_| "\"\"".into())
                )
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let level = record.level();
                let colored_level = match level {
                    log::Level::Error => level.to_string().red(),
                    log::Level::Warn => level.to_string().yellow(),
                    log::Level::Info => level.to_string().green(),
                    log::Level::Debug => level.to_string().blue(),
                    log::Level::Trace => level.to_string().purple(),
                };
                writeln!(
                    buf,
                    "{} [{}] {}",
                    record.target().cyan(),
                    colored_level,
                    record.args()
                )
            });
        }
    }

    // try_init() instead of init() so tests can initialize repeatedly.
    builder.try_init().map_err(InitializationError::from)?;
    Ok(())
}

/// Builds the HTTP client used for all nearby search requests: a shared
/// connection pool with a generous per-request timeout (continuation pages
/// can be slow to materialize server-side).
pub fn init_client() -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()?;
    Ok(client)
}

/// Reads the API credential from the environment.
pub fn resolve_api_key() -> Result<String, InitializationError> {
    match std::env::var(crate::config::API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(InitializationError::MissingApiKey(crate::config::API_KEY_ENV)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logger_does_not_panic_on_reinit() {
        let _ = env_logger::try_init();
        // A second initialization may fail, but must not panic.
        let _ = init_logger_with(LevelFilter::Info, LogFormat::Plain);
        let _ = init_logger_with(LevelFilter::Debug, LogFormat::Json);
    }

    #[test]
    fn init_client_builds() {
        assert!(init_client().is_ok());
    }
}
