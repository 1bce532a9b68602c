use crate::errors::{AppError, AppResult};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber, writing compact lines to stderr.
///
/// `RUST_LOG` takes precedence; `fallback` is used when it is unset or invalid.
///
/// # Errors
///
/// Returns `ConfigError` if `fallback` is not a valid filter and
/// `IoError` if a global subscriber is already installed.
pub fn init(fallback: &str) -> AppResult<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(fallback).map_err(|e| {
            AppError::ConfigError(format!("Invalid log filter '{fallback}': {e}"))
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|e| AppError::IoError(format!("Failed to install log subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_fallback_filter() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert!(matches!(
            init("licitaciones=loudest"),
            Err(AppError::ConfigError(_))
        ));
    }
}
