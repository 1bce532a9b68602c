use crate::constants::{DEFAULT_API_BASE_URL, DEFAULT_SEARCH_LIMIT, DEFAULT_SUGGESTED_PRESELECT};
use crate::errors::{AppError, AppResult};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use url::Url;

/// Resolved configuration with all values filled in (no Options).
///
/// Can be deserialized by the TOML loader; missing keys take their defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolvedConfig {
    /// Base URL of the tenders backend
    pub api_base_url: String,
    /// Maximum number of tenders requested per search
    pub search_limit: usize,
    /// Timeout applied to every request, in seconds
    pub request_timeout_secs: u64,
    /// Timeout for the CPV population request, which scrapes every tender
    pub populate_timeout_secs: u64,
    /// Number of suggested regions preselected when starting from CPV codes
    pub suggested_region_preselect: usize,
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            request_timeout_secs: 30,
            populate_timeout_secs: 300,
            suggested_region_preselect: DEFAULT_SUGGESTED_PRESELECT,
            log_filter: "info".to_string(),
        }
    }
}

impl ResolvedConfig {
    /// Loads and validates configuration from a TOML file.
    ///
    /// Rejects unknown keys to prevent typos from being silently ignored.
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file cannot be read and `ConfigError` if the TOML
    /// is malformed, has unknown keys, or fails [`ResolvedConfig::validate`].
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path)?;
        let config: ResolvedConfig = toml::from_str(&contents)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks limits are positive and the base URL is an absolute http(s) URL.
    pub fn validate(&self) -> AppResult<()> {
        if self.search_limit == 0 {
            return Err(AppError::ConfigError(
                "Search limit must be greater than 0".into(),
            ));
        }
        if self.request_timeout_secs == 0 || self.populate_timeout_secs == 0 {
            return Err(AppError::ConfigError(
                "Timeouts must be greater than 0".into(),
            ));
        }
        let url = Url::parse(&self.api_base_url)
            .map_err(|e| AppError::ConfigError(format!("Invalid api_base_url: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::ConfigError(format!(
                "api_base_url must use http or https, got: {}",
                url.scheme()
            )));
        }
        Ok(())
    }
}
