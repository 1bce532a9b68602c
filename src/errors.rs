use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The user attempted a transition with insufficient input
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// The action is not available in the current wizard step
    #[error("Cannot {action} while in step '{step}'")]
    InvalidTransition { action: String, step: String },
    /// Transport failure or non-2xx response
    #[error("Network error: {0}")]
    NetworkError(String),
    /// A reachable backend reported a domain error
    #[error("Backend error: {0}")]
    BackendError(String),
    /// Failed to decode a response body
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    UrlError(String),
    /// Invalid input format
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Configuration could not be loaded or failed validation
    #[error("Config error: {0}")]
    ConfigError(String),
    /// IO operation failed
    #[error("IO error: {0}")]
    IoError(String),
}

impl AppError {
    /// Returns `true` for failures coming from the remote backend.
    ///
    /// These are shown as transient notices; repeating the same action is the retry.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            AppError::NetworkError(_) | AppError::BackendError(_) | AppError::ParseError(_)
        )
    }
}

// Conversion implementations for common errors
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::NetworkError(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::UrlError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ParseError(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

// Custom type alias for Results in this application
pub type AppResult<T> = Result<T, AppError>;
