use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid API key")]
    AuthenticationError,

    #[error("Rate limit exceeded")]
    RateLimitError,

    #[error("The requested model has been decommissioned")]
    ModelDecommissioned,

    #[error("Remote API error: {status} - {body}")]
    RemoteError { status: u16, body: String },

    #[error("Invalid response from remote API: {message}")]
    InvalidResponse { message: String },

    #[error("Processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Remote,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl OrderError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            OrderError::ApiError(_) => ErrorCategory::Network,
            OrderError::AuthenticationError
            | OrderError::RateLimitError
            | OrderError::ModelDecommissioned
            | OrderError::RemoteError { .. }
            | OrderError::InvalidResponse { .. } => ErrorCategory::Remote,
            OrderError::ConfigError { .. }
            | OrderError::ConfigValidationError { .. }
            | OrderError::InvalidConfigValueError { .. }
            | OrderError::MissingConfigError { .. } => ErrorCategory::Configuration,
            OrderError::CsvError(_)
            | OrderError::SerializationError(_)
            | OrderError::ProcessingError { .. } => ErrorCategory::Data,
            OrderError::IoError(_) | OrderError::ZipError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 可以重試的錯誤
            OrderError::ApiError(_) | OrderError::RateLimitError => ErrorSeverity::Medium,
            OrderError::RemoteError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            OrderError::IoError(_) | OrderError::ZipError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.severity() == ErrorSeverity::Medium
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            OrderError::ApiError(_) => "Check the network connection and the API endpoint, or run with --mode fallback",
            OrderError::AuthenticationError => "Check your GROQ API key (GROQ_API_KEY or --api-key)",
            OrderError::RateLimitError => "Wait a moment and try again, or run with --mode fallback",
            OrderError::ModelDecommissioned => "Configure a currently supported model with --model",
            OrderError::RemoteError { .. } => "Retry later or run with --mode fallback",
            OrderError::InvalidResponse { .. } => "Run with --mode auto so the local parser is used when the model answer is unusable",
            OrderError::ConfigError { .. }
            | OrderError::ConfigValidationError { .. }
            | OrderError::InvalidConfigValueError { .. } => "Fix the configuration value and run again",
            OrderError::MissingConfigError { .. } => "Provide the missing configuration value",
            OrderError::IoError(_) => "Check that the input file exists and the output directory is writable",
            OrderError::ZipError(_) => "Check free disk space or disable archiving",
            OrderError::CsvError(_) | OrderError::SerializationError(_) => {
                "Re-run with --verbose and inspect the parsed orders"
            }
            OrderError::ProcessingError { .. } => "Check that the input contains exported chat messages",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            OrderError::AuthenticationError => {
                "Invalid API key. Please check your GROQ API key.".to_string()
            }
            OrderError::RateLimitError => {
                "Rate limit exceeded. Please try again later.".to_string()
            }
            OrderError::ModelDecommissioned => {
                "The AI model has been updated. Please choose a supported model and try again."
                    .to_string()
            }
            OrderError::RemoteError { status, body } => format!("API Error: {} - {}", status, body),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_errors_are_categorized() {
        assert_eq!(OrderError::AuthenticationError.category(), ErrorCategory::Remote);
        assert_eq!(OrderError::AuthenticationError.severity(), ErrorSeverity::High);
        assert!(OrderError::RateLimitError.is_retryable());

        let server_error = OrderError::RemoteError {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert!(server_error.is_retryable());
        assert_eq!(server_error.user_friendly_message(), "API Error: 503 - unavailable");
    }

    #[test]
    fn test_config_errors_are_not_retryable() {
        let err = OrderError::MissingConfigError {
            field: "api_key".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("api_key"));

        let unreadable = OrderError::ConfigError {
            message: "cannot read config file 'orders.toml'".to_string(),
        };
        assert_eq!(unreadable.category(), ErrorCategory::Configuration);
        assert!(!unreadable.is_retryable());
    }
}
