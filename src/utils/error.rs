use thiserror::Error;

#[derive(Error, Debug)]
pub enum CdsError {
    #[error("Request to {endpoint} failed: {message}")]
    TransportError { endpoint: String, message: String },

    #[error("Request to {endpoint} returned status {status}")]
    StatusError { endpoint: String, status: u16 },

    #[error("Failed to decode response from {endpoint}: {message}")]
    DecodeError { endpoint: String, message: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transport,
    Decode,
    Configuration,
    Io,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CdsError {
    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        CdsError::TransportError {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn decode(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        CdsError::DecodeError {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CdsError::TransportError { .. } | CdsError::StatusError { .. } => {
                ErrorCategory::Transport
            }
            CdsError::DecodeError { .. } => ErrorCategory::Decode,
            CdsError::ConfigError { .. }
            | CdsError::InvalidConfigValueError { .. }
            | CdsError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CdsError::IoError(_) | CdsError::ZipError(_) | CdsError::CsvError(_) => {
                ErrorCategory::Io
            }
            CdsError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Transport => ErrorSeverity::Medium,
            ErrorCategory::Decode | ErrorCategory::Io => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Processing => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CdsError::TransportError { .. } => {
                "Check network connectivity to the fleet API and the configured host"
            }
            CdsError::StatusError { status: 401, .. } | CdsError::StatusError { status: 403, .. } => {
                "The auth token was rejected; refresh FXOSS_TOKEN and retry"
            }
            CdsError::StatusError { .. } => "The fleet API rejected the request; retry later",
            CdsError::DecodeError { .. } => {
                "The fleet API returned an unexpected body; check the API version"
            }
            CdsError::ConfigError { .. }
            | CdsError::InvalidConfigValueError { .. }
            | CdsError::MissingConfigError { .. } => {
                "Fix the configuration file or the FXOSS_* environment variables"
            }
            CdsError::IoError(_) | CdsError::ZipError(_) | CdsError::CsvError(_) => {
                "Make sure the output directory exists and is writable"
            }
            CdsError::ProcessingError { .. } => "Re-run with --verbose and inspect the logs",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Transport => format!("Could not reach the fleet API ({})", self),
            ErrorCategory::Decode => format!("Fleet API response was not understood ({})", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Io => format!("Could not write output: {}", self),
            ErrorCategory::Processing => format!("Report generation failed: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, CdsError>;
