//! Error types for the chorus comparison harness.
//!
//! Provider failures carry a kind so the dispatcher can record them as
//! labeled entries; only caller misuse (empty prompt, no providers) fails
//! a dispatch as a whole.

use thiserror::Error;

/// Top-level error type for chorus operations.
#[derive(Error, Debug)]
pub enum ChorusError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed dispatch input (caller misuse)
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// A provider named in the comparison has no config section
    #[error("Provider '{0}' is not configured (add a [providers.{0}] section)")]
    UnknownProvider(String),
}

/// Rejections of the dispatch call itself, raised before any adapter runs.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DispatchError {
    /// The prompt is empty or its modality hint matches no adapter
    #[error("Invalid prompt: {0}")]
    InvalidPrompt(String),

    /// The provider list is empty
    #[error("No providers to dispatch to")]
    NoProviders,
}

/// One adapter's failure for one call.
///
/// These never abort a comparison run: the normalizer converts them into
/// failure entries in the result set.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Bad or missing credentials
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// Rate limited by the provider (retryable)
    #[error("Rate limited: {message}")]
    Throttle { message: String },

    /// Malformed prompt or parameters (caller-fixable, not retried)
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Transient backend fault (retryable)
    #[error("Provider unavailable: {message}")]
    Unavailable { message: String },

    /// The call was still running when the dispatch deadline expired
    #[error("Timed out after {deadline_ms}ms")]
    Timeout { deadline_ms: u64 },

    /// Anything that could not be classified
    #[error("Provider error: {message}")]
    Unknown { message: String },
}

/// Error category, carried on failure entries in a comparison set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Auth,
    Throttle,
    InvalidRequest,
    Unavailable,
    Timeout,
    Unknown,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Auth => "auth",
            Self::Throttle => "throttle",
            Self::InvalidRequest => "invalid_request",
            Self::Unavailable => "unavailable",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

impl ProviderError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Throttle { .. } => ErrorKind::Throttle,
            Self::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            Self::Unavailable { .. } => ErrorKind::Unavailable,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// Whether another attempt could plausibly succeed.
    ///
    /// Rate limits and transient backend faults are retryable; auth and
    /// request errors propagate immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttle { .. } | Self::Unavailable { .. })
    }

    /// Classify an HTTP error status into the provider error taxonomy.
    ///
    /// 401/403 → Auth, 429 → Throttle, other 4xx → InvalidRequest,
    /// 5xx → Unavailable, anything else → Unknown.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => Self::Auth { message },
            429 => Self::Throttle { message },
            400..=499 => Self::InvalidRequest { message },
            500..=599 => Self::Unavailable { message },
            _ => Self::Unknown { message },
        }
    }

    /// Classify a transport-level failure (connect, DNS, request timeout).
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            Self::Unavailable {
                message: err.to_string(),
            }
        } else {
            Self::Unknown {
                message: err.to_string(),
            }
        }
    }
}

/// Convenience type alias for chorus results.
pub type Result<T> = std::result::Result<T, ChorusError>;

/// Convenience type alias for adapter call results.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
