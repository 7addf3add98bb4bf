//! Sub-configuration structs with defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where generated images are written
    pub output_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("~/.chorus/output"),
        }
    }
}

/// Dispatch settings for retries and timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Max retry attempts per adapter for transient failures
    pub retry_attempts: u32,

    /// Base backoff delay between retries in milliseconds
    pub retry_delay_ms: u64,

    /// Per-call HTTP timeout in milliseconds
    pub call_timeout_ms: u64,

    /// Optional overall deadline per dispatch in milliseconds.
    /// Unset means a dispatch waits for every adapter to settle.
    pub deadline_ms: Option<u64>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            retry_delay_ms: 1000,
            call_timeout_ms: 60_000,
            deadline_ms: None,
        }
    }
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default report format ("text", "json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Per-provider configurations.
///
/// Each section is optional; asking for an unconfigured provider fails at
/// adapter construction, before anything is dispatched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Titan image generation configuration
    pub titan: Option<TitanConfig>,

    /// Stable Diffusion XL configuration
    pub stability: Option<StabilityConfig>,

    /// Anthropic text configuration
    pub anthropic: Option<AnthropicConfig>,

    /// OpenAI (or OpenAI-compatible) text configuration
    pub openai: Option<OpenAiConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            titan: Some(TitanConfig::default()),
            stability: Some(StabilityConfig::default()),
            anthropic: Some(AnthropicConfig::default()),
            openai: Some(OpenAiConfig::default()),
        }
    }
}

/// Titan image model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitanConfig {
    /// Model invocation endpoint
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model identifier
    pub model: String,
}

impl Default for TitanConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://bedrock-runtime.us-west-2.amazonaws.com".to_string(),
            api_key: "${BEDROCK_API_KEY}".to_string(),
            model: "amazon.titan-image-generator-v1".to_string(),
        }
    }
}

/// Stable Diffusion XL configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilityConfig {
    /// Model invocation endpoint
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// Optional style preset (e.g., "photographic")
    pub style_preset: Option<String>,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://bedrock-runtime.us-west-2.amazonaws.com".to_string(),
            api_key: "${BEDROCK_API_KEY}".to_string(),
            model: "stability.stable-diffusion-xl".to_string(),
            style_preset: None,
        }
    }
}

/// Anthropic text model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: "${ANTHROPIC_API_KEY}".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
        }
    }
}

/// OpenAI text model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Chat completions endpoint (any OpenAI-compatible backend works)
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}
