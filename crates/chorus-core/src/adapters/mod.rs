//! Provider adapter trait and the factory that builds adapters from config.
//!
//! Each adapter translates the uniform prompt into one backend's native
//! request/response shape. Adapters are stateless between calls and safe to
//! share across concurrent dispatches.

pub mod anthropic;
pub mod openai;
pub mod retry;
pub mod stability;
pub mod titan;

use crate::config::Config;
use crate::error::{ConfigError, ProviderResult};
use crate::types::{Modality, Payload, Prompt, ProviderSpec};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Default max tokens for text generation when the prompt doesn't pin one.
pub const DEFAULT_MAX_TOKENS: u32 = 512;

/// Default sampling temperature for text generation.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default edge length in pixels for generated images.
pub const DEFAULT_IMAGE_SIZE: u32 = 1024;

/// Trait that all provider adapters implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Arc<dyn ProviderAdapter>` for the task-per-adapter fan-out).
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// The provider/model/modality this adapter serves.
    fn spec(&self) -> &ProviderSpec;

    /// Perform one generation call against the backend.
    ///
    /// Exactly one network round trip per invocation; retries are layered
    /// on by [`retry::RetryAdapter`], not implemented here.
    async fn generate(&self, prompt: &Prompt) -> ProviderResult<Payload>;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Factory that creates adapters from provider specs and config.
pub struct AdapterFactory;

impl AdapterFactory {
    fn section<'a, T>(name: &str, section: Option<&'a T>) -> Result<&'a T, ConfigError> {
        section.ok_or_else(|| ConfigError::UnknownProvider(name.to_string()))
    }

    /// Resolve a provider argument (`name` or `name/model`) into a spec,
    /// filling the model from config defaults when omitted.
    pub fn spec_for(arg: &str, config: &Config) -> Result<ProviderSpec, ConfigError> {
        let (name, model_override) = match arg.split_once('/') {
            Some((name, model)) => (name, Some(model)),
            None => (arg, None),
        };

        let (modality, default_model) = match name {
            "titan" => {
                let cfg = Self::section(name, config.providers.titan.as_ref())?;
                (Modality::Image, cfg.model.clone())
            }
            "stability" => {
                let cfg = Self::section(name, config.providers.stability.as_ref())?;
                (Modality::Image, cfg.model.clone())
            }
            "anthropic" => {
                let cfg = Self::section(name, config.providers.anthropic.as_ref())?;
                (Modality::Text, cfg.model.clone())
            }
            "openai" => {
                let cfg = Self::section(name, config.providers.openai.as_ref())?;
                (Modality::Text, cfg.model.clone())
            }
            other => return Err(ConfigError::UnknownProvider(other.to_string())),
        };

        let model = model_override.map(String::from).unwrap_or(default_model);
        Ok(ProviderSpec::new(name, model, modality))
    }

    /// Create an adapter for the given spec, wrapped in the retry layer.
    ///
    /// Fails fast (before any dispatch) when the provider has no config
    /// section or its API key cannot be resolved.
    pub fn create(
        spec: &ProviderSpec,
        config: &Config,
    ) -> Result<Arc<dyn ProviderAdapter>, ConfigError> {
        let timeout = Duration::from_millis(config.dispatch.call_timeout_ms);

        let inner: Box<dyn ProviderAdapter> = match spec.provider.as_str() {
            "titan" => {
                let cfg = Self::section("titan", config.providers.titan.as_ref())?;
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| {
                    ConfigError::ValidationError(
                        "Titan API key not set. Set BEDROCK_API_KEY env var.".to_string(),
                    )
                })?;
                Box::new(titan::TitanAdapter::new(
                    &cfg.endpoint,
                    &api_key,
                    &spec.model,
                    timeout,
                ))
            }
            "stability" => {
                let cfg = Self::section("stability", config.providers.stability.as_ref())?;
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| {
                    ConfigError::ValidationError(
                        "Stability API key not set. Set BEDROCK_API_KEY env var.".to_string(),
                    )
                })?;
                Box::new(stability::StabilityAdapter::new(
                    &cfg.endpoint,
                    &api_key,
                    &spec.model,
                    cfg.style_preset.as_deref(),
                    timeout,
                ))
            }
            "anthropic" => {
                let cfg = Self::section("anthropic", config.providers.anthropic.as_ref())?;
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| {
                    ConfigError::ValidationError(
                        "Anthropic API key not set. Set ANTHROPIC_API_KEY env var.".to_string(),
                    )
                })?;
                Box::new(anthropic::AnthropicAdapter::new(
                    &api_key,
                    &spec.model,
                    timeout,
                ))
            }
            "openai" => {
                let cfg = Self::section("openai", config.providers.openai.as_ref())?;
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| {
                    ConfigError::ValidationError(
                        "OpenAI API key not set. Set OPENAI_API_KEY env var.".to_string(),
                    )
                })?;
                Box::new(openai::OpenAiAdapter::new(
                    &cfg.endpoint,
                    &api_key,
                    &spec.model,
                    timeout,
                ))
            }
            other => return Err(ConfigError::UnknownProvider(other.to_string())),
        };

        let policy = retry::RetryPolicy::from_config(&config.dispatch);
        Ok(Arc::new(retry::RetryAdapter::new(inner, policy)))
    }
}
