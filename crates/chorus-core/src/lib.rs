//! Chorus Core - Embeddable model comparison harness.
//!
//! Chorus sends one prompt to several generative-model backends and
//! collects their outputs side by side, for both text and image
//! modalities. One adapter per provider, one concurrent task per adapter,
//! one labeled entry per provider in the final set, failures included.
//!
//! # Architecture
//!
//! ```text
//! Prompt → Dispatcher fans out to Adapters → Normalizer → Aggregator
//!        → ComparisonSet → Sink (image files / text report / JSON)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use chorus_core::{AdapterFactory, Config, Harness, Modality, Prompt};
//!
//! #[tokio::main]
//! async fn main() -> chorus_core::Result<()> {
//!     let config = Config::load()?;
//!     let specs = vec![
//!         AdapterFactory::spec_for("titan", &config)?,
//!         AdapterFactory::spec_for("stability", &config)?,
//!     ];
//!     let harness = Harness::new(config);
//!     let prompt = Prompt::new("a red fox in snow").with_modality(Modality::Image);
//!     let set = harness.compare(&prompt, &specs).await?;
//!     println!("{} of {} succeeded", set.success_count(), set.len());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod adapters;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod sink;
pub mod types;

// Re-exports for convenient access
pub use adapters::{AdapterFactory, ProviderAdapter};
pub use config::Config;
pub use dispatch::{DispatchOptions, Dispatcher};
pub use error::{ChorusError, ConfigError, DispatchError, ErrorKind, ProviderError, Result};
pub use sink::{ImageSink, ReportFormat};
pub use types::{
    ComparisonSet, GenerationParams, GenerationResult, Modality, Payload, Prompt, ProviderSpec,
    Status,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Comparison harness - the main entry point for one-call comparisons.
///
/// Owns the configuration, builds adapters through the factory, and runs
/// the dispatcher. Library users who need finer control can use
/// [`Dispatcher`] and [`AdapterFactory`] directly.
pub struct Harness {
    config: Config,
}

impl Harness {
    /// Create a new harness with the given configuration.
    pub fn new(config: Config) -> Self {
        tracing::debug!("Initializing chorus v{VERSION}");
        Self { config }
    }

    /// Create a new harness with configuration loaded from disk.
    pub fn with_defaults() -> Result<Self> {
        let config = Config::load()?;
        Ok(Self::new(config))
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one comparison: build an adapter per spec and dispatch the
    /// prompt to all of them concurrently.
    pub async fn compare(&self, prompt: &Prompt, specs: &[ProviderSpec]) -> Result<ComparisonSet> {
        let mut built = Vec::with_capacity(specs.len());
        for spec in specs {
            built.push(AdapterFactory::create(spec, &self.config)?);
        }
        let dispatcher = Dispatcher::new(DispatchOptions::from_config(&self.config.dispatch));
        Ok(dispatcher.dispatch(prompt, &built).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_harness_new() {
        let harness = Harness::new(Config::default());
        assert_eq!(harness.config().dispatch.retry_attempts, 3);
    }

    #[tokio::test]
    async fn test_compare_rejects_empty_specs() {
        let harness = Harness::new(Config::default());
        let err = harness
            .compare(&Prompt::new("p"), &[])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ChorusError::Dispatch(DispatchError::NoProviders)
        ));
    }
}
