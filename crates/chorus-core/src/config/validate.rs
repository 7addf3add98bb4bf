//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatch.retry_delay_ms == 0 {
            return Err(ConfigError::ValidationError(
                "dispatch.retry_delay_ms must be > 0".into(),
            ));
        }
        if self.dispatch.call_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "dispatch.call_timeout_ms must be > 0".into(),
            ));
        }
        if self.dispatch.retry_attempts > 10 {
            return Err(ConfigError::ValidationError(
                "dispatch.retry_attempts must be <= 10".into(),
            ));
        }
        if let Some(deadline_ms) = self.dispatch.deadline_ms {
            if deadline_ms == 0 {
                return Err(ConfigError::ValidationError(
                    "dispatch.deadline_ms must be > 0 when set".into(),
                ));
            }
        }
        match self.output.format.as_str() {
            "text" | "json" | "jsonl" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "output.format must be text, json or jsonl (got '{other}')"
                )));
            }
        }
        Ok(())
    }
}
