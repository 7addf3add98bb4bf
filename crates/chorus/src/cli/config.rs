//! The `chorus config` command for configuration management.
//!
//! `show` masks any credential that was written into the file as a
//! literal; `${ENV_VAR}` placeholders print as-is since they reference
//! the environment rather than a secret.

use chorus_core::Config;
use clap::{Args, Subcommand};
use std::path::Path;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration (credentials masked)
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with all provider sections
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::load()?;
            print!("{}", render(&config)?);
        }

        ConfigCommand::Path => {
            println!("{}", Config::default_path().display());
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();
            init_at(&path, force)?;
            println!("Configuration initialized at: {}", path.display());
            println!("Provider sections: titan, stability, anthropic, openai.");
        }
    }

    Ok(())
}

/// Render the config as TOML with literal credentials masked.
fn render(config: &Config) -> anyhow::Result<String> {
    let mut masked = config.clone();
    let providers = &mut masked.providers;
    if let Some(cfg) = providers.titan.as_mut() {
        cfg.api_key = mask(&cfg.api_key);
    }
    if let Some(cfg) = providers.stability.as_mut() {
        cfg.api_key = mask(&cfg.api_key);
    }
    if let Some(cfg) = providers.anthropic.as_mut() {
        cfg.api_key = mask(&cfg.api_key);
    }
    if let Some(cfg) = providers.openai.as_mut() {
        cfg.api_key = mask(&cfg.api_key);
    }
    Ok(masked.to_toml()?)
}

fn mask(key: &str) -> String {
    if key.is_empty() || (key.starts_with("${") && key.ends_with('}')) {
        key.to_string()
    } else {
        "<redacted>".to_string()
    }
}

/// Write the default config to `path`, refusing to clobber an existing
/// file unless `force` is set.
fn init_at(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, Config::default().to_toml()?)?;
    tracing::info!("Config file created at: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_keeps_env_placeholders() {
        assert_eq!(mask("${OPENAI_API_KEY}"), "${OPENAI_API_KEY}");
        assert_eq!(mask(""), "");
        assert_eq!(mask("sk-live-1234"), "<redacted>");
    }

    #[test]
    fn test_show_redacts_literal_keys() {
        let mut config = Config::default();
        config.providers.openai.as_mut().unwrap().api_key = "sk-live-1234".to_string();

        let toml = render(&config).unwrap();
        assert!(!toml.contains("sk-live-1234"));
        assert!(toml.contains("<redacted>"));
        // Placeholder keys stay readable so the user can see which env
        // vars the config expects.
        assert!(toml.contains("${ANTHROPIC_API_KEY}"));
    }

    #[test]
    fn test_init_writes_loadable_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chorus").join("config.toml");

        init_at(&path, false).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.dispatch.retry_attempts, 3);
        assert!(loaded.providers.titan.is_some());
        assert!(loaded.providers.openai.is_some());
    }

    #[test]
    fn test_init_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        init_at(&path, false).unwrap();
        assert!(init_at(&path, false).is_err());
        assert!(init_at(&path, true).is_ok());
    }
}
