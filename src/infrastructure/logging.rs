//! Logging system configuration and initialization
//!
//! Console logging via `tracing-subscriber`, with the level and
//! per-module filters driven by [`LoggingConfig`]. `RUST_LOG` wins
//! over the config file when set.

use anyhow::{anyhow, Result};
use std::str::FromStr;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

pub use crate::infrastructure::config::LoggingConfig;

/// Initialize the logging system with default configuration.
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LoggingConfig::default())
}

/// Initialize the logging system from configuration.
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    let filter = build_env_filter(config)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))
}

/// Build an `EnvFilter` from the configured level and module filters,
/// letting an explicit `RUST_LOG` environment variable override both.
///
/// Levels are validated up front: `EnvFilter` would otherwise parse an
/// unrecognized bare word as a target directive and silently drop the
/// intended global level.
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if std::env::var("RUST_LOG").is_ok() {
        return EnvFilter::try_from_default_env()
            .map_err(|e| anyhow!("invalid RUST_LOG filter: {e}"));
    }

    if !is_valid_level(&config.level) {
        return Err(anyhow!("invalid log level '{}' in config", config.level));
    }

    let mut directives = vec![config.level.clone()];
    for (module, level) in &config.module_filters {
        if !is_valid_level(level) {
            return Err(anyhow!(
                "invalid log level '{level}' for module '{module}' in config"
            ));
        }
        directives.push(format!("{module}={level}"));
    }

    EnvFilter::try_new(directives.join(","))
        .map_err(|e| anyhow!("invalid log filter from config: {e}"))
}

fn is_valid_level(level: &str) -> bool {
    LevelFilter::from_str(level).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_includes_module_directives() {
        let config = LoggingConfig::default();
        let filter = build_env_filter(&config).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("info"));
        assert!(rendered.contains("reqwest=warn"));
    }

    #[test]
    fn bad_level_is_rejected() {
        // EnvFilter would accept this as a target directive; the
        // up-front level validation must catch it instead.
        let config = LoggingConfig {
            level: "not a level!!".to_string(),
            module_filters: Default::default(),
        };
        assert!(build_env_filter(&config).is_err());

        let config = LoggingConfig {
            level: "loud".to_string(),
            module_filters: Default::default(),
        };
        assert!(build_env_filter(&config).is_err());
    }

    #[test]
    fn bad_module_filter_level_is_rejected() {
        let mut module_filters = std::collections::HashMap::new();
        module_filters.insert("reqwest".to_string(), "noisy".to_string());
        let config = LoggingConfig {
            level: "info".to_string(),
            module_filters,
        };
        assert!(build_env_filter(&config).is_err());
    }

    #[test]
    fn case_insensitive_levels_are_accepted() {
        let config = LoggingConfig {
            level: "DEBUG".to_string(),
            module_filters: Default::default(),
        };
        assert!(build_env_filter(&config).is_ok());
    }
}
