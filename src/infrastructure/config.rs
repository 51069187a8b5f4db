//! Configuration infrastructure
//!
//! Application configuration for the marketplace scanner and monitor,
//! loadable from a JSON file with every field defaulting to values
//! that work against the live marketplace.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;
use tracing::info;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Marketplace endpoint and transport settings.
    pub marketplace: MarketplaceConfig,

    /// Category page scanning limits and selector chains.
    pub scanner: ScannerConfig,

    /// Poll scheduler cadence and notification pacing.
    pub monitor: MonitorConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a JSON file.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from a JSON file, or fall back to defaults when the file
    /// does not exist. A malformed file is still an error.
    pub async fn load_or_default(path: &Path) -> Result<Self> {
        if fs::try_exists(path).await.unwrap_or(false) {
            Self::load(path).await
        } else {
            info!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}

/// Marketplace endpoint and HTTP transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceConfig {
    /// Origin used to resolve relative lot links.
    pub base_url: String,

    /// Host that registered category URLs must belong to.
    pub host: String,

    /// Path fragments that identify a lot/chip category page.
    pub category_path_markers: Vec<String>,

    /// User agent sent with every request.
    pub user_agent: String,

    /// Accept-Language header value.
    pub accept_language: String,

    /// Total request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Retry attempts for failed fetches.
    pub max_retries: u32,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://funpay.com".to_string(),
            host: "funpay.com".to_string(),
            category_path_markers: vec!["/lots/".to_string(), "/chips/".to_string()],
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            accept_language: "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
            request_timeout_secs: 15,
            max_retries: 2,
        }
    }
}

/// Category scanning limits and selector chains.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Ceiling on candidate elements processed per page, to bound
    /// latency on large category pages.
    pub max_candidates: usize,

    /// CSS selector chains for lot discovery and field extraction.
    pub selectors: LotSelectors,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_candidates: 30,
            selectors: LotSelectors::default(),
        }
    }
}

/// CSS selector chains for category pages, in priority order.
///
/// The container chains tolerate markup drift: the first strategy
/// yielding at least one element wins, and a class-vocabulary sweep
/// backstops everything when no selector matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LotSelectors {
    /// Exact container selectors, tried first.
    pub container: Vec<String>,

    /// Substring-matching container selectors, tried second.
    pub container_fallback: Vec<String>,

    /// Class-text vocabulary for the last-resort element sweep.
    pub heuristic_vocabulary: Vec<String>,

    /// Title selectors per candidate element.
    pub title: Vec<String>,

    /// Price selectors per candidate element.
    pub price: Vec<String>,
}

impl Default for LotSelectors {
    fn default() -> Self {
        Self {
            container: vec![
                "div.tc-item".to_string(),
                "a.tc-item".to_string(),
                "div.lot-item".to_string(),
                "div.item".to_string(),
            ],
            container_fallback: vec!["div[class*=\"item\"]".to_string()],
            heuristic_vocabulary: vec![
                "item".to_string(),
                "lot".to_string(),
                "product".to_string(),
                "offer".to_string(),
            ],
            title: vec![
                "div.tc-desc-text".to_string(),
                "div.item-title".to_string(),
                "div.title".to_string(),
                "h5".to_string(),
                "h4".to_string(),
                "h3".to_string(),
                "a[href]".to_string(),
            ],
            price: vec![
                "div.tc-price".to_string(),
                "div.price".to_string(),
                "span.price".to_string(),
                "div.item-price".to_string(),
                "b".to_string(),
                "strong".to_string(),
                "[class*=\"price\"]".to_string(),
                "[class*=\"cost\"]".to_string(),
            ],
        }
    }
}

/// Poll scheduler cadence and notification pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between poll cycles.
    pub poll_interval_secs: u64,

    /// Delay before the first cycle after start.
    pub initial_delay_secs: u64,

    /// Cap on notifications emitted per cycle.
    pub max_notifications_per_cycle: usize,

    /// Pause between successive notifications, respecting the delivery
    /// channel's rate limits.
    pub notification_pacing_ms: u64,

    /// Days a reported identity stays in the watchlist.
    pub retention_days: i64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 600,
            initial_delay_secs: 5,
            max_notifications_per_cycle: 3,
            notification_pacing_ms: 1000,
            retention_days: crate::domain::RETENTION_DAYS,
        }
    }
}

/// Logging configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: String,

    /// Module-specific log level filters (e.g. "reqwest": "warn").
    pub module_filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let mut module_filters = HashMap::new();
        module_filters.insert("reqwest".to_string(), "warn".to_string());
        module_filters.insert("hyper".to_string(), "warn".to_string());
        module_filters.insert("html5ever".to_string(), "error".to_string());

        Self {
            level: "info".to_string(),
            module_filters,
        }
    }
}
