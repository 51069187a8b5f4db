//! Infrastructure module - I/O and parsing
//!
//! HTTP transport, HTML parsing, configuration and logging. Nothing in
//! here makes policy decisions; that belongs to the domain layer.

pub mod config;
pub mod http_client;
pub mod logging;
pub mod parsing;

// Re-export commonly used items
pub use config::AppConfig;
pub use http_client::HttpClient;
pub use parsing::{LotPageParser, ScrapeError, ScrapeResult};
