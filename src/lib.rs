//! Lotwatch - Marketplace Lot Extraction & Monitoring Engine
//!
//! Scans marketplace category pages for lots matching per-user keyword
//! and price criteria, with resilient HTML extraction (cascading
//! selector strategies), price normalization, stable lot identity for
//! deduplication, and a time-windowed polling monitor.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export the main entry points
pub use application::{MonitorRegistry, Notifier, SearchEngine, SettingsStore, UserId};
pub use domain::{Lot, SettingsError, UserSettings};
pub use infrastructure::AppConfig;
