//! Application module - Orchestration
//!
//! Per-user settings store, on-demand search, and the poll scheduler
//! registry. These wire domain policy to infrastructure I/O.

pub mod monitor;
pub mod search;
pub mod store;

// Re-export commonly used items
pub use monitor::{CategoryScanner, MonitorRegistry, Notifier};
pub use search::{LotMatch, SearchEngine};
pub use store::{SettingsStore, UserId};
