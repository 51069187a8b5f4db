//! Domain module - Core business logic and entities
//!
//! Lot records, user criteria, match policy and the monitoring
//! watchlist. Pure types with no I/O.

pub mod filter;
pub mod lot;
pub mod settings;
pub mod watchlist;

// Re-export commonly used items
pub use filter::{match_lot, matches};
pub use lot::{Lot, MAX_TITLE_LEN, PRICE_NOT_SPECIFIED};
pub use settings::{validate_category_url, SettingsError, UserSettings};
pub use watchlist::{Watchlist, RETENTION_DAYS};
