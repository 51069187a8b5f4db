//! HTML parsing infrastructure for marketplace category pages
//!
//! Selector-chain based lot discovery and field extraction, plus
//! price normalization, with comprehensive fallback strategies for
//! an unknown and shifting page structure.

pub mod error;
pub mod lot_parser;
pub mod price;

// Re-export public types
pub use error::{ScrapeError, ScrapeResult};
pub use lot_parser::{ContainerStrategy, LotPageParser};
pub use price::normalize_price;
