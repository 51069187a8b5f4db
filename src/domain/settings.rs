//! Per-user search criteria and their inbound mutation operations.
//!
//! Every mutation validates its input and leaves the settings untouched
//! on rejection; the returned [`SettingsError`] carries enough context
//! for the caller to phrase guidance to the user.

use crate::domain::watchlist::Watchlist;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Rejections for user-supplied criteria. None of these mutate state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("not a valid category URL: {url}")]
    InvalidCategoryUrl { url: String },

    #[error("category already registered: {url}")]
    DuplicateCategory { url: String },

    #[error("no usable keywords supplied")]
    EmptyKeywords,

    #[error("price is not a valid number: {value}")]
    InvalidPrice { value: String },

    #[error("minimum price {min} exceeds maximum price {max}")]
    InvertedRange { min: f64, max: f64 },

    #[error("price range requires at least one value")]
    MissingPriceArgs,
}

/// One user's criteria plus their monitoring watchlist.
///
/// Created lazily on first interaction, cleared wholesale on explicit
/// reset, and never persisted beyond the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    /// Category page URLs in registration order, without duplicates.
    pub categories: Vec<String>,

    /// Lowercased, trimmed keywords. Empty means search is not
    /// permitted yet.
    pub keywords: Vec<String>,

    /// Inclusive lower price bound.
    pub min_price: f64,

    /// Inclusive upper price bound; `None` means unbounded.
    pub max_price: Option<f64>,

    /// Identities already reported by the polling path.
    pub watchlist: Watchlist,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            keywords: Vec::new(),
            min_price: 0.0,
            max_price: None,
            watchlist: Watchlist::default(),
        }
    }
}

impl UserSettings {
    /// Register a category URL, preserving insertion order.
    pub fn add_category(&mut self, url: String) -> Result<(), SettingsError> {
        if self.categories.contains(&url) {
            return Err(SettingsError::DuplicateCategory { url });
        }
        self.categories.push(url);
        Ok(())
    }

    /// Replace the keyword list from comma-separated input.
    ///
    /// Keywords are trimmed and case-folded; empty fragments are
    /// dropped. An input that yields no keywords is rejected.
    pub fn set_keywords(&mut self, raw: &str) -> Result<usize, SettingsError> {
        let keywords: Vec<String> = raw
            .split(',')
            .map(|kw| kw.trim().to_lowercase())
            .filter(|kw| !kw.is_empty())
            .collect();

        if keywords.is_empty() {
            return Err(SettingsError::EmptyKeywords);
        }

        let count = keywords.len();
        self.keywords = keywords;
        Ok(count)
    }

    /// Set the price range from raw argument tokens.
    ///
    /// Accepted forms: `["reset"]` restores `[0, unbounded)`; a single
    /// value is taken as the maximum with a zero minimum; two values
    /// set both bounds. A `0` in the maximum slot means unbounded.
    pub fn set_price_range(&mut self, args: &[&str]) -> Result<(), SettingsError> {
        let Some(first) = args.first() else {
            return Err(SettingsError::MissingPriceArgs);
        };

        if first.eq_ignore_ascii_case("reset") {
            self.min_price = 0.0;
            self.max_price = None;
            return Ok(());
        }

        let parse = |value: &str| -> Result<f64, SettingsError> {
            value
                .parse::<f64>()
                .ok()
                .filter(|p| p.is_finite() && *p >= 0.0)
                .ok_or_else(|| SettingsError::InvalidPrice {
                    value: value.to_string(),
                })
        };

        let (min, max) = if args.len() == 1 {
            (0.0, unbounded_on_zero(parse(first)?))
        } else {
            (parse(first)?, unbounded_on_zero(parse(args[1])?))
        };

        if let Some(max) = max {
            if min > max {
                return Err(SettingsError::InvertedRange { min, max });
            }
        }

        self.min_price = min;
        self.max_price = max;
        Ok(())
    }

    /// Clear every field, watchlist included.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether search/monitoring has enough configuration to run.
    pub fn is_searchable(&self) -> bool {
        !self.categories.is_empty() && !self.keywords.is_empty()
    }

    /// Human-readable form of the price range, e.g. `100 - 1000` or
    /// `0 - ∞`.
    pub fn price_range_display(&self) -> String {
        match self.max_price {
            Some(max) => format!("{} - {:.2}", self.min_price, max),
            None => format!("{} - ∞", self.min_price),
        }
    }

    /// One-line settings summary for logs and status replies.
    pub fn summary(&self) -> String {
        format!(
            "{} keyword(s), {} categor(ies), price {}",
            self.keywords.len(),
            self.categories.len(),
            self.price_range_display(),
        )
    }
}

fn unbounded_on_zero(price: f64) -> Option<f64> {
    (price != 0.0).then_some(price)
}

/// Validate that a URL points at a lot or chip category on the
/// configured marketplace. Returns the parsed URL for the caller.
pub fn validate_category_url(
    raw: &str,
    host: &str,
    path_markers: &[String],
) -> Result<Url, SettingsError> {
    let invalid = || SettingsError::InvalidCategoryUrl {
        url: raw.to_string(),
    };

    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    let url_host = url.host_str().ok_or_else(|| invalid())?;

    let host_matches = url_host == host || url_host.ends_with(&format!(".{host}"));
    let path_matches = path_markers.iter().any(|m| url.path().contains(m.as_str()));

    if host_matches && path_matches {
        Ok(url)
    } else {
        Err(invalid())
    }
}
