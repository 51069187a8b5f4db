//! Lot records extracted from marketplace category pages.

use serde::{Deserialize, Serialize};

/// Maximum characters kept from an extracted title.
pub const MAX_TITLE_LEN: usize = 150;

/// Characters of the title folded into a link-based identity.
const IDENTITY_TITLE_PREFIX: usize = 50;

/// Characters of the title used when no link is available.
const IDENTITY_TITLE_ONLY: usize = 100;

/// Display sentinel for lots whose price element could not be located.
pub const PRICE_NOT_SPECIFIED: &str = "price not specified";

/// A single marketplace listing assembled by the category scanner.
///
/// Lots are ephemeral: they are produced per scan and only their
/// identity survives (in the per-user watchlist) for deduplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lot {
    /// Display title, truncated to [`MAX_TITLE_LEN`] characters.
    pub title: String,

    /// Raw price text as found on the page, or [`PRICE_NOT_SPECIFIED`].
    pub price_text: String,

    /// Normalized numeric price, absent when the text was unparseable.
    pub price_value: Option<f64>,

    /// Absolute URL of the lot itself. `None` when no anchor could be
    /// located; display layers should then fall back to the category
    /// URL and suppress any "open lot" affordance.
    pub link: Option<String>,

    /// Category page the lot was scanned from.
    pub category_url: String,

    /// Deduplication key derived from link and title prefix.
    pub identity: String,
}

impl Lot {
    /// Assemble a lot record, deriving its identity.
    ///
    /// Identity is `{link}_{title[..50]}` when a real link exists and
    /// `title[..100]` otherwise. Two sightings of the same listing keep
    /// the same identity even when the price text drifts; collisions
    /// between distinct listings are an accepted approximation.
    pub fn new(
        title: String,
        price_text: Option<String>,
        price_value: Option<f64>,
        link: Option<String>,
        category_url: &str,
    ) -> Self {
        let title = truncate_chars(&title, MAX_TITLE_LEN);
        let identity = match &link {
            Some(link) => format!("{}_{}", link, truncate_chars(&title, IDENTITY_TITLE_PREFIX)),
            None => truncate_chars(&title, IDENTITY_TITLE_ONLY),
        };

        Self {
            title,
            price_text: price_text.unwrap_or_else(|| PRICE_NOT_SPECIFIED.to_string()),
            price_value,
            link,
            category_url: category_url.to_string(),
            identity,
        }
    }

    /// URL to show the user: the lot's own link, or the category page.
    pub fn link_or_category(&self) -> &str {
        self.link.as_deref().unwrap_or(&self.category_url)
    }

    /// Price string suitable for a match summary.
    pub fn price_display(&self) -> String {
        match self.price_value {
            Some(value) => format!("{value:.2}"),
            None => self.price_text.clone(),
        }
    }
}

/// Truncate to at most `max` characters on a char boundary.
///
/// Marketplace titles are frequently Cyrillic, so byte slicing is not
/// an option here.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
