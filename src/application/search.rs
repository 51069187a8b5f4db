//! On-demand search across a user's registered categories.

use crate::domain::{filter, Lot, UserSettings};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::parsing::{LotPageParser, ScrapeResult};
use scraper::Html;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{error, info};

/// A lot that passed the user's filters, with the keyword that hit.
#[derive(Debug, Clone)]
pub struct LotMatch {
    pub lot: Lot,
    pub keyword: String,
}

/// Scan-and-filter pipeline shared by on-demand search and polling.
#[derive(Clone)]
pub struct SearchEngine {
    http: HttpClient,
    parser: Arc<LotPageParser>,
}

impl SearchEngine {
    pub fn new(config: &AppConfig) -> ScrapeResult<Self> {
        Ok(Self {
            http: HttpClient::new(&config.marketplace)?,
            parser: Arc::new(LotPageParser::new(&config.scanner, &config.marketplace)?),
        })
    }

    /// Fetch and parse one category page.
    ///
    /// A transport failure is logged and converted to an empty result;
    /// one category's failure must never abort a multi-category
    /// search or a poll cycle.
    pub async fn scan_category(&self, category_url: &str) -> Vec<Lot> {
        let body = match self.http.fetch_text(category_url).await {
            Ok(body) => body,
            Err(e) => {
                error!("Category fetch failed, skipping {}: {}", category_url, e);
                return Vec::new();
            }
        };

        // Parse synchronously; the non-Send document never crosses an
        // await point.
        let document = Html::parse_document(&body);
        self.parser.parse_document(&document, category_url)
    }

    /// Scan every registered category and return all matching lots,
    /// cheapest first with unpriced lots trailing. The watchlist is
    /// deliberately not consulted here.
    pub async fn search(&self, settings: &UserSettings) -> Vec<LotMatch> {
        let mut found = Vec::new();

        for category_url in &settings.categories {
            let lots = self.scan_category(category_url).await;
            let before = found.len();

            for lot in lots {
                if let Some(keyword) = filter::match_lot(&lot, settings) {
                    found.push(LotMatch {
                        keyword: keyword.to_string(),
                        lot,
                    });
                }
            }

            if found.len() > before {
                info!(
                    "{} match(es) in {}",
                    found.len() - before,
                    category_url
                );
            }
        }

        sort_by_price(&mut found);
        found
    }
}

/// Ascending by normalized price; lots without a price sort last.
fn sort_by_price(matches: &mut [LotMatch]) {
    matches.sort_by(|a, b| match (a.lot.price_value, b.lot.price_value) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
