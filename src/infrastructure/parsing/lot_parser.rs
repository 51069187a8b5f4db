//! Category page parser: lot discovery and field extraction.
//!
//! Robust HTML parsing for marketplace category pages. The page
//! structure is unknown and shifts without notice, so discovery and
//! every field run through ordered fallback chains: the first
//! container strategy that yields elements wins, and per-field
//! selector chains degrade gracefully down to whole-element text.

use super::error::{ScrapeError, ScrapeResult};
use super::price::normalize_price;
use crate::domain::lot::{truncate_chars, Lot};
use crate::infrastructure::config::{MarketplaceConfig, ScannerConfig};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

/// Minimum trimmed length for a selector-extracted title.
const MIN_TITLE_LEN: usize = 4;

/// Cap on the whole-element text fallback for titles.
const FALLBACK_TITLE_LEN: usize = 200;

/// Minimum length for the fallback title; anything shorter means the
/// element is not a lot at all.
const MIN_FALLBACK_TITLE_LEN: usize = 5;

/// One way of locating candidate lot elements on a category page.
///
/// Strategies are evaluated in priority order with first-success
/// short-circuit; later strategies are never unioned in.
pub enum ContainerStrategy {
    /// A plain CSS selector (exact class or substring-matching).
    Css { label: String, selector: Selector },

    /// Last resort: sweep all classed `div`/`a` elements and keep
    /// those whose class text mentions marketplace vocabulary.
    ClassVocabulary { terms: Vec<String>, sweep: Selector },
}

impl ContainerStrategy {
    pub fn label(&self) -> &str {
        match self {
            Self::Css { label, .. } => label,
            Self::ClassVocabulary { .. } => "class-vocabulary sweep",
        }
    }

    /// Collect the candidate elements this strategy finds.
    pub fn discover<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        match self {
            Self::Css { selector, .. } => document.select(selector).collect(),
            Self::ClassVocabulary { terms, sweep } => document
                .select(sweep)
                .filter(|element| {
                    let class_text = element
                        .value()
                        .classes()
                        .collect::<Vec<_>>()
                        .join(" ")
                        .to_lowercase();
                    terms.iter().any(|term| class_text.contains(term.as_str()))
                })
                .collect(),
        }
    }
}

/// Parser for extracting lot records from category listing pages.
pub struct LotPageParser {
    container_strategies: Vec<ContainerStrategy>,
    title_selectors: Vec<Selector>,
    price_selectors: Vec<Selector>,
    link_selector: Selector,
    base_url: Url,
    max_candidates: usize,
}

impl LotPageParser {
    /// Create a parser from scanner and marketplace configuration.
    pub fn new(scanner: &ScannerConfig, marketplace: &MarketplaceConfig) -> ScrapeResult<Self> {
        let selectors = &scanner.selectors;

        let mut container_strategies = Vec::new();
        for raw in selectors.container.iter().chain(&selectors.container_fallback) {
            match Selector::parse(raw) {
                Ok(selector) => container_strategies.push(ContainerStrategy::Css {
                    label: raw.clone(),
                    selector,
                }),
                Err(e) => warn!("Skipping container selector '{}': {}", raw, e),
            }
        }
        container_strategies.push(ContainerStrategy::ClassVocabulary {
            terms: selectors
                .heuristic_vocabulary
                .iter()
                .map(|t| t.to_lowercase())
                .collect(),
            sweep: parse_selector("div[class], a[class]")?,
        });

        let base_url = Url::parse(&marketplace.base_url).map_err(|_| ScrapeError::InvalidUrl {
            url: marketplace.base_url.clone(),
        })?;

        Ok(Self {
            container_strategies,
            title_selectors: compile_selector_chain(&selectors.title, "title")?,
            price_selectors: compile_selector_chain(&selectors.price, "price")?,
            link_selector: parse_selector("a[href]")?,
            base_url,
            max_candidates: scanner.max_candidates,
        })
    }

    /// Parser over the default marketplace configuration.
    pub fn from_defaults() -> ScrapeResult<Self> {
        Self::new(&ScannerConfig::default(), &MarketplaceConfig::default())
    }

    /// Extract lot records from a parsed category page.
    ///
    /// Discovery short-circuits on the first strategy that yields any
    /// elements. Extraction failures skip the element and continue;
    /// filtering is the caller's concern, not done here.
    pub fn parse_document(&self, document: &Html, category_url: &str) -> Vec<Lot> {
        let Some((candidates, strategy)) = self.discover_candidates(document) else {
            warn!("No lot elements found on {}", category_url);
            return Vec::new();
        };

        info!(
            "Found {} candidate element(s) on {} via '{}'",
            candidates.len(),
            category_url,
            strategy
        );

        let mut lots = Vec::new();
        for element in candidates.into_iter().take(self.max_candidates) {
            match self.extract_lot(element, category_url) {
                Some(lot) => lots.push(lot),
                None => debug!("Skipped candidate without a usable title"),
            }
        }

        debug!("Extracted {} lot(s) from {}", lots.len(), category_url);
        lots
    }

    /// First container strategy that yields at least one element.
    fn discover_candidates<'a>(&self, document: &'a Html) -> Option<(Vec<ElementRef<'a>>, &str)> {
        for strategy in &self.container_strategies {
            let elements = strategy.discover(document);
            if !elements.is_empty() {
                return Some((elements, strategy.label()));
            }
            debug!("Container strategy '{}' matched nothing", strategy.label());
        }
        None
    }

    /// Pull title, price text and link from one candidate element.
    ///
    /// A missing title is the only hard failure; missing price or link
    /// still produce a reportable record.
    pub fn extract_lot(&self, element: ElementRef<'_>, category_url: &str) -> Option<Lot> {
        let title = self.extract_title(element)?;

        let price_text = self.extract_price_text(element);
        let price_value = price_text.as_deref().and_then(normalize_price);
        let link = self.extract_link(element);

        Some(Lot::new(title, price_text, price_value, link, category_url))
    }

    fn extract_title(&self, element: ElementRef<'_>) -> Option<String> {
        for selector in &self.title_selectors {
            if let Some(text) = select_first_text(element, selector) {
                if text.chars().count() >= MIN_TITLE_LEN {
                    return Some(text);
                }
            }
        }

        // Fall back to the element's flattened text; below the minimum
        // the element is not a lot.
        let full_text = flatten_text(element);
        let full_text = truncate_chars(&full_text, FALLBACK_TITLE_LEN);
        (full_text.chars().count() >= MIN_FALLBACK_TITLE_LEN).then_some(full_text)
    }

    fn extract_price_text(&self, element: ElementRef<'_>) -> Option<String> {
        self.price_selectors
            .iter()
            .find_map(|selector| select_first_text(element, selector))
    }

    /// First href on the element itself or nested within it, resolved
    /// to an absolute URL.
    fn extract_link(&self, element: ElementRef<'_>) -> Option<String> {
        let own_href = (element.value().name() == "a")
            .then(|| element.value().attr("href"))
            .flatten();

        let href = own_href.or_else(|| {
            element
                .select(&self.link_selector)
                .next()
                .and_then(|a| a.value().attr("href"))
        })?;

        self.resolve_link(href)
    }

    fn resolve_link(&self, href: &str) -> Option<String> {
        if href.starts_with("http://") || href.starts_with("https://") {
            return Some(href.to_string());
        }
        match self.base_url.join(href) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                debug!("Could not resolve href '{}': {}", href, e);
                None
            }
        }
    }
}

/// Compile a selector chain, keeping whatever parses. An entirely
/// unusable chain is a configuration error.
fn compile_selector_chain(raw: &[String], chain: &str) -> ScrapeResult<Vec<Selector>> {
    let mut compiled = Vec::new();
    for selector_str in raw {
        match Selector::parse(selector_str) {
            Ok(selector) => compiled.push(selector),
            Err(e) => warn!("Skipping {} selector '{}': {}", chain, selector_str, e),
        }
    }

    if compiled.is_empty() {
        return Err(ScrapeError::EmptySelectorChain {
            chain: chain.to_string(),
        });
    }
    Ok(compiled)
}

fn parse_selector(raw: &str) -> ScrapeResult<Selector> {
    Selector::parse(raw).map_err(|e| ScrapeError::InvalidSelector {
        selector: raw.to_string(),
        reason: e.to_string(),
    })
}

/// First non-empty trimmed text under a selector.
fn select_first_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Whole-element text with whitespace collapsed.
fn flatten_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> LotPageParser {
        LotPageParser::from_defaults().unwrap()
    }

    fn parse(html: &str) -> Html {
        Html::parse_document(html)
    }

    const CATEGORY: &str = "https://funpay.com/lots/210/";

    #[test]
    fn primary_container_selector_wins() {
        let html = parse(
            r#"<div class="tc-item">
                 <div class="tc-desc-text">Steam account lvl 30</div>
                 <div class="tc-price">500 ₽</div>
                 <a href="/lots/offer?id=1"></a>
               </div>
               <div class="lot-item">
                 <div class="title">Should not be reached</div>
               </div>"#,
        );

        let lots = parser().parse_document(&html, CATEGORY);
        // div.tc-item matched, so the later div.lot-item strategy is
        // never consulted - no union of strategies.
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0].title, "Steam account lvl 30");
        assert_eq!(lots[0].price_value, Some(500.0));
        assert_eq!(
            lots[0].link.as_deref(),
            Some("https://funpay.com/lots/offer?id=1")
        );
    }

    #[test]
    fn fallback_strategy_is_used_when_primary_matches_nothing() {
        let html = parse(
            r#"<div class="lot-item">
                 <div class="title">Epic account bundle</div>
                 <span class="price">200 ₽</span>
               </div>
               <div class="lot-item">
                 <div class="title">Gold currency pack</div>
               </div>"#,
        );

        let lots = parser().parse_document(&html, CATEGORY);
        assert_eq!(lots.len(), 2);
        assert_eq!(lots[0].title, "Epic account bundle");
        assert_eq!(lots[1].price_value, None);
    }

    #[test]
    fn substring_container_fallback_matches_drifted_classes() {
        let html = parse(
            r#"<div class="marketplace-item-card">
                 <h4>Rare pet brainrot</h4>
                 <b>1 234,50 ₽</b>
               </div>"#,
        );

        let lots = parser().parse_document(&html, CATEGORY);
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0].title, "Rare pet brainrot");
        assert_eq!(lots[0].price_value, Some(1234.50));
    }

    #[test]
    fn vocabulary_sweep_is_the_last_resort() {
        let html = parse(
            r#"<a class="special-offer-link" href="/lots/offer?id=7">
                 <h5>Steam gift card</h5>
               </a>
               <div class="sidebar">ignored</div>"#,
        );

        let lots = parser().parse_document(&html, CATEGORY);
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0].title, "Steam gift card");
        // The container is itself the anchor.
        assert_eq!(
            lots[0].link.as_deref(),
            Some("https://funpay.com/lots/offer?id=7")
        );
    }

    #[test]
    fn title_cascade_respects_priority_order() {
        let html = parse(
            r#"<div class="tc-item">
                 <h3>Heading title</h3>
                 <div class="tc-desc-text">Description title</div>
               </div>"#,
        );

        let lots = parser().parse_document(&html, CATEGORY);
        assert_eq!(lots[0].title, "Description title");
    }

    #[test]
    fn short_selector_titles_fall_through_to_element_text() {
        // "abc" is too short for the selector chain, but the flattened
        // element text qualifies.
        let html = parse(
            r#"<div class="tc-item">
                 <div class="tc-desc-text">abc</div>
                 extra words around the description
               </div>"#,
        );

        let lots = parser().parse_document(&html, CATEGORY);
        assert_eq!(lots.len(), 1);
        assert!(lots[0].title.contains("extra words"));
    }

    #[test]
    fn element_without_any_title_is_not_a_lot() {
        let html = parse(r#"<div class="tc-item"><span>ab</span></div>"#);
        let lots = parser().parse_document(&html, CATEGORY);
        assert!(lots.is_empty());
    }

    #[test]
    fn missing_price_and_link_still_produce_a_record() {
        let html = parse(
            r#"<div class="tc-item">
                 <div class="tc-desc-text">Unpriced unlinked lot</div>
               </div>"#,
        );

        let lots = parser().parse_document(&html, CATEGORY);
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0].price_value, None);
        assert_eq!(lots[0].link, None);
        assert_eq!(lots[0].link_or_category(), CATEGORY);
    }

    #[test]
    fn candidate_cap_bounds_large_pages() {
        let mut page = String::new();
        for i in 0..80 {
            page.push_str(&format!(
                r#"<div class="tc-item"><div class="tc-desc-text">Lot number {i}</div></div>"#
            ));
        }

        let lots = parser().parse_document(&parse(&page), CATEGORY);
        assert_eq!(lots.len(), 30);
    }

    #[test]
    fn relative_links_resolve_against_marketplace_origin() {
        let p = parser();
        assert_eq!(
            p.resolve_link("/lots/offer?id=3").as_deref(),
            Some("https://funpay.com/lots/offer?id=3")
        );
        assert_eq!(
            p.resolve_link("https://other.example/x").as_deref(),
            Some("https://other.example/x")
        );
        assert_eq!(
            p.resolve_link("chips/42").as_deref(),
            Some("https://funpay.com/chips/42")
        );
    }

    #[test]
    fn empty_document_yields_no_lots() {
        let lots = parser().parse_document(&parse("<html><body></body></html>"), CATEGORY);
        assert!(lots.is_empty());
    }
}
