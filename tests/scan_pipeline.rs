//! End-to-end pipeline tests: HTML document in, filtered matches out.
//!
//! No network involved; category pages are inline documents parsed the
//! same way the search engine parses fetched bodies.

use chrono::Utc;
use lotwatch::domain::{filter, UserSettings, Watchlist};
use lotwatch::infrastructure::parsing::LotPageParser;
use scraper::Html;

const CATEGORY: &str = "https://funpay.com/lots/210/";

fn category_page() -> Html {
    Html::parse_document(
        r#"<html><body>
          <div class="tc-item">
            <div class="tc-desc-text">Steam account lvl 30</div>
            <div class="tc-price">500 ₽</div>
            <a href="/lots/offer?id=101"></a>
          </div>
          <div class="tc-item">
            <div class="tc-desc-text">Epic account</div>
            <div class="tc-price">200 ₽</div>
            <a href="/lots/offer?id=102"></a>
          </div>
          <div class="tc-item">
            <div class="tc-desc-text">Steam bundle</div>
            <div class="tc-price">5 000 ₽</div>
            <a href="/lots/offer?id=103"></a>
          </div>
        </body></html>"#,
    )
}

fn criteria() -> UserSettings {
    let mut settings = UserSettings::default();
    settings.set_keywords("steam").unwrap();
    settings.set_price_range(&["100", "1000"]).unwrap();
    settings
        .add_category(CATEGORY.to_string())
        .unwrap();
    settings
}

#[test]
fn keyword_and_price_filters_combine() {
    let parser = LotPageParser::from_defaults().unwrap();
    let lots = parser.parse_document(&category_page(), CATEGORY);
    assert_eq!(lots.len(), 3);

    let settings = criteria();
    let matches: Vec<_> = lots
        .iter()
        .filter(|lot| filter::matches(lot, &settings))
        .collect();

    // "Epic account" fails the keyword rule, "Steam bundle" the price
    // rule; exactly one lot survives both.
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].title, "Steam account lvl 30");
    assert_eq!(matches[0].price_value, Some(500.0));
    assert_eq!(
        matches[0].link.as_deref(),
        Some("https://funpay.com/lots/offer?id=101")
    );
}

#[test]
fn rescanning_an_unchanged_page_yields_stable_identities() {
    let parser = LotPageParser::from_defaults().unwrap();
    let settings = criteria();
    let mut watchlist = Watchlist::default();

    // First pass: every match is new.
    let first: Vec<_> = parser
        .parse_document(&category_page(), CATEGORY)
        .into_iter()
        .filter(|lot| filter::matches(lot, &settings))
        .collect();
    for lot in &first {
        assert!(!watchlist.seen(&lot.identity));
        watchlist.record(lot.identity.clone(), Utc::now());
    }

    // Second pass over the same document: nothing is new.
    let second: Vec<_> = parser
        .parse_document(&category_page(), CATEGORY)
        .into_iter()
        .filter(|lot| filter::matches(lot, &settings))
        .collect();
    assert_eq!(first.len(), second.len());
    for lot in &second {
        assert!(watchlist.seen(&lot.identity));
    }
}

#[test]
fn drifted_markup_still_produces_lots() {
    // None of the exact container selectors match this page; the
    // substring fallback picks up the drifted class names.
    let drifted = Html::parse_document(
        r#"<div class="offer-item-row">
             <h4>Steam account lvl 30</h4>
             <span class="item-cost">500 ₽</span>
             <a href="/lots/offer?id=9">open</a>
           </div>"#,
    );

    let parser = LotPageParser::from_defaults().unwrap();
    let lots = parser.parse_document(&drifted, CATEGORY);

    assert_eq!(lots.len(), 1);
    assert_eq!(lots[0].title, "Steam account lvl 30");
    assert_eq!(lots[0].price_value, Some(500.0));

    let settings = criteria();
    assert!(filter::matches(&lots[0], &settings));
}

#[test]
fn unpriced_lot_matches_and_reports_category_link() {
    let page = Html::parse_document(
        r#"<div class="tc-item">
             <div class="tc-desc-text">Steam gift without price</div>
           </div>"#,
    );

    let parser = LotPageParser::from_defaults().unwrap();
    let lots = parser.parse_document(&page, CATEGORY);
    assert_eq!(lots.len(), 1);

    let settings = criteria();
    // Unknown price passes the price rule vacuously.
    assert!(filter::matches(&lots[0], &settings));
    assert_eq!(lots[0].link_or_category(), CATEGORY);
}
