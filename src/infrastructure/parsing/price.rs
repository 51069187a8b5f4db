//! Price normalization for freeform marketplace price strings.

use once_cell::sync::Lazy;
use regex::Regex;

/// First run of digits with an optional fraction part.
static PRICE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.?\d*").expect("price pattern is valid"));

/// Extract a numeric price from freeform text like `"1 234,50 ₽"`.
///
/// Commas are unified to decimal points, regular and non-breaking
/// spaces are stripped, and the first digit run wins; trailing
/// currency symbols or words are ignored. Returns `None` on any
/// failure instead of erroring - an unparseable price is "unknown",
/// never a fault.
pub fn normalize_price(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }

    // The marketplace formats thousands with NBSP (and sometimes the
    // narrow U+202F variant) and decimals with a comma.
    let unified: String = text
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    PRICE_PATTERN
        .find(&unified)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}
