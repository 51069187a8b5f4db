//! Match policy: decides whether a scanned lot satisfies a user's
//! keyword and price criteria.

use crate::domain::lot::Lot;
use crate::domain::settings::UserSettings;

/// Return the first keyword contained in the lot's title, if the lot
/// also passes the price rule.
///
/// Keyword rule: case-insensitive substring containment against the
/// title. An empty keyword list matches nothing; search requires
/// configured keywords.
///
/// Price rule: a lot without a normalized price passes vacuously. A
/// priced lot must satisfy `min_price <= p` and, when an upper bound
/// is set, `p <= max_price`.
pub fn match_lot<'a>(lot: &Lot, settings: &'a UserSettings) -> Option<&'a str> {
    let title = lot.title.to_lowercase();
    let keyword = settings
        .keywords
        .iter()
        .find(|kw| title.contains(kw.as_str()))?;

    if let Some(price) = lot.price_value {
        if price < settings.min_price {
            return None;
        }
        if let Some(max) = settings.max_price {
            if price > max {
                return None;
            }
        }
    }

    Some(keyword)
}

/// Boolean convenience over [`match_lot`].
pub fn matches(lot: &Lot, settings: &UserSettings) -> bool {
    match_lot(lot, settings).is_some()
}
