//! Price and time normalization shared by both adapters.

use serde_json::Value;

/// Strips every non-digit character and parses what remains.
///
/// `"85,000원"` → `Some(85000)`. An input with no digits (e.g. `"문의"`) or a
/// value too large to be a real green fee yields `None`, the "unknown" price.
#[must_use]
pub fn normalize_price(raw: &str) -> Option<u32> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u32>().ok()
}

/// Price from a JSON field that may be a number or a formatted string.
#[must_use]
pub fn price_from_json(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && *f <= f64::from(u32::MAX))
                    .map(|f| {
                        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                        let rounded = f.round() as u32;
                        rounded
                    })
            }),
        Value::String(s) => normalize_price(s),
        _ => None,
    }
}

/// Hour bucket from an `HH:MM` (or bare `HH`) slot time.
#[must_use]
pub fn parse_hour(raw: &str) -> Option<u8> {
    let hour = raw.trim().split(':').next()?.trim();
    if hour.is_empty() || hour.len() > 2 {
        return None;
    }
    hour.parse::<u8>().ok().filter(|h| *h <= 23)
}
