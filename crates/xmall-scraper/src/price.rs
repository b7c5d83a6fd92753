//! Price and currency parsing shared by every strategy.
//!
//! Both functions are total: they never fail, whatever the display text.

use serde_json::Value;
use xmall_core::Price;

/// Currency used when the text carries no recognizable symbol.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Symbol to ISO 4217 code, compound symbols first so `A$` is not read as `$`.
const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("A$", "AUD"),
    ("C$", "CAD"),
    ("HK$", "HKD"),
    ("$", "USD"),
    ("£", "GBP"),
    ("€", "EUR"),
    ("¥", "JPY"),
    ("₩", "KRW"),
    ("₹", "INR"),
    ("₽", "RUB"),
    ("฿", "THB"),
];

/// Parses the numeric amount out of display text.
///
/// Every character other than ASCII digits and `.` is dropped and the rest
/// is parsed as `f64`. Anything that does not parse yields `0.0`.
///
/// ```
/// assert!((xmall_scraper::price::parse_price("$1,234.56") - 1234.56).abs() < 1e-9);
/// assert!(xmall_scraper::price::parse_price("N/A").abs() < f64::EPSILON);
/// ```
#[must_use]
pub fn parse_price(text: &str) -> f64 {
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    match digits.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        _ => 0.0,
    }
}

/// Parses a price from an arbitrary JSON value by stringifying it first.
#[must_use]
pub fn parse_price_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n
            .as_f64()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(0.0),
        Value::String(s) => parse_price(s),
        Value::Null => 0.0,
        other => parse_price(&other.to_string()),
    }
}

/// Detects the ISO 4217 code from the first known currency symbol in `text`.
#[must_use]
pub fn detect_currency(text: &str) -> &'static str {
    CURRENCY_SYMBOLS
        .iter()
        .find(|(symbol, _)| text.contains(symbol))
        .map_or(DEFAULT_CURRENCY, |(_, code)| code)
}

/// Builds a [`Price`] from display text. `currency` overrides detection.
#[must_use]
pub fn price_from_text(text: &str, currency: Option<&str>) -> Price {
    let currency = currency.unwrap_or_else(|| detect_currency(text));
    Price::new(text, parse_price(text), currency)
}
