//! Fixed-rate conversion of product prices to KRW.

use std::collections::HashMap;

const DEFAULT_RATES: &[(&str, f64)] = &[
    ("USD", 1375.0),
    ("EUR", 1500.0),
    ("JPY", 9.0),
    ("GBP", 1750.0),
    ("AUD", 900.0),
    ("CAD", 1000.0),
    ("CNY", 190.0),
    ("HKD", 175.0),
    ("KRW", 1.0),
];

/// KRW per unit of each currency code.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    rates: HashMap<String, f64>,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            rates: DEFAULT_RATES
                .iter()
                .map(|&(code, rate)| (code.to_string(), rate))
                .collect(),
        }
    }
}

impl RateTable {
    /// Overrides or adds the rate for `code`.
    #[must_use]
    pub fn with_rate(mut self, code: &str, krw_per_unit: f64) -> Self {
        self.rates.insert(code.to_ascii_uppercase(), krw_per_unit);
        self
    }

    /// Rate for `code`, or `1.0` for currencies not in the table.
    #[must_use]
    pub fn rate(&self, code: &str) -> f64 {
        self.rates
            .get(code.trim().to_ascii_uppercase().as_str())
            .copied()
            .unwrap_or(1.0)
    }

    /// Converts `value` in `code` to KRW, rounded to two decimal places.
    ///
    /// ```
    /// use xmall_enrich::RateTable;
    ///
    /// let rates = RateTable::default();
    /// assert_eq!(rates.convert_to_krw(10.0, "USD"), 13_750.0);
    /// assert_eq!(rates.convert_to_krw(10.0, "XYZ"), 10.0);
    /// ```
    #[must_use]
    pub fn convert_to_krw(&self, value: f64, code: &str) -> f64 {
        round2(value * self.rate(code))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
