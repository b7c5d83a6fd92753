use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Title used when no strategy could recover one from the source.
pub const UNKNOWN_PRODUCT_TITLE: &str = "Unknown Product";

/// Main image substituted when a cached record carries no usable image.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/400x400?text=No+Image";
pub const PLACEHOLDER_IMAGE_ALT: &str = "No Image Available";

/// Metadata key set on records served from the cache rather than the network.
pub const FROM_CACHE_KEY: &str = "from_cache";

/// A product listing extracted from a foreign storefront, normalized so every
/// site strategy produces the same shape.
///
/// Text fields hold the original-language values. Enrichment (translation,
/// currency conversion) produces a separate copy and never rewrites these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedProduct {
    /// The product page the record was extracted from. Also the cache key.
    pub source_url: String,
    pub title: String,
    pub brand: Option<String>,
    pub price: Price,
    /// Page or gallery order. The first entry is the main image.
    pub images: Vec<ProductImage>,
    pub description: String,
    pub specifications: BTreeMap<String, String>,
    pub options: Vec<ProductOption>,
    /// Breadcrumb trail, root to leaf.
    pub categories: Vec<String>,
    /// Site-specific extras (seller, availability, item id, raw API payload).
    /// Passed through untouched.
    pub raw_metadata: Map<String, Value>,
    pub fetched_at: DateTime<Utc>,
}

impl NormalizedProduct {
    /// Creates an empty record for `source_url` stamped with the current time.
    #[must_use]
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            title: UNKNOWN_PRODUCT_TITLE.to_string(),
            brand: None,
            price: Price::default(),
            images: Vec::new(),
            description: String::new(),
            specifications: BTreeMap::new(),
            options: Vec::new(),
            categories: Vec::new(),
            raw_metadata: Map::new(),
            fetched_at: Utc::now(),
        }
    }

    /// Returns the image flagged as main, if any.
    #[must_use]
    pub fn main_image(&self) -> Option<&ProductImage> {
        self.images.iter().find(|image| image.is_main)
    }

    /// Returns `true` if this record was reconstructed from the cache.
    #[must_use]
    pub fn is_from_cache(&self) -> bool {
        self.raw_metadata
            .get(FROM_CACHE_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Returns a string metadata value, if present.
    #[must_use]
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.raw_metadata.get(key).and_then(Value::as_str)
    }
}

/// A displayed price: the raw text as shown, the parsed amount, and the
/// ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub text: String,
    /// Amount in the source currency. Never negative; `0.0` when unparsable.
    pub value: f64,
    pub currency: String,
}

impl Price {
    /// Builds a price, clamping negative or non-finite amounts to `0.0`.
    #[must_use]
    pub fn new(text: impl Into<String>, value: f64, currency: impl Into<String>) -> Self {
        let value = if value.is_finite() && value > 0.0 {
            value
        } else {
            0.0
        };
        Self {
            text: text.into(),
            value,
            currency: currency.into(),
        }
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::new("", 0.0, "USD")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    pub alt_text: String,
    pub is_main: bool,
}

impl ProductImage {
    #[must_use]
    pub fn new(url: impl Into<String>, alt_text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt_text: alt_text.into(),
            is_main: false,
        }
    }
}

/// A purchasable dimension such as color or size, with its choices in page order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    pub title: String,
    pub values: Vec<String>,
}

/// Enforces the image invariants: no empty URLs, no duplicate URLs, and
/// exactly the first surviving image marked main.
#[must_use]
pub fn normalize_images<I>(images: I) -> Vec<ProductImage>
where
    I: IntoIterator<Item = ProductImage>,
{
    let mut seen = HashSet::new();
    let mut out: Vec<ProductImage> = images
        .into_iter()
        .filter_map(|mut image| {
            image.url = image.url.trim().to_string();
            if image.url.is_empty() || !seen.insert(image.url.clone()) {
                return None;
            }
            image.is_main = false;
            Some(image)
        })
        .collect();

    if let Some(first) = out.first_mut() {
        first.is_main = true;
    }
    out
}
