//! Rebuilds a [`NormalizedProduct`] from a cached payload.
//!
//! Cached files may predate the current record shape, so every field is read
//! leniently: current snake_case layout first, then the older
//! `{ "original": ... }` wrappers and alternate key names. Nothing here fails.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use xmall_core::{
    normalize_images, NormalizedProduct, Price, ProductImage, ProductOption, FROM_CACHE_KEY,
    PLACEHOLDER_IMAGE_ALT, PLACEHOLDER_IMAGE_URL, UNKNOWN_PRODUCT_TITLE,
};

use crate::cache::CacheEntry;
use crate::price::{detect_currency, parse_price_value};

/// Reads a string that may be stored bare or as `{ "original": "..." }`.
fn text_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Object(map) => map
            .get("original")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
    .filter(|s| !s.is_empty())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(_) | Value::Bool(_) => Some(value.to_string()),
        _ => None,
    }
}

fn restore_price(payload: &Map<String, Value>) -> Price {
    let price = payload.get("price");
    let (text, value, currency) = match price {
        Some(Value::Object(map)) => (
            text_field(map.get("text")).or_else(|| text_field(map.get("original"))),
            map.get("value"),
            map.get("currency").and_then(Value::as_str),
        ),
        Some(other @ (Value::String(_) | Value::Number(_))) => {
            (scalar_text(other), Some(other), None)
        }
        _ => (None, None, None),
    };
    let text = text.unwrap_or_default();
    let currency = currency
        .or_else(|| payload.get("currency").and_then(Value::as_str))
        .filter(|c| !c.trim().is_empty())
        .map_or_else(|| detect_currency(&text).to_string(), str::to_string);
    let value = match value {
        Some(v) if !v.is_null() => parse_price_value(v),
        _ => parse_price_value(&Value::String(text.clone())),
    };
    Price::new(text, value, currency)
}

fn restore_image(value: &Value) -> Option<ProductImage> {
    match value {
        Value::String(url) => Some(ProductImage::new(url.as_str(), "")),
        Value::Object(map) => {
            let url = map.get("url").and_then(Value::as_str)?;
            let alt = map
                .get("alt_text")
                .or_else(|| map.get("alt"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            Some(ProductImage::new(url, alt))
        }
        _ => None,
    }
}

fn restore_images(payload: &Map<String, Value>) -> Vec<ProductImage> {
    let mut images: Vec<ProductImage> = Vec::new();
    if let Some(main) = payload.get("main_image").and_then(restore_image) {
        images.push(main);
    }
    if let Some(list) = payload.get("images").and_then(Value::as_array) {
        images.extend(list.iter().filter_map(restore_image));
    }

    let mut images = normalize_images(images);
    if images.is_empty() {
        let mut placeholder = ProductImage::new(PLACEHOLDER_IMAGE_URL, PLACEHOLDER_IMAGE_ALT);
        placeholder.is_main = true;
        images.push(placeholder);
    }
    images
}

fn restore_specifications(payload: &Map<String, Value>) -> BTreeMap<String, String> {
    let map = match payload.get("specifications") {
        Some(Value::Object(map)) => match map.get("original") {
            Some(Value::Object(inner)) => inner,
            _ => map,
        },
        _ => return BTreeMap::new(),
    };
    map.iter()
        .filter_map(|(k, v)| {
            let value = match v {
                Value::Null => return None,
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            };
            (!k.trim().is_empty() && !value.is_empty()).then(|| (k.trim().to_string(), value))
        })
        .collect()
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(scalar_text)
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn restore_options(payload: &Map<String, Value>) -> Vec<ProductOption> {
    let Some(list) = payload.get("options").and_then(Value::as_array) else {
        return Vec::new();
    };
    list.iter()
        .filter_map(|item| {
            let title = text_field(item.get("title"))?;
            let values = item.get("values").or_else(|| item.get("option_values"));
            Some(ProductOption {
                title,
                values: string_list(values),
            })
        })
        .collect()
}

fn restore_fetched_at(payload: &Map<String, Value>, created_at: i64) -> DateTime<Utc> {
    let parsed = match payload.get("fetched_at") {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Some(Value::Number(n)) => n.as_i64().and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        _ => None,
    };
    parsed
        .or_else(|| Utc.timestamp_opt(created_at, 0).single())
        .unwrap_or_else(Utc::now)
}

/// Reconstructs a product from a cache entry and tags it as served from cache.
///
/// `source_url` wins over any URL recorded inside the payload.
#[must_use]
pub fn restore_product(source_url: &str, entry: &CacheEntry) -> NormalizedProduct {
    let empty = Map::new();
    let payload = entry.data.as_object().unwrap_or(&empty);

    let mut product = NormalizedProduct::new(source_url);
    product.title = text_field(payload.get("title"))
        .unwrap_or_else(|| UNKNOWN_PRODUCT_TITLE.to_string());
    product.brand = text_field(payload.get("brand"));
    product.price = restore_price(payload);
    product.images = restore_images(payload);
    product.description = text_field(payload.get("description")).unwrap_or_default();
    product.specifications = restore_specifications(payload);
    product.options = restore_options(payload);
    product.categories = string_list(payload.get("categories"));
    product.raw_metadata = payload
        .get("raw_metadata")
        .or_else(|| payload.get("raw_data"))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    product
        .raw_metadata
        .insert(FROM_CACHE_KEY.to_string(), Value::Bool(true));
    product.fetched_at = restore_fetched_at(payload, entry.created_at);
    product
}

#[cfg(test)]
#[path = "restore_test.rs"]
mod tests;
