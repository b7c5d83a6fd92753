//! B2B wholesale platform (`vvic.*`), read through its item detail API.
//!
//! Prices on this platform are always quoted in CNY regardless of the
//! displayed text, so the currency is fixed rather than detected.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use xmall_core::{normalize_images, NormalizedProduct, Price, ProductImage, ProductOption};

use super::profile::{ApiDescriptor, ApiItem, EnvelopeRule};
use crate::html::{clean_text, resolve_url, strip_html};
use crate::price::parse_price_value;

pub const VVIC_CURRENCY: &str = "CNY";

const BRAND_ATTR: &str = "品牌";

pub static VVIC: ApiDescriptor = ApiDescriptor {
    name: "vvic",
    default_base_url: "https://www.vvic.com",
    endpoint: "/apif/item/{id}/detail?lang=ko",
    item_id_pattern: r"item/([^/?#]+)",
    item_path_segment: "item",
    headers: &[
        ("Referer", "https://www.vvic.com/"),
        ("Accept-Language", "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7"),
        ("Accept", "application/json, text/plain, */*"),
    ],
    envelope: EnvelopeRule {
        code: "/code",
        success_code: 200,
        data: "/data",
        message: "/msg",
    },
    normalize: normalize_item,
};

fn str_field<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Renders scalars as plain text; nested values fall back to compact JSON.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if !values.iter().any(|v| v == part) {
            values.push(part.to_string());
        }
    }
    values
}

fn extract_images(data: &Value) -> Vec<ProductImage> {
    let gallery = str_field(data, "imgs").map(split_list).unwrap_or_default();
    let swatches: Vec<String> = data
        .get("color_pics")
        .and_then(Value::as_array)
        .map(|pics| pics.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();

    let mut images = Vec::new();
    for (i, raw) in gallery.iter().enumerate() {
        if let Some(url) = resolve_url(None, raw) {
            images.push(ProductImage::new(url, format!("Product image {}", i + 1)));
        }
    }
    for (i, raw) in swatches.iter().enumerate() {
        if let Some(url) = resolve_url(None, raw) {
            images.push(ProductImage::new(url, format!("Color image {}", i + 1)));
        }
    }
    normalize_images(images)
}

fn extract_description(data: &Value) -> String {
    let mut parts = Vec::new();
    if let Some(desc) = data.get("item_desc") {
        for key in ["desc", "tags_desc"] {
            if let Some(html) = str_field(desc, key) {
                let text = strip_html(html);
                if !text.is_empty() {
                    parts.push(text);
                }
            }
        }
    }
    if let Some(tips) = str_field(data, "deliveryTimeTips") {
        parts.push(format!("Delivery:\n{tips}"));
    }
    parts.join("\n\n")
}

fn extract_specifications(attrs: Option<&Map<String, Value>>) -> BTreeMap<String, String> {
    attrs
        .into_iter()
        .flatten()
        .filter_map(|(key, value)| {
            let key = clean_text(key);
            let value = value_text(value);
            (!key.is_empty() && !value.is_empty()).then_some((key, value))
        })
        .collect()
}

fn extract_options(data: &Value) -> Vec<ProductOption> {
    [("Color", "color"), ("Size", "size")]
        .into_iter()
        .filter_map(|(title, key)| {
            let values = split_list(str_field(data, key)?);
            (!values.is_empty()).then(|| ProductOption {
                title: title.to_string(),
                values,
            })
        })
        .collect()
}

fn extract_categories(data: &Value) -> Vec<String> {
    data.get("breadCrumbs")
        .and_then(Value::as_array)
        .map(|crumbs| {
            crumbs
                .iter()
                .filter_map(|crumb| str_field(crumb, "name"))
                .filter(|name| !name.eq_ignore_ascii_case("home"))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Maps the item detail payload to a product.
#[must_use]
pub fn normalize_item(item: &ApiItem<'_>) -> NormalizedProduct {
    let data = item.data;
    let attrs = data.get("attrs_json").and_then(Value::as_object);

    let mut product = NormalizedProduct::new(item.source_url);
    if let Some(title) = str_field(data, "title") {
        product.title = clean_text(title);
    }

    product.brand = attrs
        .and_then(|a| a.get(BRAND_ATTR))
        .map(value_text)
        .filter(|b| !b.is_empty())
        .or_else(|| str_field(data, "brand").map(str::to_string));

    let price_raw = data.get("price").unwrap_or(&Value::Null);
    product.price = Price::new(
        value_text(price_raw),
        parse_price_value(price_raw),
        VVIC_CURRENCY,
    );

    product.images = extract_images(data);
    product.description = extract_description(data);
    product.specifications = extract_specifications(attrs);
    product.options = extract_options(data);
    product.categories = extract_categories(data);

    let metadata = &mut product.raw_metadata;
    metadata.insert("source".to_string(), Value::from(VVIC.name));
    metadata.insert("item_id".to_string(), Value::from(item.item_id));
    for (meta_key, field) in [
        ("product_code", "art_no"),
        ("delivery_time", "deliveryTime"),
        ("delivery_tips", "deliveryTimeTips"),
    ] {
        if let Some(value) = str_field(data, field) {
            metadata.insert(meta_key.to_string(), Value::from(value));
        }
    }
    metadata.insert("original_data".to_string(), data.clone());

    product
}
