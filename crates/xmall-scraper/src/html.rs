//! DOM helpers shared by every HTML profile: selector cascades, text
//! cleanup, image collection and URL resolution.
//!
//! Nothing here fails. A missing element, an invalid selector or an
//! unresolvable URL yields `None` or an empty collection.

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use xmall_core::{normalize_images, ProductImage};

use crate::sites::profile::ImageRule;

/// Attribute holding a JSON object of `{ "<image url>": [width, height] }`.
pub(crate) const DYNAMIC_IMAGE_ATTR: &str = "data-a-dynamic-image";

/// Collapses runs of whitespace (including newlines) to single spaces and trims.
#[must_use]
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns the cleaned text content of an element.
#[must_use]
pub fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

/// Strips markup from an HTML fragment, keeping one text node per line.
#[must_use]
pub fn strip_html(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    parsed
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compiles a CSS selector, logging and skipping it when invalid.
pub(crate) fn compile(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(compiled) => Some(compiled),
        Err(e) => {
            tracing::warn!(selector, error = %e, "skipping invalid CSS selector");
            None
        }
    }
}

fn is_attr_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'))
}

/// Splits `css@attr` into its selector and attribute parts.
///
/// Only a trailing `@name` counts, so an `@` inside an attribute value
/// (`a[href^='mailto:x@y']`) stays part of the selector.
fn split_spec(spec: &str) -> (&str, Option<&str>) {
    match spec.rsplit_once('@') {
        Some((css, attr)) if !css.is_empty() && is_attr_name(attr) => (css, Some(attr)),
        _ => (spec, None),
    }
}

fn read_value(element: ElementRef<'_>, attr: Option<&str>) -> String {
    match attr {
        Some(name) => element.value().attr(name).map(clean_text).unwrap_or_default(),
        None => element_text(element),
    }
}

/// Tries each selector spec in order and returns the first non-empty value.
pub(crate) fn first_text(root: ElementRef<'_>, specs: &[&str]) -> Option<String> {
    specs.iter().find_map(|spec| {
        let (css, attr) = split_spec(spec);
        let selector = compile(css)?;
        root.select(&selector)
            .map(|el| read_value(el, attr))
            .find(|value| !value.is_empty())
    })
}

/// Returns every non-empty value of the first selector spec that yields any.
pub(crate) fn all_texts(root: ElementRef<'_>, specs: &[&str]) -> Vec<String> {
    for spec in specs {
        let (css, attr) = split_spec(spec);
        let Some(selector) = compile(css) else {
            continue;
        };
        let values: Vec<String> = root
            .select(&selector)
            .map(|el| read_value(el, attr))
            .filter(|value| !value.is_empty())
            .collect();
        if !values.is_empty() {
            return values;
        }
    }
    Vec::new()
}

/// Resolves an image or link reference against the page URL.
///
/// Protocol-relative (`//host/x`) references take the page's scheme;
/// root-relative and relative references are joined onto the page URL.
/// `data:` and `javascript:` URIs are rejected.
#[must_use]
pub fn resolve_url(base: Option<&Url>, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("data:") || raw.starts_with("javascript:") {
        return None;
    }
    if let Some(rest) = raw.strip_prefix("//") {
        let scheme = base.map_or("https", Url::scheme);
        return Some(format!("{scheme}://{rest}"));
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    base.and_then(|b| b.join(raw).ok()).map(String::from)
}

/// Picks the largest image from a dynamic-image JSON map.
fn largest_dynamic_image(raw: &str) -> Option<String> {
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) else {
        return None;
    };
    let area = |dims: &Value| -> u64 {
        dims.as_array()
            .map(|d| d.iter().filter_map(Value::as_u64).product())
            .unwrap_or(0)
    };
    map.iter()
        .filter(|(url, _)| !url.trim().is_empty())
        .max_by_key(|(_, dims)| area(dims))
        .map(|(url, _)| url.clone())
}

/// Returns the first usable source among `attrs` on an image element.
fn image_source(element: ElementRef<'_>, attrs: &[&str]) -> Option<String> {
    attrs.iter().find_map(|attr| {
        let raw = element.value().attr(attr)?.trim();
        if raw.is_empty() || raw.starts_with("data:") {
            return None;
        }
        if *attr == DYNAMIC_IMAGE_ATTR {
            largest_dynamic_image(raw)
        } else {
            Some(raw.to_string())
        }
    })
}

/// Collects product images across all rules, in rule then document order.
///
/// The result is de-duplicated by resolved URL and its first entry is main.
/// Images without `alt` text get `default_alt`.
#[must_use]
pub fn collect_images(
    root: ElementRef<'_>,
    base: Option<&Url>,
    rules: &[ImageRule],
    default_alt: &str,
) -> Vec<ProductImage> {
    let mut images = Vec::new();
    for rule in rules {
        let Some(selector) = compile(rule.selector) else {
            continue;
        };
        for element in root.select(&selector) {
            let Some(raw) = image_source(element, rule.attrs) else {
                continue;
            };
            let Some(mut url) = resolve_url(base, &raw) else {
                continue;
            };
            for (from, to) in rule.rewrites {
                url = url.replace(from, to);
            }
            let alt = element
                .value()
                .attr("alt")
                .map(clean_text)
                .filter(|alt| !alt.is_empty())
                .unwrap_or_else(|| default_alt.to_string());
            images.push(ProductImage::new(url, alt));
        }
    }
    normalize_images(images)
}

#[cfg(test)]
#[path = "html_test.rs"]
mod tests;
