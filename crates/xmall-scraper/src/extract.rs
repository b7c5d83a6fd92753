//! Runs a [`SiteProfile`] over a fetched page to build a [`NormalizedProduct`].
//!
//! Every field degrades to its default when its selectors find nothing.

use std::collections::BTreeMap;

use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html};
use serde_json::Value;
use xmall_core::{NormalizedProduct, Price, ProductOption, UNKNOWN_PRODUCT_TITLE};

use crate::html::{all_texts, clean_text, collect_images, compile, element_text, first_text};
use crate::price::price_from_text;
use crate::sites::profile::{OptionRule, PriceSplit, SiteProfile, TableRule};

fn compile_pattern(profile: &SiteProfile, kind: &str, pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(profile = profile.name, kind, error = %e, "invalid profile pattern");
            None
        }
    }
}

/// A [`SiteProfile`] with its regex patterns compiled once.
#[derive(Debug, Clone)]
pub struct CompiledProfile {
    profile: &'static SiteProfile,
    brand: Option<Regex>,
    item_id: Option<Regex>,
}

impl CompiledProfile {
    /// Compiles the profile's patterns. An invalid pattern is logged and
    /// then behaves as if absent.
    #[must_use]
    pub fn new(profile: &'static SiteProfile) -> Self {
        Self {
            profile,
            brand: profile
                .brand_pattern
                .and_then(|p| compile_pattern(profile, "brand", p)),
            item_id: profile
                .item_id
                .and_then(|rule| compile_pattern(profile, "item_id", rule.url_pattern)),
        }
    }

    #[must_use]
    pub fn profile(&self) -> &'static SiteProfile {
        self.profile
    }

    /// Extracts a product from page HTML.
    ///
    /// `url` is both the recorded `source_url` and the base for resolving
    /// relative image references.
    #[must_use]
    pub fn extract(&self, html: &str, url: &str) -> NormalizedProduct {
        let profile = self.profile;
        let document = Html::parse_document(html);
        let root = document.root_element();
        let base = Url::parse(url).ok();

        let mut product = NormalizedProduct::new(url);

        product.title =
            first_text(root, profile.title).unwrap_or_else(|| UNKNOWN_PRODUCT_TITLE.to_string());
        product.brand = self.extract_brand(root);
        product.price = extract_price(root, profile);
        product.images = collect_images(root, base.as_ref(), profile.images, &product.title);
        product.description = extract_description(root, profile);
        product.specifications = extract_specifications(root, profile);
        product.options = extract_options(root, profile.options);
        product.categories = extract_categories(root, profile.categories);

        let metadata = &mut product.raw_metadata;
        metadata.insert("source".to_string(), Value::from(profile.name));
        for rule in profile.metadata {
            if let Some(value) = first_text(root, rule.selectors) {
                metadata.insert(rule.key.to_string(), Value::from(value));
            }
        }
        if let Some(item_id) = self.extract_item_id(root, url) {
            metadata.insert("item_id".to_string(), Value::from(item_id));
        }

        tracing::debug!(
            profile = profile.name,
            url,
            title = %product.title,
            images = product.images.len(),
            specs = product.specifications.len(),
            "extracted product fields"
        );

        product
    }

    fn extract_brand(&self, root: ElementRef<'_>) -> Option<String> {
        let raw = first_text(root, self.profile.brand)?;
        let cleaned = match &self.brand {
            Some(pattern) => pattern
                .captures(&raw)
                .and_then(|caps| caps.get(1))
                .map_or_else(|| raw.clone(), |m| m.as_str().trim().to_string()),
            None => raw,
        };
        (!cleaned.is_empty()).then_some(cleaned)
    }

    fn extract_item_id(&self, root: ElementRef<'_>, url: &str) -> Option<String> {
        let rule = self.profile.item_id?;
        self.item_id
            .as_ref()
            .and_then(|pattern| pattern.captures(url))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .or_else(|| first_text(root, rule.page))
    }
}

fn extract_price(root: ElementRef<'_>, profile: &SiteProfile) -> Price {
    let text = first_text(root, profile.price)
        .or_else(|| profile.price_split.and_then(|split| split_price_text(root, split)))
        .unwrap_or_default();
    price_from_text(&text, profile.currency)
}

/// Joins a price rendered as `<whole>12.</whole><fraction>99</fraction>`.
fn split_price_text(root: ElementRef<'_>, split: PriceSplit) -> Option<String> {
    let whole = first_text(root, &[split.whole])?;
    let whole = whole.trim_end_matches(['.', ',']);
    let fraction = first_text(root, &[split.fraction]).unwrap_or_default();
    let symbol = split
        .symbol
        .and_then(|s| first_text(root, &[s]))
        .unwrap_or_default();
    if fraction.is_empty() {
        Some(format!("{symbol}{whole}"))
    } else {
        Some(format!("{symbol}{whole}.{fraction}"))
    }
}

fn extract_description(root: ElementRef<'_>, profile: &SiteProfile) -> String {
    if let Some(text) = first_text(root, profile.description) {
        return text;
    }
    all_texts(root, profile.feature_bullets).join("\n")
}

/// Strips invisible direction marks and a trailing colon from a label.
fn clean_label(text: &str) -> String {
    let without_marks: String = text
        .chars()
        .filter(|c| !matches!(c, '\u{200e}' | '\u{200f}'))
        .collect();
    clean_text(&without_marks)
        .trim_end_matches([':', '：'])
        .trim()
        .to_string()
}

fn extract_specifications(root: ElementRef<'_>, profile: &SiteProfile) -> BTreeMap<String, String> {
    let mut specs = BTreeMap::new();
    let mut insert = |key: String, value: String| {
        if !key.is_empty() && !value.is_empty() {
            specs.entry(key).or_insert(value);
        }
    };

    for rule in profile.spec_tables {
        for (key, value) in table_pairs(root, rule) {
            insert(key, value);
        }
    }

    for spec in profile.spec_pairs {
        let Some(selector) = compile(spec) else {
            continue;
        };
        for item in root.select(&selector) {
            let text = clean_label(&element_text(item));
            if let Some((key, value)) = text.split_once(':') {
                insert(clean_label(key), clean_label(value));
            }
        }
    }

    for spec in profile.definition_lists {
        let Some(selector) = compile(spec) else {
            continue;
        };
        for list in root.select(&selector) {
            let mut pending: Option<String> = None;
            for child in list.children().filter_map(ElementRef::wrap) {
                match child.value().name() {
                    "dt" => pending = Some(clean_label(&element_text(child))),
                    "dd" => {
                        if let Some(key) = pending.take() {
                            insert(key, element_text(child));
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    specs
}

fn table_pairs(root: ElementRef<'_>, rule: &TableRule) -> Vec<(String, String)> {
    let (Some(rows), Some(key), Some(value)) =
        (compile(rule.rows), compile(rule.key), compile(rule.value))
    else {
        return Vec::new();
    };
    root.select(&rows)
        .filter_map(|row| {
            let k = row.select(&key).next().map(|el| clean_label(&element_text(el)))?;
            let v = row.select(&value).next().map(element_text)?;
            Some((k, clean_label(&v)))
        })
        .collect()
}

fn is_placeholder_choice(value: Option<&str>, text: &str) -> bool {
    text.is_empty() || text.contains("Select") || matches!(value, Some("-1" | ""))
}

fn push_unique(values: &mut Vec<String>, value: String) {
    if !value.is_empty() && !values.contains(&value) {
        values.push(value);
    }
}

fn select_choices(select: ElementRef<'_>, choices_css: &str) -> Vec<String> {
    let Some(choices) = compile(choices_css) else {
        return Vec::new();
    };
    let mut values = Vec::new();
    for choice in select.select(&choices) {
        let text = element_text(choice);
        if !is_placeholder_choice(choice.value().attr("value"), &text) {
            push_unique(&mut values, text);
        }
    }
    values
}

/// Titles a bare `<select>` from a preceding `<label>`, then `aria-label`, then `name`.
fn select_title(select: ElementRef<'_>) -> String {
    let label = select
        .prev_siblings()
        .filter_map(ElementRef::wrap)
        .next()
        .filter(|el| el.value().name() == "label")
        .map(|el| clean_label(&element_text(el)));
    label
        .filter(|l| !l.is_empty())
        .or_else(|| select.value().attr("aria-label").map(clean_label))
        .or_else(|| select.value().attr("name").map(clean_label))
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| "Option".to_string())
}

fn extract_options(root: ElementRef<'_>, rules: &[OptionRule]) -> Vec<ProductOption> {
    let mut options: Vec<ProductOption> = Vec::new();
    let mut push = |title: String, values: Vec<String>| {
        if !title.is_empty() && !values.is_empty() && !options.iter().any(|o| o.title == title) {
            options.push(ProductOption { title, values });
        }
    };

    for rule in rules {
        match *rule {
            OptionRule::Attribute {
                title,
                items,
                attr,
                strip_prefix,
            } => {
                let Some(selector) = compile(items) else {
                    continue;
                };
                let mut values = Vec::new();
                for item in root.select(&selector) {
                    let Some(raw) = item.value().attr(attr) else {
                        continue;
                    };
                    let value = clean_text(raw);
                    let value = value.strip_prefix(strip_prefix).unwrap_or(&value);
                    push_unique(&mut values, value.trim().to_string());
                }
                push(title.to_string(), values);
            }
            OptionRule::Text { title, items } => {
                let mut values = Vec::new();
                for value in all_texts(root, &[items]) {
                    push_unique(&mut values, value);
                }
                push(title.to_string(), values);
            }
            OptionRule::Dropdown {
                container,
                label,
                choices,
            } => {
                let Some(container) = compile(container) else {
                    continue;
                };
                for block in root.select(&container) {
                    let title = first_text(block, &[label])
                        .map(|t| clean_label(&t))
                        .unwrap_or_default();
                    push(title, select_choices(block, choices));
                }
            }
            OptionRule::Select { selects } => {
                let Some(selector) = compile(selects) else {
                    continue;
                };
                for select in root.select(&selector) {
                    push(select_title(select), select_choices(select, "option"));
                }
            }
        }
    }

    options
}

/// Breadcrumb entries, minus `Home` and separator-only crumbs.
fn extract_categories(root: ElementRef<'_>, specs: &[&str]) -> Vec<String> {
    let mut categories = Vec::new();
    for crumb in all_texts(root, specs) {
        if crumb.eq_ignore_ascii_case("home") || !crumb.chars().any(char::is_alphanumeric) {
            continue;
        }
        push_unique(&mut categories, crumb);
    }
    categories
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
