//! Declarative description of how to read one site family's product page.
//!
//! A profile is plain data. Every selector list is tried in order and the
//! first non-empty match wins. A selector of the form `css@attr` reads the
//! attribute instead of the element's text (e.g. `meta[property='og:title']@content`).

/// Field extraction rules for an HTML storefront.
#[derive(Debug)]
pub struct SiteProfile {
    /// Short identifier recorded as `raw_metadata.source`.
    pub name: &'static str,
    /// `Referer` sent with page requests.
    pub referer: Option<&'static str>,
    pub title: &'static [&'static str],
    pub brand: &'static [&'static str],
    /// Regex with one capture group that strips labels like `Brand: Acme`.
    pub brand_pattern: Option<&'static str>,
    pub price: &'static [&'static str],
    /// Used when none of the `price` selectors match.
    pub price_split: Option<PriceSplit>,
    /// Fixed currency for the site. `None` detects it from the price text.
    pub currency: Option<&'static str>,
    pub images: &'static [ImageRule],
    pub description: &'static [&'static str],
    /// Bullet lists joined into a description when `description` finds nothing.
    pub feature_bullets: &'static [&'static str],
    pub spec_tables: &'static [TableRule],
    /// List items shaped like `key: value`.
    pub spec_pairs: &'static [&'static str],
    /// `<dl>` containers whose `dt`/`dd` children form pairs.
    pub definition_lists: &'static [&'static str],
    pub options: &'static [OptionRule],
    pub categories: &'static [&'static str],
    pub metadata: &'static [MetadataRule],
    pub item_id: Option<ItemIdRule>,
}

/// A price rendered as separate integer and fraction elements.
#[derive(Debug, Clone, Copy)]
pub struct PriceSplit {
    pub whole: &'static str,
    pub fraction: &'static str,
    /// Optional element holding the currency symbol.
    pub symbol: Option<&'static str>,
}

/// Where to find images and which attributes hold their URL.
#[derive(Debug, Clone, Copy)]
pub struct ImageRule {
    pub selector: &'static str,
    /// Tried in order. `data-a-dynamic-image` is parsed as a JSON map keyed by URL.
    pub attrs: &'static [&'static str],
    /// Substring replacements applied to each URL (thumbnail to full size).
    pub rewrites: &'static [(&'static str, &'static str)],
}

/// A table-like block of specification rows.
#[derive(Debug, Clone, Copy)]
pub struct TableRule {
    pub rows: &'static str,
    pub key: &'static str,
    pub value: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub enum OptionRule {
    /// Each matched item carries its value in an attribute, e.g. swatches with `title`.
    Attribute {
        title: &'static str,
        items: &'static str,
        attr: &'static str,
        /// Prefix removed from each value, e.g. `Click to select `.
        strip_prefix: &'static str,
    },
    /// Each matched item's text is a value.
    Text {
        title: &'static str,
        items: &'static str,
    },
    /// A container holding a label element and a `<select>`.
    Dropdown {
        container: &'static str,
        label: &'static str,
        choices: &'static str,
    },
    /// Bare `<select>` elements titled by a preceding `<label>`, `aria-label` or `name`.
    Select { selects: &'static str },
}

/// A free-form metadata field copied into `raw_metadata[key]`.
#[derive(Debug, Clone, Copy)]
pub struct MetadataRule {
    pub key: &'static str,
    pub selectors: &'static [&'static str],
}

/// How to recover the site's own item identifier.
#[derive(Debug, Clone, Copy)]
pub struct ItemIdRule {
    /// Regex over the product URL with one capture group.
    pub url_pattern: &'static str,
    /// Page selectors tried when the URL does not match.
    pub page: &'static [&'static str],
}

impl SiteProfile {
    /// An empty profile, used as the base for struct-update syntax.
    pub const EMPTY: SiteProfile = SiteProfile {
        name: "",
        referer: None,
        title: &[],
        brand: &[],
        brand_pattern: None,
        price: &[],
        price_split: None,
        currency: None,
        images: &[],
        description: &[],
        feature_bullets: &[],
        spec_tables: &[],
        spec_pairs: &[],
        definition_lists: &[],
        options: &[],
        categories: &[],
        metadata: &[],
        item_id: None,
    };
}

/// Description of a site that serves product data from a private JSON API.
#[derive(Debug)]
pub struct ApiDescriptor {
    pub name: &'static str,
    /// Used when no base URL override is configured.
    pub default_base_url: &'static str,
    /// Path and query appended to the base URL. `{id}` is replaced by the item id.
    pub endpoint: &'static str,
    /// Regex over the product URL with one capture group for the item id.
    pub item_id_pattern: &'static str,
    /// Path segment preceding the item id, scanned when the regex misses.
    pub item_path_segment: &'static str,
    pub headers: &'static [(&'static str, &'static str)],
    pub envelope: EnvelopeRule,
    /// Maps the envelope's data object to a product.
    pub normalize: fn(&ApiItem<'_>) -> xmall_core::NormalizedProduct,
}

/// JSON pointers into the API's success/failure wrapper.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeRule {
    pub code: &'static str,
    pub success_code: i64,
    pub data: &'static str,
    pub message: &'static str,
}

/// An item payload handed to [`ApiDescriptor::normalize`].
#[derive(Debug)]
pub struct ApiItem<'a> {
    pub source_url: &'a str,
    pub item_id: &'a str,
    pub data: &'a serde_json::Value,
}
