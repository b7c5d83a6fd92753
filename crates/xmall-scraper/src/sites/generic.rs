//! Fallback for hosts without a dedicated profile. Relies on common
//! storefront class names and schema.org / Open Graph markup.

use super::profile::{ImageRule, MetadataRule, OptionRule, SiteProfile, TableRule};

pub static GENERIC: SiteProfile = SiteProfile {
    name: "generic",
    title: &[
        "h1.product-title",
        "h1.title",
        ".product-name",
        ".product-title",
        "#product-title",
        ".item-title",
        "h1[itemprop='name']",
        ".product-detail h1",
        "meta[property='og:title']@content",
        "h1",
        "title",
    ],
    brand: &[
        ".brand",
        ".product-brand",
        "[itemprop='brand']",
        ".manufacturer",
        ".vendor",
    ],
    brand_pattern: Some(r"^(?:Brand:\s*)?(.+)$"),
    price: &[
        ".price",
        ".product-price",
        "[itemprop='price']",
        ".current-price",
        ".sale-price",
        ".regular-price",
        ".special-price",
        "meta[property='product:price:amount']@content",
    ],
    images: &[
        ImageRule {
            selector: "meta[property='og:image']",
            attrs: &["content"],
            rewrites: &[],
        },
        ImageRule {
            selector: ".product-image img, .gallery-image img, .main-image img, #main-image img, .product-photo img, [itemprop='image'], .product-gallery img",
            attrs: &["src", "data-src", "data-original"],
            rewrites: &[],
        },
    ],
    description: &[
        ".product-description",
        ".description",
        "[itemprop='description']",
        ".product-detail",
        ".item-description",
        "#description",
        ".product-info",
        "meta[name='description']@content",
    ],
    spec_tables: &[TableRule {
        rows: ".specifications tr, .product-specs tr, .technical-details tr, .product-features tr, .item-specs tr",
        key: "th, .label",
        value: "td, .value",
    }],
    definition_lists: &["dl.specifications, dl.product-specs, .specifications dl, .product-specs dl"],
    options: &[OptionRule::Select {
        selects: ".product-options select, .variation-select, .option-select, .product-variants select, .item-options select",
    }],
    categories: &[
        ".breadcrumb li a",
        ".category-path a",
        ".product-category a",
        ".breadcrumbs a",
        ".category-breadcrumb a",
    ],
    metadata: &[
        MetadataRule {
            key: "availability",
            selectors: &[
                ".stock-status",
                ".availability",
                ".inventory-status",
                "[itemprop='availability']",
                ".product-stock",
            ],
        },
        MetadataRule {
            key: "seller",
            selectors: &[
                ".seller-name",
                ".vendor-name",
                ".merchant-name",
                ".store-name",
                "[itemprop='seller']",
            ],
        },
        MetadataRule {
            key: "delivery",
            selectors: &[
                ".shipping-info",
                ".delivery-info",
                ".shipping-method",
                ".delivery-method",
            ],
        },
    ],
    ..SiteProfile::EMPTY
};
