//! Marketplace B (`ebay.*`).

use super::profile::{ImageRule, ItemIdRule, MetadataRule, OptionRule, SiteProfile, TableRule};

pub static EBAY: SiteProfile = SiteProfile {
    name: "ebay",
    referer: Some("https://www.ebay.com/"),
    title: &[
        "h1.x-item-title__mainTitle span",
        "h1.x-item-title__mainTitle",
        "h1.x-item-title",
        "#itemTitle",
    ],
    brand: &[
        ".ux-labels-values--brand .ux-labels-values__values",
        "[itemprop='brand'] [itemprop='name']",
    ],
    brand_pattern: None,
    price: &[
        ".x-price-primary span",
        ".x-price-primary",
        "#prcIsum",
        "#mm-saleDscPrc",
        "[itemprop='price']@content",
    ],
    price_split: None,
    currency: None,
    images: &[
        ImageRule {
            selector: ".ux-image-carousel-item.active img",
            attrs: &["data-zoom-src", "src", "data-src"],
            rewrites: &[],
        },
        ImageRule {
            selector: ".ux-image-carousel-item img",
            attrs: &["data-zoom-src", "src", "data-src"],
            rewrites: &[],
        },
        ImageRule {
            selector: "#icImg",
            attrs: &["src"],
            rewrites: &[("s-l300.", "s-l1600."), ("s-l500.", "s-l1600.")],
        },
    ],
    description: &[
        ".x-item-description",
        "#viTabs_0_is",
        ".itemDescriptionDiv",
        ".x-about-this-item",
    ],
    feature_bullets: &[],
    spec_tables: &[
        TableRule {
            rows: ".ux-layout-section-evo__col",
            key: ".ux-labels-values__labels",
            value: ".ux-labels-values__values",
        },
        TableRule {
            rows: ".ux-layout-section-evo__row",
            key: ".ux-labels-values__labels-content",
            value: ".ux-labels-values__values-content",
        },
        TableRule {
            rows: ".itemAttr tr",
            key: "td.attrLabels",
            value: "td:not(.attrLabels)",
        },
    ],
    spec_pairs: &[],
    definition_lists: &[".ux-layout-section__row dl"],
    options: &[
        OptionRule::Dropdown {
            container: ".x-msku__box-cont",
            label: "label",
            choices: "select option",
        },
        OptionRule::Select {
            selects: "select[name^='itemSelect']",
        },
    ],
    categories: &[
        ".seo-breadcrumb-text span",
        "nav.breadcrumbs li a span",
        ".ux-breadcrumb__item",
    ],
    metadata: &[
        MetadataRule {
            key: "condition",
            selectors: &[".x-item-condition-text .ux-textspans", "#vi-itm-cond"],
        },
        MetadataRule {
            key: "shipping",
            selectors: &[
                ".ux-labels-values--shipping .ux-labels-values__values",
                "#fshippingCost",
            ],
        },
        MetadataRule {
            key: "seller",
            selectors: &[
                ".x-sellercard-atf__info__about-seller a span",
                ".x-seller-persona__member-name",
                ".mbg-nw",
            ],
        },
        MetadataRule {
            key: "availability",
            selectors: &[".x-item-quantity", "#qtySubTxt"],
        },
    ],
    item_id: Some(ItemIdRule {
        url_pattern: r"/itm/(?:[^/?#]+/)?(\d+)",
        page: &["div[data-itemid]@data-itemid"],
    }),
};
