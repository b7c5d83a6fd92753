//! Marketplace A (`amazon.*`).

use super::profile::{
    ImageRule, ItemIdRule, MetadataRule, OptionRule, PriceSplit, SiteProfile, TableRule,
};

pub static AMAZON: SiteProfile = SiteProfile {
    name: "amazon",
    referer: Some("https://www.amazon.com/"),
    title: &[
        "#productTitle",
        "span.product-title-word-break",
        "h1.a-size-large",
        "meta[name='title']@content",
    ],
    brand: &["#bylineInfo", "a#brand", ".po-brand .a-span9 span"],
    brand_pattern: Some(r"^(?:Visit the\s+)?(?:Brand:\s*)?(.+?)(?:\s+Store)?$"),
    price: &[
        "#corePrice_feature_div .a-offscreen",
        "#corePriceDisplay_desktop_feature_div .a-offscreen",
        "#priceblock_ourprice",
        "#priceblock_dealprice",
        "#priceblock_saleprice",
        "#price_inside_buybox",
        ".a-price .a-offscreen",
    ],
    price_split: Some(PriceSplit {
        whole: "span.a-price-whole",
        fraction: "span.a-price-fraction",
        symbol: Some("span.a-price-symbol"),
    }),
    currency: None,
    images: &[
        ImageRule {
            selector: "#landingImage",
            attrs: &["data-old-hires", "data-a-dynamic-image", "src"],
            rewrites: &[],
        },
        ImageRule {
            selector: "#imgBlkFront",
            attrs: &["data-a-dynamic-image", "src"],
            rewrites: &[],
        },
        ImageRule {
            selector: "#main-image",
            attrs: &["src", "data-src"],
            rewrites: &[],
        },
        ImageRule {
            selector: "#altImages li.item img",
            attrs: &["src", "data-src"],
            rewrites: &[("._SS40_", "._SL1500_"), ("._AC_US40_", "._AC_SL1500_")],
        },
    ],
    description: &["#productDescription", "#aplus_feature_div", "#aplus"],
    feature_bullets: &[
        "#feature-bullets li span.a-list-item",
        "#feature-bullets li",
    ],
    spec_tables: &[
        TableRule {
            rows: "#productDetails_techSpec_section_1 tr",
            key: "th",
            value: "td",
        },
        TableRule {
            rows: "#productDetails_detailBullets_sections1 tr",
            key: "th",
            value: "td",
        },
        TableRule {
            rows: "#technicalSpecifications_section_1 tr",
            key: "th",
            value: "td",
        },
        TableRule {
            rows: "#productOverview_feature_div tr",
            key: "td.a-span3",
            value: "td.a-span9",
        },
    ],
    spec_pairs: &["#detailBullets_feature_div li"],
    definition_lists: &[],
    options: &[
        OptionRule::Attribute {
            title: "Color",
            items: "#variation_color_name li[title]",
            attr: "title",
            strip_prefix: "Click to select ",
        },
        OptionRule::Text {
            title: "Size",
            items: "#variation_size_name li",
        },
        OptionRule::Dropdown {
            container: ".a-dropdown-container",
            label: "label",
            choices: "select option",
        },
    ],
    categories: &["#wayfinding-breadcrumbs_feature_div li a"],
    metadata: &[
        MetadataRule {
            key: "availability",
            selectors: &["#availability span", "#availability"],
        },
        MetadataRule {
            key: "seller",
            selectors: &["#sellerProfileTriggerId", "#merchant-info a", "#merchant-info"],
        },
        MetadataRule {
            key: "delivery",
            selectors: &[
                "#mir-layout-DELIVERY_BLOCK-slot-PRIMARY_DELIVERY_MESSAGE_LARGE",
                "#deliveryMessageMirId",
                "#delivery-message",
            ],
        },
        MetadataRule {
            key: "rating",
            selectors: &["#acrPopover span.a-icon-alt", "#acrPopover@title"],
        },
        MetadataRule {
            key: "review_count",
            selectors: &["#acrCustomerReviewText"],
        },
    ],
    item_id: Some(ItemIdRule {
        url_pattern: r"/(?:dp|gp/product)/([A-Z0-9]{10})",
        page: &["#ASIN@value", "input[name='ASIN']@value"],
    }),
};
