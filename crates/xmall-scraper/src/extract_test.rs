use super::*;
use crate::sites::{AMAZON, EBAY, GENERIC};

fn extract_product(html: &str, url: &str, profile: &'static SiteProfile) -> NormalizedProduct {
    CompiledProfile::new(profile).extract(html, url)
}

const AMAZON_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Amazon.com: Trail Bottle</title></head><body>
  <div id="wayfinding-breadcrumbs_feature_div"><ul>
    <li><a href="/">Home</a></li><li><span>›</span></li>
    <li><a href="/sports">Sports &amp; Outdoors</a></li>
    <li><a href="/bottles">Water Bottles</a></li>
  </ul></div>
  <span id="productTitle">
     Trail Insulated Bottle, 32 oz
  </span>
  <a id="bylineInfo" href="/stores/acme">Visit the Acme Store</a>
  <div id="corePrice_feature_div">
    <span class="a-price"><span class="a-offscreen">$24.99</span></span>
  </div>
  <div id="imgTagWrapperId">
    <img id="landingImage" alt="Trail Bottle front"
         src="https://m.media-amazon.com/images/I/main._AC_SX300_.jpg"
         data-old-hires="https://m.media-amazon.com/images/I/main._AC_SL1500_.jpg">
  </div>
  <div id="altImages"><ul>
    <li class="item"><img src="https://m.media-amazon.com/images/I/side._SS40_.jpg"></li>
    <li class="item"><img src="https://m.media-amazon.com/images/I/main._AC_SL1500_.jpg"></li>
  </ul></div>
  <div id="feature-bullets"><ul>
    <li><span class="a-list-item"> Keeps drinks cold for 24 hours </span></li>
    <li><span class="a-list-item"> Leak-proof lid </span></li>
  </ul></div>
  <table id="productDetails_techSpec_section_1">
    <tr><th> Capacity </th><td> 32 Fluid Ounces </td></tr>
    <tr><th>Material</th><td>Stainless Steel</td></tr>
  </table>
  <div id="detailBullets_feature_div"><ul>
    <li><span>Item model number &#8207; : &#8206; TB-32</span></li>
    <li><span>Material : ignored duplicate</span></li>
  </ul></div>
  <div id="variation_color_name"><ul>
    <li title="Click to select Black"></li>
    <li title="Click to select Sage"></li>
  </ul></div>
  <div id="variation_size_name"><ul><li>32 oz</li><li>40 oz</li></ul></div>
  <div id="availability"><span> In Stock </span></div>
  <a id="sellerProfileTriggerId">Acme Outdoors</a>
  <input type="hidden" id="ASIN" value="B0TESTASIN">
</body></html>"#;

const EBAY_PAGE: &str = r#"<html><body>
  <nav class="breadcrumbs"><ul>
    <li><a href="/"><span>eBay</span></a></li>
    <li><a href="/b/cameras"><span>Cameras &amp; Photo</span></a></li>
  </ul></nav>
  <h1 class="x-item-title__mainTitle"><span class="ux-textspans">Vintage Film Camera 35mm</span></h1>
  <div class="x-price-primary"><span class="ux-textspans">US $149.00</span></div>
  <div class="ux-image-carousel-item active"><img src="https://i.ebayimg.com/images/g/abc/s-l1600.jpg" alt="Camera"></div>
  <div class="ux-image-carousel-item"><img src="https://i.ebayimg.com/images/g/abc/s-l1600.jpg"></div>
  <div class="ux-image-carousel-item"><img data-src="https://i.ebayimg.com/images/g/def/s-l1600.jpg"></div>
  <div class="x-item-condition-text"><span class="ux-textspans">Used</span></div>
  <div class="ux-layout-section-evo__col">
    <div class="ux-labels-values__labels">Brand</div>
    <div class="ux-labels-values__values">Canon</div>
  </div>
  <div class="ux-layout-section-evo__col">
    <div class="ux-labels-values__labels">Format:</div>
    <div class="ux-labels-values__values">35mm</div>
  </div>
  <div class="x-msku__box-cont">
    <label>Lens</label>
    <select><option value="-1">- Select -</option><option value="0">50mm</option><option value="1">28mm</option></select>
  </div>
</body></html>"#;

const GENERIC_PAGE: &str = r#"<html><head>
  <meta property="og:image" content="/media/lamp-main.jpg">
</head><body>
  <ol class="breadcrumb"><li><a href="/">Home</a></li><li><a href="/lighting">Lighting</a></li></ol>
  <h1 class="product-title">Desk Lamp</h1>
  <div class="brand">Brand: Lumo</div>
  <span class="price">€39,90</span>
  <div class="product-gallery">
    <img src="/media/lamp-main.jpg"><img src="//cdn.example.com/lamp-side.jpg" alt="Side">
  </div>
  <div class="product-description"><p>Adjustable   arm.</p>
  <p>Warm light.</p></div>
  <table class="specifications"><tr><th>Wattage</th><td>8W</td></tr></table>
  <dl class="product-specs"><dt>Colour</dt><dd>Matte black</dd></dl>
  <div class="product-options">
    <label for="finish">Finish</label>
    <select id="finish" name="finish"><option>Select finish</option><option>Black</option><option>White</option></select>
  </div>
  <span class="stock-status">Only 3 left</span>
</body></html>"#;

#[test]
fn amazon_profile_extracts_core_fields() {
    let url = "https://www.amazon.com/Trail-Bottle/dp/B0TESTASIN?ref=sr_1";
    let product = extract_product(AMAZON_PAGE, url, &AMAZON);

    assert_eq!(product.source_url, url);
    assert_eq!(product.title, "Trail Insulated Bottle, 32 oz");
    assert_eq!(product.brand.as_deref(), Some("Acme"));
    assert!((product.price.value - 24.99).abs() < 1e-9);
    assert_eq!(product.price.currency, "USD");
    assert_eq!(product.price.text, "$24.99");
    assert_eq!(
        product.description,
        "Keeps drinks cold for 24 hours\nLeak-proof lid"
    );
    assert_eq!(
        product.categories,
        vec!["Sports & Outdoors", "Water Bottles"]
    );
}

#[test]
fn amazon_profile_extracts_images_in_order_without_duplicates() {
    let product = extract_product(
        AMAZON_PAGE,
        "https://www.amazon.com/dp/B0TESTASIN",
        &AMAZON,
    );
    let urls: Vec<&str> = product.images.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://m.media-amazon.com/images/I/main._AC_SL1500_.jpg",
            "https://m.media-amazon.com/images/I/side._SL1500_.jpg",
        ]
    );
    assert!(product.images[0].is_main);
    assert_eq!(product.images[0].alt_text, "Trail Bottle front");
    assert_eq!(product.main_image().map(|i| i.url.as_str()), Some(urls[0]));
}

#[test]
fn amazon_profile_merges_spec_sources() {
    let product = extract_product(AMAZON_PAGE, "https://www.amazon.com/dp/B0TESTASIN", &AMAZON);
    assert_eq!(
        product.specifications.get("Capacity").map(String::as_str),
        Some("32 Fluid Ounces")
    );
    assert_eq!(
        product.specifications.get("Material").map(String::as_str),
        Some("Stainless Steel"),
        "table rows take precedence over detail bullets"
    );
    assert_eq!(
        product.specifications.get("Item model number").map(String::as_str),
        Some("TB-32")
    );
}

#[test]
fn amazon_profile_extracts_options_and_metadata() {
    let product = extract_product(AMAZON_PAGE, "https://www.amazon.com/gp/help", &AMAZON);
    assert_eq!(product.options.len(), 2);
    assert_eq!(product.options[0].title, "Color");
    assert_eq!(product.options[0].values, vec!["Black", "Sage"]);
    assert_eq!(product.options[1].title, "Size");
    assert_eq!(product.options[1].values, vec!["32 oz", "40 oz"]);

    assert_eq!(product.metadata_str("availability"), Some("In Stock"));
    assert_eq!(product.metadata_str("seller"), Some("Acme Outdoors"));
    assert_eq!(product.metadata_str("source"), Some("amazon"));
    // URL has no /dp/ segment, so the hidden input supplies the id.
    assert_eq!(product.metadata_str("item_id"), Some("B0TESTASIN"));
}

#[test]
fn amazon_split_price_used_when_offscreen_missing() {
    let page = r#"<html><body><span id="productTitle">Mug</span>
        <span class="a-price"><span class="a-price-symbol">$</span><span class="a-price-whole">12.</span><span class="a-price-fraction">49</span></span>
        </body></html>"#;
    let product = extract_product(page, "https://www.amazon.com/dp/B000000001", &AMAZON);
    assert_eq!(product.price.text, "$12.49");
    assert!((product.price.value - 12.49).abs() < 1e-9);
    assert_eq!(product.metadata_str("item_id"), Some("B000000001"));
}

#[test]
fn ebay_profile_extracts_core_fields() {
    let url = "https://www.ebay.com/itm/vintage-film-camera/204512345678?hash=item";
    let product = extract_product(EBAY_PAGE, url, &EBAY);

    assert_eq!(product.title, "Vintage Film Camera 35mm");
    assert!((product.price.value - 149.0).abs() < 1e-9);
    assert_eq!(product.price.currency, "USD");
    assert_eq!(product.images.len(), 2);
    assert_eq!(
        product.images[1].url,
        "https://i.ebayimg.com/images/g/def/s-l1600.jpg"
    );
    assert_eq!(product.categories, vec!["eBay", "Cameras & Photo"]);
    assert_eq!(
        product.specifications.get("Format").map(String::as_str),
        Some("35mm")
    );
    assert_eq!(product.options.len(), 1);
    assert_eq!(product.options[0].title, "Lens");
    assert_eq!(product.options[0].values, vec!["50mm", "28mm"]);
    assert_eq!(product.metadata_str("condition"), Some("Used"));
    assert_eq!(product.metadata_str("item_id"), Some("204512345678"));
}

#[test]
fn generic_profile_extracts_common_markup() {
    let url = "https://shop.example.com/p/desk-lamp";
    let product = extract_product(GENERIC_PAGE, url, &GENERIC);

    assert_eq!(product.title, "Desk Lamp");
    assert_eq!(product.brand.as_deref(), Some("Lumo"));
    assert_eq!(product.price.text, "€39,90");
    assert_eq!(product.price.currency, "EUR");
    assert_eq!(product.description, "Adjustable arm. Warm light.");
    assert_eq!(product.categories, vec!["Lighting"]);

    let urls: Vec<&str> = product.images.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://shop.example.com/media/lamp-main.jpg",
            "https://cdn.example.com/lamp-side.jpg",
        ]
    );

    assert_eq!(
        product.specifications.get("Wattage").map(String::as_str),
        Some("8W")
    );
    assert_eq!(
        product.specifications.get("Colour").map(String::as_str),
        Some("Matte black")
    );
    assert_eq!(product.options.len(), 1);
    assert_eq!(product.options[0].title, "Finish");
    assert_eq!(product.options[0].values, vec!["Black", "White"]);
    assert_eq!(product.metadata_str("availability"), Some("Only 3 left"));
    assert_eq!(product.metadata_str("item_id"), None);
}

#[test]
fn empty_page_degrades_to_defaults() {
    let product = extract_product("<html><body></body></html>", "not a url", &GENERIC);
    assert_eq!(product.title, UNKNOWN_PRODUCT_TITLE);
    assert!(product.brand.is_none());
    assert!((product.price.value - 0.0).abs() < f64::EPSILON);
    assert_eq!(product.price.currency, "USD");
    assert!(product.images.is_empty());
    assert!(product.description.is_empty());
    assert!(product.specifications.is_empty());
    assert!(product.options.is_empty());
    assert!(product.categories.is_empty());
}

static BAD_PATTERNS: SiteProfile = SiteProfile {
    name: "bad-patterns",
    title: &["h1"],
    brand: &[".brand"],
    brand_pattern: Some(r"^(Brand:"),
    item_id: Some(crate::sites::profile::ItemIdRule {
        url_pattern: r"item/(",
        page: &["#sku"],
    }),
    ..SiteProfile::EMPTY
};

#[test]
fn invalid_profile_patterns_fall_back_to_raw_values() {
    let compiled = CompiledProfile::new(&BAD_PATTERNS);
    let page = r#"<html><body><h1>Cap</h1><span class="brand">Brand: Acme</span><span id="sku">SKU-9</span></body></html>"#;

    let product = compiled.extract(page, "https://shop.example.com/item/77");
    assert_eq!(product.brand.as_deref(), Some("Brand: Acme"));
    assert_eq!(product.metadata_str("item_id"), Some("SKU-9"));
}

#[test]
fn compiled_profile_is_reusable_across_pages() {
    let compiled = CompiledProfile::new(&AMAZON);
    let first = compiled.extract(AMAZON_PAGE, "https://www.amazon.com/dp/B0TESTASIN");
    let second = compiled.extract(AMAZON_PAGE, "https://www.amazon.com/dp/B0OTHER001");
    assert_eq!(first.metadata_str("item_id"), Some("B0TESTASIN"));
    assert_eq!(second.metadata_str("item_id"), Some("B0OTHER001"));
    assert_eq!(compiled.profile().name, "amazon");
}
