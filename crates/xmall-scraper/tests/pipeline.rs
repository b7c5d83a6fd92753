//! End-to-end tests for `ProductPipeline` against mock storefronts.

use std::error::Error as _;

use regex::Regex;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use xmall_core::{AppConfig, Environment};
use xmall_scraper::{
    CacheStore, Dispatcher, Fetcher, PipelineError, ProductPipeline, ScraperError, SiteKind,
};

const PRODUCT_PAGE: &str = r#"<html><head><title>Desk Lamp | Lumo</title></head><body>
  <h1 class="product-title">Desk Lamp</h1>
  <span class="price">$39.90</span>
  <div class="product-gallery"><img src="/media/lamp.jpg" alt="Lamp"></div>
  <div class="product-description">Adjustable arm.</div>
</body></html>"#;

fn test_fetcher() -> Fetcher {
    Fetcher::new(5, "xmall-test/0.1").expect("failed to build test Fetcher")
}

fn pipeline(dir: &TempDir, cache_enabled: bool) -> ProductPipeline {
    ProductPipeline::new(
        Dispatcher::new(test_fetcher()),
        CacheStore::new(dir.path().join("cache"), 7),
        cache_enabled,
    )
}

async fn mount_page(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/products/desk-lamp"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(PRODUCT_PAGE),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn unknown_host_uses_generic_strategy() {
    let server = MockServer::start().await;
    mount_page(&server, 1).await;
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&dir, true);
    let url = format!("{}/products/desk-lamp", server.uri());

    let product = pipeline.scrape_product(&url, false).await.unwrap();

    assert_eq!(product.title, "Desk Lamp");
    assert!((product.price.value - 39.9).abs() < 1e-9);
    assert_eq!(
        product.images[0].url,
        format!("{}/media/lamp.jpg", server.uri())
    );
    assert_eq!(product.metadata_str("source"), Some("generic"));
    assert!(!product.is_from_cache());
}

#[tokio::test]
async fn warm_cache_serves_second_call_without_fetching() {
    let server = MockServer::start().await;
    mount_page(&server, 1).await;
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&dir, true);
    let url = format!("{}/products/desk-lamp", server.uri());

    let first = pipeline.scrape_product(&url, false).await.unwrap();
    let second = pipeline.scrape_product(&url, false).await.unwrap();

    assert!(second.is_from_cache());
    assert_eq!(second.title, first.title);
    assert_eq!(second.price, first.price);
    assert_eq!(second.images, first.images);
    assert_eq!(second.description, first.description);
    assert_eq!(second.fetched_at, first.fetched_at);
    assert_eq!(pipeline.cached_urls(), vec![url]);
}

#[tokio::test]
async fn surrounding_whitespace_shares_the_cache_entry() {
    let server = MockServer::start().await;
    mount_page(&server, 1).await;
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&dir, true);
    let url = format!("{}/products/desk-lamp", server.uri());

    pipeline.scrape_product(&url, false).await.unwrap();
    let padded = pipeline
        .scrape_product(&format!("  {url}\n"), false)
        .await
        .unwrap();
    assert!(padded.is_from_cache());
    assert_eq!(padded.source_url, url);
}

#[tokio::test]
async fn force_refresh_bypasses_cache() {
    let server = MockServer::start().await;
    mount_page(&server, 2).await;
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&dir, true);
    let url = format!("{}/products/desk-lamp", server.uri());

    pipeline.scrape_product(&url, false).await.unwrap();
    let refreshed = pipeline.scrape_product(&url, true).await.unwrap();
    assert!(!refreshed.is_from_cache());
}

#[tokio::test]
async fn disabled_cache_always_fetches_and_writes_nothing() {
    let server = MockServer::start().await;
    mount_page(&server, 2).await;
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&dir, false);
    let url = format!("{}/products/desk-lamp", server.uri());

    pipeline.scrape_product(&url, false).await.unwrap();
    pipeline.scrape_product(&url, false).await.unwrap();
    assert!(pipeline.cached_urls().is_empty());
}

#[tokio::test]
async fn empty_url_is_rejected() {
    let dir = TempDir::new().unwrap();
    let err = pipeline(&dir, true)
        .scrape_product("   ", false)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::EmptyUrl));
}

#[tokio::test]
async fn http_error_is_wrapped_with_source_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&dir, true);
    let url = format!("{}/gone", server.uri());

    let err = pipeline.scrape_product(&url, false).await.unwrap_err();

    match &err {
        PipelineError::Extraction { url: failed, source } => {
            assert_eq!(failed, &url);
            assert!(matches!(
                source,
                ScraperError::UnexpectedStatus { status: 404, .. }
            ));
        }
        other => panic!("expected Extraction, got {other:?}"),
    }
    assert!(err.source().is_some());
    assert!(pipeline.cached_urls().is_empty(), "failures are not cached");
}

#[tokio::test]
async fn unreachable_generic_host_fails_only_at_fetch() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&dir, true);
    assert_eq!(
        pipeline.dispatcher().site_for("https://shop.example.com/p/1"),
        SiteKind::Generic
    );

    let err = pipeline
        .scrape_product("http://127.0.0.1:1/p/1", false)
        .await
        .unwrap_err();
    assert!(
        matches!(err.scraper_error(), Some(ScraperError::Http(_))),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn api_site_routes_through_dispatcher_and_caches_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apif/item/abc123/detail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "code": 200,
            "data": { "title": "Knit Vest", "price": 45 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = Dispatcher::with_routes(
        test_fetcher(),
        vec![(Regex::new(r"127\.0\.0\.1").unwrap(), SiteKind::Vvic)],
    )
    .with_api_base_url(server.uri());
    let dir = TempDir::new().unwrap();
    let pipeline = ProductPipeline::new(dispatcher, CacheStore::new(dir.path(), 7), true);
    let url = format!("{}/item/abc123", server.uri());

    let first = pipeline.scrape_product(&url, false).await.unwrap();
    assert_eq!(first.title, "Knit Vest");
    assert_eq!(first.price.currency, "CNY");

    let second = pipeline.scrape_product(&url, false).await.unwrap();
    assert!(second.is_from_cache());
    assert_eq!(second.price.currency, "CNY");
}

#[tokio::test]
async fn scrape_many_preserves_input_order() {
    let server = MockServer::start().await;
    mount_page(&server, 1).await;
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&dir, false);
    let urls = vec![
        format!("{}/products/desk-lamp", server.uri()),
        String::new(),
    ];

    let results = pipeline.scrape_many(&urls, false, 4).await;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().title, "Desk Lamp");
    assert!(matches!(results[1], Err(PipelineError::EmptyUrl)));
}

#[tokio::test]
async fn delete_and_clear_cache() {
    let server = MockServer::start().await;
    mount_page(&server, 1).await;
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&dir, true);
    let url = format!("{}/products/desk-lamp", server.uri());

    pipeline.scrape_product(&url, false).await.unwrap();
    assert_eq!(pipeline.cache_entries().len(), 1);
    assert!(pipeline.delete_cached(&url));
    assert!(pipeline.cached_urls().is_empty());
    assert!(pipeline.delete_cached(&url), "deleting twice is fine");
    assert!(pipeline.clear_cache());
}

fn configured(dir: &TempDir, api_base_url: String) -> AppConfig {
    AppConfig {
        env: Environment::Test,
        log_level: "debug".to_string(),
        cache_dir: dir.path().join("cache"),
        cache_enabled: true,
        cache_max_age_days: 7,
        scraper_request_timeout_secs: 5,
        scraper_user_agent: "xmall-test/0.1".to_string(),
        vvic_api_base_url: api_base_url,
        openai_api_key: None,
        translate_base_url: "http://127.0.0.1:9".to_string(),
        translate_model: "test".to_string(),
        translate_target_lang: "Korean".to_string(),
        session_ttl_secs: 60,
    }
}

async fn mount_item_once(server: &MockServer, title: &str) {
    Mock::given(method("GET"))
        .and(path("/apif/item/abc/detail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "code": 200,
            "data": { "title": title, "price": "10.00" }
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn clear_and_delete_also_drop_cached_api_payloads() {
    let server = MockServer::start().await;
    mount_item_once(&server, "Old Title").await;
    mount_item_once(&server, "New Title").await;
    mount_item_once(&server, "Newest Title").await;

    let dir = TempDir::new().unwrap();
    let pipeline = ProductPipeline::from_config(&configured(&dir, server.uri())).unwrap();
    let url = "https://www.vvic.com/item/abc";

    let first = pipeline.scrape_product(url, false).await.unwrap();
    assert_eq!(first.title, "Old Title");
    assert!(pipeline.dispatcher().payload_cache().is_some());

    assert!(pipeline.clear_cache());
    let after_clear = pipeline.scrape_product(url, false).await.unwrap();
    assert_eq!(after_clear.title, "New Title");
    assert!(!after_clear.is_from_cache());

    let cached = pipeline.scrape_product(url, false).await.unwrap();
    assert!(cached.is_from_cache());
    assert_eq!(cached.title, "New Title");

    assert!(pipeline.delete_cached(url));
    let after_delete = pipeline.scrape_product(url, false).await.unwrap();
    assert_eq!(after_delete.title, "Newest Title");
    assert!(!after_delete.is_from_cache());
}

#[tokio::test]
async fn product_cache_miss_reuses_cached_api_payload() {
    let server = MockServer::start().await;
    mount_item_once(&server, "Only Title").await;

    let dir = TempDir::new().unwrap();
    let config = configured(&dir, server.uri());
    let pipeline = ProductPipeline::from_config(&config).unwrap();
    let url = "https://www.vvic.com/item/abc";

    pipeline.scrape_product(url, false).await.unwrap();
    // Only the product entry is dropped; the payload is served from disk.
    assert!(pipeline.cache().delete(url));
    let again = pipeline.scrape_product(url, false).await.unwrap();
    assert_eq!(again.title, "Only Title");
}
