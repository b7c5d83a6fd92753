//! `scrape` command handler.
//!
//! Every URL yields one JSON record on stdout, in input order. Per-URL
//! failures become `{ "url", "error" }` records instead of aborting the run.

use serde_json::{json, Value};
use xmall_core::{AppConfig, NormalizedProduct};
use xmall_enrich::{RateTable, Translator};
use xmall_scraper::{PipelineError, ProductPipeline};

#[derive(Debug, Clone, Copy)]
pub(crate) struct ScrapeOptions {
    pub(crate) refresh: bool,
    pub(crate) translate: bool,
    pub(crate) concurrency: usize,
}

pub(crate) fn error_record(url: &str, error: &PipelineError) -> Value {
    json!({
        "url": url.trim(),
        "error": error.to_string(),
    })
}

async fn product_record(
    product: &NormalizedProduct,
    translator: Option<&Translator>,
    rates: &RateTable,
) -> anyhow::Result<Value> {
    match translator {
        Some(translator) => Ok(serde_json::to_value(
            translator.translate_product(product, rates).await,
        )?),
        None => Ok(serde_json::to_value(product)?),
    }
}

/// Scrapes `urls`, optionally translates each product, and prints a JSON
/// array of results.
///
/// # Errors
///
/// Returns an error if the translator cannot be built, output cannot be
/// serialized, or any URL failed to scrape (after printing all results).
pub(crate) async fn run_scrape(
    pipeline: &ProductPipeline,
    config: &AppConfig,
    urls: &[String],
    options: ScrapeOptions,
) -> anyhow::Result<()> {
    let translator = if options.translate {
        if !config.translation_enabled() {
            tracing::warn!("--translate given but OPENAI_API_KEY is not set; text stays untranslated");
        }
        Some(Translator::from_config(config)?)
    } else {
        None
    };
    let rates = RateTable::default();

    let started = chrono::Utc::now();
    let results = pipeline
        .scrape_many(urls, options.refresh, options.concurrency)
        .await;

    let mut records = Vec::with_capacity(results.len());
    let mut failed = 0usize;
    for (url, result) in urls.iter().zip(results) {
        match result {
            Ok(product) => {
                records.push(product_record(&product, translator.as_ref(), &rates).await?);
            }
            Err(e) => {
                failed += 1;
                records.push(error_record(url, &e));
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&records)?);

    let elapsed_ms = (chrono::Utc::now() - started).num_milliseconds();
    tracing::info!(
        total = urls.len(),
        failed,
        elapsed_ms,
        "scrape run finished"
    );

    if failed > 0 {
        anyhow::bail!("{failed} of {} URLs failed to scrape", urls.len());
    }
    Ok(())
}
