//! `cache` command handlers.

use xmall_scraper::ProductPipeline;

pub(crate) fn run_cache_list(pipeline: &ProductPipeline) -> anyhow::Result<()> {
    let entries = pipeline.cache_entries();
    tracing::debug!(count = entries.len(), "listing cache entries");
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

pub(crate) fn run_cache_delete(pipeline: &ProductPipeline, url: &str) -> anyhow::Result<()> {
    if !pipeline.delete_cached(url) {
        anyhow::bail!("failed to delete cache entry for {url}");
    }
    tracing::info!(url, "cache entry deleted");
    Ok(())
}

pub(crate) fn run_cache_clear(pipeline: &ProductPipeline) -> anyhow::Result<()> {
    let count = pipeline.cache_entries().len();
    if !pipeline.clear_cache() {
        anyhow::bail!("failed to clear cache at {}", pipeline.cache().dir().display());
    }
    tracing::info!(count, "cache cleared");
    Ok(())
}
