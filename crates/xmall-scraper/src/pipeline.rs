//! Top-level entry point: cache lookup, dispatch, extraction and cache write.

use futures::stream::{self, StreamExt};
use xmall_core::{AppConfig, NormalizedProduct};

use crate::cache::{CacheListing, CacheStore};
use crate::dispatcher::Dispatcher;
use crate::error::{PipelineError, ScraperError};
use crate::fetch::Fetcher;
use crate::restore::restore_product;

/// Scrapes product URLs into [`NormalizedProduct`]s, serving repeat requests
/// from the result cache.
///
/// One pipeline is meant to be shared by all concurrent callers. Concurrent
/// misses on the same URL each fetch and each write the cache; the last
/// write wins.
#[derive(Debug)]
pub struct ProductPipeline {
    dispatcher: Dispatcher,
    cache: CacheStore,
    cache_enabled: bool,
}

impl ProductPipeline {
    #[must_use]
    pub fn new(dispatcher: Dispatcher, cache: CacheStore, cache_enabled: bool) -> Self {
        Self {
            dispatcher,
            cache,
            cache_enabled,
        }
    }

    /// Builds the fetcher, dispatcher and cache described by `config`.
    ///
    /// API payloads are cached under `<cache_dir>/api`, apart from results.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        let fetcher = Fetcher::new(
            config.scraper_request_timeout_secs,
            &config.scraper_user_agent,
        )?;
        let cache = CacheStore::new(&config.cache_dir, config.cache_max_age_days);
        let mut dispatcher =
            Dispatcher::new(fetcher).with_api_base_url(config.vvic_api_base_url.clone());
        if config.cache_enabled {
            dispatcher = dispatcher.with_payload_cache(CacheStore::new(
                config.cache_dir.join("api"),
                config.cache_max_age_days,
            ));
        }
        Ok(Self::new(dispatcher, cache, config.cache_enabled))
    }

    #[must_use]
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Returns the product at `url`.
    ///
    /// Surrounding whitespace is trimmed and the trimmed string is the cache
    /// key. Unless `force_refresh` is set or caching is disabled, a valid
    /// cache entry is returned without any network access, tagged with
    /// `raw_metadata.from_cache = true`. Otherwise the URL is dispatched to
    /// its strategy and a successful result is written back to the cache.
    /// A failed cache write is logged and does not fail the call.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::EmptyUrl`] — `url` is empty after trimming.
    /// - [`PipelineError::Extraction`] — the strategy failed; wraps its error.
    pub async fn scrape_product(
        &self,
        url: &str,
        force_refresh: bool,
    ) -> Result<NormalizedProduct, PipelineError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(PipelineError::EmptyUrl);
        }

        if self.cache_enabled && !force_refresh {
            if let Some(entry) = self.cache.get(url) {
                tracing::info!(url, "serving product from cache");
                return Ok(restore_product(url, &entry));
            }
        }

        let strategy = self.dispatcher.select_strategy(url);
        let product = strategy
            .scrape(url, force_refresh)
            .await
            .map_err(|source| {
                tracing::warn!(url, strategy = strategy.name(), error = %source, "extraction failed");
                PipelineError::Extraction {
                    url: url.to_string(),
                    source,
                }
            })?;

        if self.cache_enabled && self.cache.set_async(url, &product).await {
            tracing::info!(url, "cached product");
        }

        Ok(product)
    }

    /// Scrapes several URLs with at most `concurrency` in flight, returning
    /// one result per input in input order.
    pub async fn scrape_many(
        &self,
        urls: &[String],
        force_refresh: bool,
        concurrency: usize,
    ) -> Vec<Result<NormalizedProduct, PipelineError>> {
        stream::iter(urls)
            .map(|url| self.scrape_product(url, force_refresh))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    /// URLs of every cached product, newest first.
    #[must_use]
    pub fn cached_urls(&self) -> Vec<String> {
        self.cache.cached_urls()
    }

    /// Cache file listing, newest first.
    #[must_use]
    pub fn cache_entries(&self) -> Vec<CacheListing> {
        self.cache.list_entries()
    }

    /// Drops the cached product for `url` and any raw API payload it was
    /// built from. Missing entries count as success.
    pub fn delete_cached(&self, url: &str) -> bool {
        let url = url.trim();
        let mut ok = self.cache.delete(url);
        if let (Some(payloads), Some(key)) = (
            self.dispatcher.payload_cache(),
            self.dispatcher.payload_key(url),
        ) {
            ok &= payloads.delete(&key);
        }
        ok
    }

    /// Drops every cached product and every cached API payload.
    pub fn clear_cache(&self) -> bool {
        let mut ok = self.cache.clear();
        if let Some(payloads) = self.dispatcher.payload_cache() {
            ok &= payloads.clear();
        }
        ok
    }
}
