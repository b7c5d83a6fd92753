//! Maps a product URL's host to the strategy that knows how to read it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use regex::Regex;

use crate::cache::CacheStore;
use crate::fetch::Fetcher;
use crate::sites::{AMAZON, EBAY, GENERIC, VVIC};
use crate::strategy::{ApiStrategy, HtmlStrategy, SiteKind, Strategy};

/// Host patterns checked in order; the first match wins.
const DEFAULT_ROUTES: &[(&str, SiteKind)] = &[
    (r"amazon\.", SiteKind::Amazon),
    (r"ebay\.", SiteKind::Ebay),
    (r"vvic\.", SiteKind::Vvic),
];

/// Extracts the lowercased host from `url`, or `None` when there is none.
#[must_use]
pub fn extract_host(url: &str) -> Option<String> {
    let trimmed = url.trim();
    let parsed = reqwest::Url::parse(trimmed)
        .or_else(|_| reqwest::Url::parse(&format!("https://{trimmed}")))
        .ok()?;
    parsed
        .host_str()
        .map(str::to_ascii_lowercase)
        .filter(|host| !host.is_empty())
}

/// Selects and memoizes one [`Strategy`] per [`SiteKind`].
///
/// Strategies share the dispatcher's [`Fetcher`], so every site reuses one
/// connection pool. Unknown or unparsable hosts fall back to the generic
/// strategy.
#[derive(Debug)]
pub struct Dispatcher {
    routes: Vec<(Regex, SiteKind)>,
    fetcher: Fetcher,
    api_base_url: Option<String>,
    payload_cache: Option<CacheStore>,
    instances: Mutex<HashMap<SiteKind, Arc<Strategy>>>,
}

impl Dispatcher {
    /// Creates a dispatcher with the built-in site routes.
    #[must_use]
    pub fn new(fetcher: Fetcher) -> Self {
        let routes = DEFAULT_ROUTES
            .iter()
            .map(|&(pattern, kind)| (Regex::new(pattern).expect("valid route pattern"), kind))
            .collect();
        Self::with_routes(fetcher, routes)
    }

    /// Creates a dispatcher with a custom ordered route table.
    #[must_use]
    pub fn with_routes(fetcher: Fetcher, routes: Vec<(Regex, SiteKind)>) -> Self {
        Self {
            routes,
            fetcher,
            api_base_url: None,
            payload_cache: None,
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Overrides the base URL of API-backed strategies.
    #[must_use]
    pub fn with_api_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = Some(base_url.into());
        self
    }

    /// Gives API-backed strategies a cache for their raw payloads.
    #[must_use]
    pub fn with_payload_cache(mut self, cache: CacheStore) -> Self {
        self.payload_cache = Some(cache);
        self
    }

    /// The store API-backed strategies keep raw payloads in, if any.
    #[must_use]
    pub fn payload_cache(&self) -> Option<&CacheStore> {
        self.payload_cache.as_ref()
    }

    /// Payload cache key for `url` when it routes to an API-backed strategy
    /// and carries an item id.
    #[must_use]
    pub fn payload_key(&self, url: &str) -> Option<String> {
        match &*self.select_strategy(url) {
            Strategy::Api(api) => api.payload_key(url),
            Strategy::Html(_) => None,
        }
    }

    /// Returns the site family for `url`. Pure: depends only on the host and
    /// the route order.
    #[must_use]
    pub fn site_for(&self, url: &str) -> SiteKind {
        let Some(host) = extract_host(url) else {
            tracing::warn!(url, "could not determine host; using generic strategy");
            return SiteKind::Generic;
        };
        self.routes
            .iter()
            .find(|(pattern, _)| pattern.is_match(&host))
            .map_or(SiteKind::Generic, |(_, kind)| *kind)
    }

    /// Returns the shared strategy for `url`, creating it on first use.
    #[must_use]
    pub fn select_strategy(&self, url: &str) -> Arc<Strategy> {
        let kind = self.site_for(url);
        let mut instances = self
            .instances
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let strategy = instances
            .entry(kind)
            .or_insert_with(|| Arc::new(self.build(kind)));
        tracing::debug!(url, site = %kind, strategy = strategy.name(), "selected strategy");
        Arc::clone(strategy)
    }

    fn build(&self, kind: SiteKind) -> Strategy {
        let fetcher = self.fetcher.clone();
        match kind {
            SiteKind::Amazon => Strategy::Html(HtmlStrategy::new(fetcher, &AMAZON)),
            SiteKind::Ebay => Strategy::Html(HtmlStrategy::new(fetcher, &EBAY)),
            SiteKind::Generic => Strategy::Html(HtmlStrategy::new(fetcher, &GENERIC)),
            SiteKind::Vvic => {
                let mut api = ApiStrategy::new(fetcher, &VVIC);
                if let Some(base) = &self.api_base_url {
                    api = api.with_base_url(base);
                }
                if let Some(cache) = &self.payload_cache {
                    api = api.with_payload_cache(cache.clone());
                }
                Strategy::Api(api)
            }
        }
    }
}
