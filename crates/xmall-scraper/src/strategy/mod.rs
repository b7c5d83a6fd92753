//! Extraction strategies: one value per site family, all exposing the same
//! `scrape(url, force_refresh)` contract.

mod api;
mod html;

pub use api::{check_envelope, ApiStrategy};
pub use html::HtmlStrategy;

use xmall_core::NormalizedProduct;

use crate::error::ScraperError;

/// A site family the dispatcher can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteKind {
    Amazon,
    Ebay,
    Vvic,
    Generic,
}

impl std::fmt::Display for SiteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SiteKind::Amazon => write!(f, "amazon"),
            SiteKind::Ebay => write!(f, "ebay"),
            SiteKind::Vvic => write!(f, "vvic"),
            SiteKind::Generic => write!(f, "generic"),
        }
    }
}

/// A configured extraction strategy.
///
/// HTML strategies fetch the product page and run a selector profile over
/// it; API strategies call a private JSON endpoint keyed by item id.
#[derive(Debug)]
pub enum Strategy {
    Html(HtmlStrategy),
    Api(ApiStrategy),
}

impl Strategy {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Html(s) => s.profile().name,
            Strategy::Api(s) => s.descriptor().name,
        }
    }

    /// Fetches and parses `url` into a product.
    ///
    /// `force_refresh` bypasses any payload cache the strategy keeps of its own.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] when the page or API cannot be fetched, returns
    /// a non-2xx status, or (for API strategies) the item id cannot be found or
    /// the response envelope reports failure. Missing individual fields are
    /// never errors.
    pub async fn scrape(
        &self,
        url: &str,
        force_refresh: bool,
    ) -> Result<NormalizedProduct, ScraperError> {
        match self {
            Strategy::Html(s) => s.scrape(url).await,
            Strategy::Api(s) => s.scrape(url, force_refresh).await,
        }
    }
}
