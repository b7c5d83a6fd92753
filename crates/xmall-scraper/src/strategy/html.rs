use xmall_core::NormalizedProduct;

use crate::error::ScraperError;
use crate::extract::CompiledProfile;
use crate::fetch::Fetcher;
use crate::sites::SiteProfile;

/// Fetches a product page and extracts it with a [`SiteProfile`].
#[derive(Debug)]
pub struct HtmlStrategy {
    fetcher: Fetcher,
    profile: CompiledProfile,
}

impl HtmlStrategy {
    #[must_use]
    pub fn new(fetcher: Fetcher, profile: &'static SiteProfile) -> Self {
        Self {
            fetcher,
            profile: CompiledProfile::new(profile),
        }
    }

    #[must_use]
    pub fn profile(&self) -> &'static SiteProfile {
        self.profile.profile()
    }

    /// # Errors
    ///
    /// - [`ScraperError::Http`] — network failure or timeout.
    /// - [`ScraperError::UnexpectedStatus`] — the page answered with a non-2xx status.
    pub async fn scrape(&self, url: &str) -> Result<NormalizedProduct, ScraperError> {
        let profile = self.profile();
        tracing::info!(url, strategy = profile.name, "scraping product page");

        let extra: Vec<(&str, &str)> = profile
            .referer
            .map(|referer| ("referer", referer))
            .into_iter()
            .collect();
        let page = self.fetcher.fetch(url, &extra).await?.require_success(url)?;

        // The parsed document is not Send, so parsing stays after the last await.
        Ok(self.profile.extract(&page.body, url))
    }
}
