use thiserror::Error;

/// Fatal failures of a single strategy `scrape` call.
///
/// Missing or malformed individual fields never surface here; they fall back
/// to defaults at the point of extraction.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("API envelope error from {url} (code {code}): {message}")]
    Envelope {
        url: String,
        code: String,
        message: String,
    },

    #[error("could not extract an item id from {url}")]
    MissingItemId { url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP client configuration error: {0}")]
    Client(String),
}

/// Errors surfaced by [`crate::ProductPipeline::scrape_product`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("product URL is empty")]
    EmptyUrl,

    #[error("failed to extract product from {url}: {source}")]
    Extraction {
        url: String,
        #[source]
        source: ScraperError,
    },
}

impl PipelineError {
    /// Returns the underlying strategy error, if this is an extraction failure.
    #[must_use]
    pub fn scraper_error(&self) -> Option<&ScraperError> {
        match self {
            PipelineError::Extraction { source, .. } => Some(source),
            PipelineError::EmptyUrl => None,
        }
    }
}
