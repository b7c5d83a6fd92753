pub mod cache;
pub mod dispatcher;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod html;
pub mod pipeline;
pub mod price;
pub mod restore;
pub mod sites;
pub mod strategy;

pub use cache::{cache_key, CacheEntry, CacheListing, CacheStore};
pub use dispatcher::Dispatcher;
pub use error::{PipelineError, ScraperError};
pub use fetch::{FetchedPage, Fetcher};
pub use pipeline::ProductPipeline;
pub use strategy::{ApiStrategy, HtmlStrategy, SiteKind, Strategy};
