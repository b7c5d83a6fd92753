//! Post-scrape enrichment for xmall products.
//!
//! Translates product text through an OpenAI-compatible chat completion
//! endpoint, converts prices to KRW with a fixed rate table, and keeps
//! short-lived scrape sessions in memory. Nothing here is required to
//! scrape; every step degrades to the untranslated product on failure.

pub mod currency;
pub mod error;
pub mod session;
pub mod translate;

pub use currency::RateTable;
pub use error::EnrichError;
pub use session::SessionStore;
pub use translate::{TranslatedProduct, Translator};
