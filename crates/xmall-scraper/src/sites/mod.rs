//! Per-site extraction rules. Adding a site means adding data here and a
//! route in the dispatcher, not a new scraper.

pub mod amazon;
pub mod ebay;
pub mod generic;
pub mod profile;
pub mod vvic;

pub use amazon::AMAZON;
pub use ebay::EBAY;
pub use generic::GENERIC;
pub use profile::{ApiDescriptor, ApiItem, SiteProfile};
pub use vvic::VVIC;
