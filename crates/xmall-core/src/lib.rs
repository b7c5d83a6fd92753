pub mod app_config;
pub mod config;
pub mod products;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{
    normalize_images, NormalizedProduct, Price, ProductImage, ProductOption, FROM_CACHE_KEY,
    PLACEHOLDER_IMAGE_ALT, PLACEHOLDER_IMAGE_URL, UNKNOWN_PRODUCT_TITLE,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
