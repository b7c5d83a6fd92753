use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub cache_dir: PathBuf,
    pub cache_enabled: bool,
    /// Maximum cache entry age in days. Zero or negative disables the age check.
    pub cache_max_age_days: i64,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    /// Base URL of the wholesale platform's private item API.
    pub vvic_api_base_url: String,
    pub openai_api_key: Option<String>,
    pub translate_base_url: String,
    pub translate_model: String,
    pub translate_target_lang: String,
    pub session_ttl_secs: u64,
}

impl AppConfig {
    /// Returns `true` when a translator credential is configured.
    #[must_use]
    pub fn translation_enabled(&self) -> bool {
        self.openai_api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("cache_dir", &self.cache_dir)
            .field("cache_enabled", &self.cache_enabled)
            .field("cache_max_age_days", &self.cache_max_age_days)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("vvic_api_base_url", &self.vvic_api_base_url)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("translate_base_url", &self.translate_base_url)
            .field("translate_model", &self.translate_model)
            .field("translate_target_lang", &self.translate_target_lang)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .finish()
    }
}
