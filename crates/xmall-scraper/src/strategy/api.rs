use regex::Regex;
use serde_json::Value;
use xmall_core::NormalizedProduct;

use crate::cache::CacheStore;
use crate::error::ScraperError;
use crate::fetch::Fetcher;
use crate::sites::profile::EnvelopeRule;
use crate::sites::{ApiDescriptor, ApiItem};

/// Reads products from a site's private JSON API.
#[derive(Debug)]
pub struct ApiStrategy {
    fetcher: Fetcher,
    descriptor: &'static ApiDescriptor,
    item_id_pattern: Option<Regex>,
    base_url: String,
    payload_cache: Option<CacheStore>,
}

impl ApiStrategy {
    /// Creates a strategy calling `descriptor`'s endpoint on its default base URL.
    #[must_use]
    pub fn new(fetcher: Fetcher, descriptor: &'static ApiDescriptor) -> Self {
        let item_id_pattern = match Regex::new(descriptor.item_id_pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::warn!(strategy = descriptor.name, error = %e, "invalid item id pattern");
                None
            }
        };
        Self {
            fetcher,
            descriptor,
            item_id_pattern,
            base_url: descriptor.default_base_url.to_string(),
            payload_cache: None,
        }
    }

    /// Overrides the API base URL (used to point at a mock server in tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Caches successful API envelopes, keyed by API URL.
    #[must_use]
    pub fn with_payload_cache(mut self, cache: CacheStore) -> Self {
        self.payload_cache = Some(cache);
        self
    }

    #[must_use]
    pub fn descriptor(&self) -> &'static ApiDescriptor {
        self.descriptor
    }

    #[must_use]
    pub fn payload_cache(&self) -> Option<&CacheStore> {
        self.payload_cache.as_ref()
    }

    /// Extracts the item id from a product URL.
    ///
    /// Tries the descriptor's regex first, then scans the path for the segment
    /// following `item_path_segment`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::MissingItemId`] when neither finds a non-empty id.
    pub fn item_id(&self, url: &str) -> Result<String, ScraperError> {
        let from_regex = self
            .item_id_pattern
            .as_ref()
            .and_then(|re| re.captures(url))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());

        let from_path = || {
            let parsed = reqwest::Url::parse(url).ok()?;
            let mut segments = parsed.path_segments()?;
            segments.find(|s| *s == self.descriptor.item_path_segment)?;
            segments.next().map(str::to_string)
        };

        from_regex
            .or_else(from_path)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ScraperError::MissingItemId {
                url: url.to_string(),
            })
    }

    /// API URL that `url`'s payload is fetched from and cached under, if the
    /// URL carries an item id.
    #[must_use]
    pub fn payload_key(&self, url: &str) -> Option<String> {
        self.item_id(url).ok().map(|id| self.api_url(&id))
    }

    /// Builds the item detail endpoint URL for `item_id`.
    #[must_use]
    pub fn api_url(&self, item_id: &str) -> String {
        format!(
            "{}{}",
            self.base_url,
            self.descriptor.endpoint.replace("{id}", item_id)
        )
    }

    /// # Errors
    ///
    /// - [`ScraperError::MissingItemId`] — no item id in `url`.
    /// - [`ScraperError::Http`] — network failure or timeout.
    /// - [`ScraperError::UnexpectedStatus`] — the API answered with a non-2xx status.
    /// - [`ScraperError::Deserialize`] — the body is not JSON.
    /// - [`ScraperError::Envelope`] — the envelope reports failure or has no data.
    pub async fn scrape(
        &self,
        url: &str,
        force_refresh: bool,
    ) -> Result<NormalizedProduct, ScraperError> {
        let item_id = self.item_id(url)?;
        let api_url = self.api_url(&item_id);

        tracing::info!(
            url,
            item_id = %item_id,
            strategy = self.descriptor.name,
            "scraping product via API"
        );

        let envelope = match self.cached_envelope(&api_url, force_refresh) {
            Some(envelope) => envelope,
            None => self.fetch_envelope(&api_url).await?,
        };

        let data = check_envelope(&api_url, &self.descriptor.envelope, &envelope)?;
        Ok((self.descriptor.normalize)(&ApiItem {
            source_url: url,
            item_id: &item_id,
            data,
        }))
    }

    fn cached_envelope(&self, api_url: &str, force_refresh: bool) -> Option<Value> {
        if force_refresh {
            return None;
        }
        let entry = self.payload_cache.as_ref()?.get(api_url)?;
        if check_envelope(api_url, &self.descriptor.envelope, &entry.data).is_err() {
            tracing::warn!(api_url, "discarding cached API payload with a failed envelope");
            return None;
        }
        tracing::debug!(api_url, "using cached API payload");
        Some(entry.data)
    }

    async fn fetch_envelope(&self, api_url: &str) -> Result<Value, ScraperError> {
        let page = self
            .fetcher
            .fetch(api_url, self.descriptor.headers)
            .await?
            .require_success(api_url)?;

        let envelope: Value =
            serde_json::from_str(&page.body).map_err(|e| ScraperError::Deserialize {
                context: format!("API response from {api_url}"),
                source: e,
            })?;

        if let Some(cache) = &self.payload_cache {
            if check_envelope(api_url, &self.descriptor.envelope, &envelope).is_ok() {
                cache.set_async(api_url, &envelope).await;
            }
        }
        Ok(envelope)
    }
}

fn code_matches(code: &Value, expected: i64) -> bool {
    match code {
        Value::Number(n) => n.as_i64() == Some(expected),
        Value::String(s) => s.trim().parse::<i64>().ok() == Some(expected),
        _ => false,
    }
}

/// Validates an API envelope and returns its data object.
///
/// # Errors
///
/// Returns [`ScraperError::Envelope`] carrying the upstream message when the
/// code is not the success code or the data field is missing or null.
pub fn check_envelope<'a>(
    api_url: &str,
    rule: &EnvelopeRule,
    envelope: &'a Value,
) -> Result<&'a Value, ScraperError> {
    let code = envelope.pointer(rule.code);
    let data = envelope.pointer(rule.data).filter(|d| !d.is_null());

    match (code, data) {
        (Some(code), Some(data)) if code_matches(code, rule.success_code) => Ok(data),
        _ => {
            let message = envelope
                .pointer(rule.message)
                .and_then(Value::as_str)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or("unknown error")
                .to_string();
            Err(ScraperError::Envelope {
                url: api_url.to_string(),
                code: code.map_or_else(|| "missing".to_string(), Value::to_string),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::sites::VVIC;

    fn vvic() -> ApiStrategy {
        ApiStrategy::new(
            Fetcher::new(5, "xmall-test/0.1").expect("failed to build test Fetcher"),
            &VVIC,
        )
    }

    #[test]
    fn item_id_from_regex() {
        let id = vvic().item_id("https://www.vvic.com/item/66aa01bc?spm=1").unwrap();
        assert_eq!(id, "66aa01bc");
    }

    #[test]
    fn item_id_rejects_urls_without_item() {
        let api = vvic();
        let err = api.item_id("https://www.vvic.com/shop/123").unwrap_err();
        assert!(matches!(err, ScraperError::MissingItemId { .. }));

        let err = api.item_id("https://www.vvic.com/item/").unwrap_err();
        assert!(matches!(err, ScraperError::MissingItemId { .. }));
    }

    #[test]
    fn payload_key_is_the_item_api_url() {
        let api = vvic().with_base_url("http://127.0.0.1:9/");
        assert_eq!(
            api.payload_key("https://www.vvic.com/item/abc?spm=2").as_deref(),
            Some("http://127.0.0.1:9/apif/item/abc/detail?lang=ko")
        );
        assert_eq!(api.payload_key("https://www.vvic.com/shop/1"), None);
    }

    #[test]
    fn check_envelope_returns_data_on_success() {
        let envelope = json!({ "code": 200, "data": { "title": "Shirt" } });
        let data = check_envelope("https://api", &VVIC.envelope, &envelope).unwrap();
        assert_eq!(data["title"], "Shirt");
    }

    #[test]
    fn check_envelope_accepts_string_code() {
        let envelope = json!({ "code": "200", "data": {} });
        assert!(check_envelope("https://api", &VVIC.envelope, &envelope).is_ok());
    }

    #[test]
    fn check_envelope_reports_upstream_message() {
        let envelope = json!({ "code": 404, "msg": "not found" });
        let err = check_envelope("https://api", &VVIC.envelope, &envelope).unwrap_err();
        match &err {
            ScraperError::Envelope { code, message, .. } => {
                assert_eq!(code, "404");
                assert_eq!(message, "not found");
            }
            other => panic!("expected Envelope, got {other:?}"),
        }
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn check_envelope_rejects_success_code_without_data() {
        let envelope = json!({ "code": 200, "data": null });
        let err = check_envelope("https://api", &VVIC.envelope, &envelope).unwrap_err();
        assert!(
            matches!(err, ScraperError::Envelope { ref message, .. } if message == "unknown error")
        );
    }

    #[test]
    fn check_envelope_rejects_non_object_body() {
        let envelope = json!([1, 2, 3]);
        let err = check_envelope("https://api", &VVIC.envelope, &envelope).unwrap_err();
        assert!(matches!(err, ScraperError::Envelope { ref code, .. } if code == "missing"));
    }
}
