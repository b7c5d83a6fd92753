//! Product translation through an OpenAI-compatible chat completion API.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use xmall_core::{AppConfig, NormalizedProduct, ProductOption};

use crate::currency::RateTable;
use crate::error::EnrichError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const REQUEST_TIMEOUT_SECS: u64 = 60;
const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 1000;

/// A scraped product with translated copies of its text fields and a KRW price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedProduct {
    pub original: NormalizedProduct,
    pub title_translated: String,
    pub description_translated: String,
    pub specifications_translated: BTreeMap<String, String>,
    pub options_translated: Vec<ProductOption>,
    pub categories_translated: Vec<String>,
    /// `0.0` when the source price is unknown.
    pub price_krw: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Translates product text into a single target language.
///
/// Every public method is infallible: on any failure the original text is
/// returned and the failure is logged.
#[derive(Debug, Clone)]
pub struct Translator {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    target_lang: String,
}

impl Translator {
    /// Builds a translator. With `api_key` unset every call is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Http`] if the HTTP client cannot be constructed.
    pub fn new(
        api_key: Option<String>,
        model: &str,
        target_lang: &str,
        timeout_secs: u64,
    ) -> Result<Self, EnrichError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.to_string(),
            target_lang: target_lang.to_string(),
        })
    }

    /// Points the translator at a different API root (for tests or proxies).
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// # Errors
    ///
    /// Returns [`EnrichError::Http`] if the HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, EnrichError> {
        Ok(Self::new(
            config.openai_api_key.clone(),
            &config.translate_model,
            &config.translate_target_lang,
            REQUEST_TIMEOUT_SECS,
        )?
        .with_base_url(&config.translate_base_url))
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    #[must_use]
    pub fn target_lang(&self) -> &str {
        &self.target_lang
    }

    async fn complete(&self, text: &str, context: &str) -> Result<String, EnrichError> {
        let api_key = self.api_key.as_deref().ok_or(EnrichError::MissingApiKey)?;

        let system = format!(
            "You are a professional translator. Translate into {} and reply with the translation only.",
            self.target_lang
        );
        let user = format!(
            "Translate the following {context} into {}: {text}",
            self.target_lang
        );
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EnrichError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let parsed: ChatResponse = serde_json::from_slice(&bytes)?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(EnrichError::EmptyCompletion)
    }

    /// Translates `text`; `context` names what it is (e.g. "product title").
    ///
    /// Empty input yields empty output without a request.
    pub async fn translate_text(&self, text: &str, context: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }
        match self.complete(text, context).await {
            Ok(translated) => translated,
            Err(e) => {
                tracing::warn!(context, error = %e, "translation failed; keeping original text");
                text.to_string()
            }
        }
    }

    /// Sends `value` as one JSON document and parses the reply back into the
    /// same type. An unparsable reply yields a clone of `value`.
    async fn translate_json<T>(&self, value: &T, context: &str) -> T
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        let Ok(document) = serde_json::to_string(value) else {
            return value.clone();
        };
        let context = format!("{context} (reply with JSON of the same structure)");
        let reply = self.translate_text(&document, &context).await;
        match serde_json::from_str(strip_code_fence(&reply)) {
            Ok(translated) => translated,
            Err(e) => {
                tracing::warn!(context = %context, error = %e, "translated JSON did not parse; keeping original");
                value.clone()
            }
        }
    }

    /// Translates the text fields of `product` and converts its price to KRW.
    ///
    /// Untranslatable fields keep their original values. With no API key
    /// configured no requests are made.
    pub async fn translate_product(
        &self,
        product: &NormalizedProduct,
        rates: &RateTable,
    ) -> TranslatedProduct {
        let price_krw = if product.price.value > 0.0 {
            rates.convert_to_krw(product.price.value, &product.price.currency)
        } else {
            0.0
        };

        if !self.is_enabled() {
            tracing::debug!(url = %product.source_url, "translation disabled; returning original text");
            return untranslated(product, price_krw);
        }

        let title = self.translate_text(&product.title, "product title").await;
        let description = self
            .translate_text(&product.description, "product description")
            .await;

        let specifications = if product.specifications.is_empty() {
            BTreeMap::new()
        } else {
            self.translate_json(&product.specifications, "product specifications")
                .await
        };
        let options = if product.options.is_empty() {
            Vec::new()
        } else {
            self.translate_json(&product.options, "product options").await
        };
        let categories = if product.categories.is_empty() {
            Vec::new()
        } else {
            self.translate_json(&product.categories, "product categories")
                .await
        };

        tracing::info!(
            url = %product.source_url,
            target_lang = %self.target_lang,
            "translated product"
        );

        TranslatedProduct {
            original: product.clone(),
            title_translated: title,
            description_translated: description,
            specifications_translated: specifications,
            options_translated: options,
            categories_translated: categories,
            price_krw,
        }
    }
}

fn untranslated(product: &NormalizedProduct, price_krw: f64) -> TranslatedProduct {
    TranslatedProduct {
        original: product.clone(),
        title_translated: product.title.clone(),
        description_translated: product.description.clone(),
        specifications_translated: product.specifications.clone(),
        options_translated: product.options.clone(),
        categories_translated: product.categories.clone(),
        price_krw,
    }
}

/// Models often wrap JSON replies in a Markdown code fence.
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    match inner.split_once('\n') {
        Some((lang, body)) if !lang.trim_start().starts_with(['{', '[']) => body.trim(),
        _ => inner.trim(),
    }
}
