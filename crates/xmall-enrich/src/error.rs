use thiserror::Error;

/// Failures talking to the translation endpoint.
///
/// These never reach callers of [`crate::Translator::translate_text`], which
/// falls back to the original text; they are logged and dropped.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("translation API returned HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("JSON deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("translation API returned no completion text")]
    EmptyCompletion,

    #[error("no translation API key configured")]
    MissingApiKey,
}
