use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{TranslateError, ValidationError};

/// A validated translation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl TranslationRequest {
    pub fn new(
        text: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            model: None,
        }
    }

    /// Parses an untyped request body.
    ///
    /// Language codes are trimmed, the text is kept verbatim, and a
    /// non-string `model` is ignored.
    pub fn parse(data: &Value) -> Result<Self, ValidationError> {
        let input = data.as_object().ok_or(ValidationError::InvalidInput)?;

        let text = input
            .get("text")
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ValidationError::MissingText)?;

        let source_language = input
            .get("sourceLanguage")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .ok_or(ValidationError::MissingSourceLanguage)?;

        let target_language = input
            .get("targetLanguage")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .ok_or(ValidationError::MissingTargetLanguage)?;

        Ok(Self {
            text: text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            model: input.get("model").and_then(Value::as_str).map(str::to_string),
        })
    }

    /// Re-checks the invariants `parse` establishes, for requests built in code.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::MissingText);
        }
        if self.source_language.trim().is_empty() {
            return Err(ValidationError::MissingSourceLanguage);
        }
        if self.target_language.trim().is_empty() {
            return Err(ValidationError::MissingTargetLanguage);
        }
        Ok(())
    }
}

/// Timing and token counters reported by the inference service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationStats {
    /// Nanoseconds.
    pub total_duration: Option<u64>,
    pub eval_count: Option<u64>,
    /// Nanoseconds.
    pub eval_duration: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub translation: String,
    pub model: String,
    pub stats: TranslationStats,
}

/// Anything that can turn a request into a translation.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, request: TranslationRequest) -> Result<TranslationResult, TranslateError>;
}
