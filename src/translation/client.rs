//! 翻译服务客户端
//!
//! `POST /translate/`，请求体 `{project_api_key, language, texts}`，
//! 响应 `{translations: [{original, translated}]}`。响应中残缺的条目被忽略。

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::core::{service_endpoint, LanguageCode};
use crate::translation::error::{TranslationError, TranslationResult};

/// 一条翻译结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationPair {
    pub original: String,
    pub translated: String,
}

impl TranslationPair {
    pub fn new(original: impl Into<String>, translated: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            translated: translated.into(),
        }
    }
}

/// 批量翻译协作方
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate_batch(
        &self,
        language: &LanguageCode,
        texts: &[String],
    ) -> TranslationResult<Vec<TranslationPair>>;
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    project_api_key: &'a str,
    language: &'a str,
    texts: &'a [String],
}

/// 基于 reqwest 的翻译服务客户端
#[derive(Debug, Clone)]
pub struct HttpTranslator {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl HttpTranslator {
    pub fn new(api_base: &Url, api_key: impl Into<String>, timeout: Duration) -> TranslationResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TranslationError::ConfigError(e.to_string()))?;
        Ok(Self::with_client(client, service_endpoint(api_base, "translate/")?, api_key))
    }

    pub fn with_client(client: reqwest::Client, endpoint: Url, api_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint,
            api_key: api_key.into(),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate_batch(
        &self,
        language: &LanguageCode,
        texts: &[String],
    ) -> TranslationResult<Vec<TranslationPair>> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&TranslateRequest {
                project_api_key: &self.api_key,
                language: language.as_str(),
                texts,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::ServiceStatus(status.as_u16()));
        }

        let body: Value = response.json().await?;
        Ok(parse_translations(&body))
    }
}

/// 解析响应，只保留原文与译文都是非空字符串的条目
pub fn parse_translations(body: &Value) -> Vec<TranslationPair> {
    let Some(entries) = body.get("translations").and_then(Value::as_array) else {
        tracing::warn!("翻译响应缺少 translations 数组");
        return Vec::new();
    };

    let pairs: Vec<TranslationPair> = entries
        .iter()
        .filter_map(|entry| {
            let original = entry.get("original")?.as_str()?;
            let translated = entry.get("translated")?.as_str()?;
            (!original.is_empty() && !translated.is_empty())
                .then(|| TranslationPair::new(original, translated))
        })
        .collect();

    if pairs.len() < entries.len() {
        tracing::debug!("忽略 {} 条残缺的翻译条目", entries.len() - pairs.len());
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_translations_skips_malformed_entries() {
        let body = json!({
            "translations": [
                {"original": "Hello", "translated": "Bonjour"},
                {"original": "World"},
                {"original": "Cat", "translated": 42},
                {"original": "", "translated": "x"},
                "garbage"
            ]
        });
        assert_eq!(
            parse_translations(&body),
            vec![TranslationPair::new("Hello", "Bonjour")]
        );
    }

    #[test]
    fn test_parse_translations_without_array() {
        assert!(parse_translations(&json!({"error": "nope"})).is_empty());
        assert!(parse_translations(&json!([])).is_empty());
    }

    #[test]
    fn test_endpoint_is_derived_from_base() {
        let base = Url::parse("https://api.example.com/v2").unwrap();
        let translator = HttpTranslator::new(&base, "key", Duration::from_secs(5)).unwrap();
        assert_eq!(translator.endpoint().as_str(), "https://api.example.com/v2/translate/");
    }
}
