//! DeepL translation client.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use serde::{Deserialize, Serialize};

use super::{handle_response, http_client, send_error};
use crate::config::Config;
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: [&'a str; 1],
    target_lang: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    #[serde(default)]
    detected_source_language: Option<String>,
    #[serde(default)]
    text: String,
}

/// DeepL API client.
#[derive(Clone)]
pub struct DeeplClient {
    /// HTTP client.
    client: Client,

    /// API base URL (free or pro endpoint).
    api_url: String,

    /// Auth key.
    auth_key: String,

    /// Target language code.
    target_lang: String,

    /// Request timeout, for error reporting.
    request_timeout: Duration,
}

impl DeeplClient {
    /// Create a new client. The endpoint follows the key's tier unless
    /// the configuration overrides it.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config, auth_key: impl Into<String>) -> ClientResult<Self> {
        let auth_key = auth_key.into();

        Ok(Self {
            client: http_client(config, HeaderMap::new())?,
            api_url: config.deepl_url_for(&auth_key),
            auth_key,
            target_lang: config.target_lang.clone(),
            request_timeout: config.request_timeout,
        })
    }

    /// Endpoint in use.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Translate `text` into the configured target language.
    ///
    /// # Errors
    ///
    /// Returns error on API failure or when no non-empty translation comes back.
    pub async fn translate(&self, text: &str) -> ClientResult<String> {
        let url = format!("{}/translate", self.api_url);
        let body = TranslateRequest { text: [text], target_lang: &self.target_lang };

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("DeepL-Auth-Key {}", self.auth_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(e, self.request_timeout))?;

        let response = handle_response(response).await?;
        let value: serde_json::Value =
            response.json().await.map_err(|e| send_error(e, self.request_timeout))?;
        let result: TranslateResponse = serde_json::from_value(value)?;

        let translation = result
            .translations
            .into_iter()
            .find(|t| !t.text.trim().is_empty())
            .ok_or_else(|| ClientError::invalid_response("DeepL returned no translation"))?;

        tracing::debug!(
            source_lang = translation.detected_source_language.as_deref().unwrap_or("?"),
            chars = translation.text.chars().count(),
            "Translated text"
        );

        Ok(translation.text)
    }
}

impl std::fmt::Debug for DeeplClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeeplClient")
            .field("api_url", &self.api_url)
            .field("target_lang", &self.target_lang)
            .finish()
    }
}
