use crate::client::{Client, RetryPolicy};
use crate::ChatModel;
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::sync::Arc;

use super::audio::OpenAITranscriber;
use super::chat::OpenAIChatModel;

#[derive(Clone)]
pub struct OpenAIProvider {
    client: Client,
    base_url: String,
}

const API_VERSION: &str = "v1";
const DEFAULT_BASE_URL: &str = "https://api.openai.com";

impl OpenAIProvider {
    pub fn default(api_key: &str, retry: RetryPolicy) -> anyhow::Result<Self> {
        Self::new(DEFAULT_BASE_URL, api_key, retry)
    }

    /// Create a provider with a custom base URL (e.g., for proxying or a compatible service).
    /// The API version path (/v1) is automatically appended.
    pub fn new(base_url: &str, api_key: &str, retry: RetryPolicy) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key format")?,
        );

        let base_url = base_url.trim_end_matches('/');
        Ok(OpenAIProvider {
            client: Client::with_headers(headers, retry)?,
            base_url: format!("{}/{}", base_url, API_VERSION),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a chat model by name, returned as Arc for sharing across threads
    pub fn create_chat_model(&self, model_name: &str) -> Arc<dyn ChatModel + Send + Sync> {
        Arc::new(OpenAIChatModel::new(
            self.client.clone(),
            self.base_url.clone(),
            model_name.to_string(),
        ))
    }

    pub fn create_transcriber(&self, model_name: &str, language: Option<&str>) -> OpenAITranscriber {
        OpenAITranscriber::new(
            self.client.clone(),
            self.base_url.clone(),
            model_name.to_string(),
            language.map(str::to_string),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_version_suffix() {
        let provider =
            OpenAIProvider::new("http://localhost:8080/", "sk-test", RetryPolicy::none()).unwrap();
        assert_eq!(provider.base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn test_invalid_api_key_is_an_error() {
        let result = OpenAIProvider::default("bad\nkey", RetryPolicy::none());
        assert!(result.is_err());
    }

    #[test]
    fn test_create_chat_model_keeps_name() {
        let provider = OpenAIProvider::default("sk-test", RetryPolicy::none()).unwrap();
        let model = provider.create_chat_model("gpt-4o-mini");
        assert_eq!(model.name(), "gpt-4o-mini");
    }
}
