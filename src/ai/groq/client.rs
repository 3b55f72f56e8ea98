use super::types::{ChatCompletionRequest, ChatCompletionResponse, ProviderErrorBody};
use crate::models::DEFAULT_GROQ_BASE_URL;
use crate::{Error, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Lightweight Groq REST client. One request per call, no retries.
pub struct GroqHttpClient {
    pub(crate) client: Client,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    timeout: Option<Duration>,
}

impl GroqHttpClient {
    pub fn new(api_key: String, timeout: Option<Duration>) -> Self {
        Self::new_with_client(api_key, timeout, Client::new())
    }

    pub fn new_with_client(api_key: String, timeout: Option<Duration>, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            timeout,
        }
    }

    /// Point the client at another OpenAI-compatible host (without trailing `/`).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub async fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        path: &str,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .json(request);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Failed to send request to Groq: {}", e);
            e
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("Groq API error (status {}): {}", status, body);
            let message = ProviderErrorBody::message_from(&body)
                .unwrap_or_else(|| format!("Groq API error {}", status.as_u16()));
            return Err(Error::Provider {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Groq response: {}\nBody: {}", e, body);
            Error::Generic(format!("Failed to parse Groq response: {}", e))
        })
    }

    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        self.post("/v1/chat/completions", request).await
    }
}
