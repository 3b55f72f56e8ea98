use super::client::GroqHttpClient;
use super::types::{ChatCompletionRequest, ChatMessage, ImageUrl, MessagePart, ResponseFormat};
use crate::ai::FieldExtractionService;
use crate::models::{Config, ImageInput};
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

const MAX_COMPLETION_TOKENS: u32 = 1024;

/// Reads identity documents through a Groq-hosted vision model.
pub struct GroqVisionClient {
    http: GroqHttpClient,
    model: String,
}

impl GroqVisionClient {
    pub fn new(api_key: String, model: String, timeout: Option<Duration>) -> Self {
        Self::new_with_client(api_key, model, timeout, reqwest::Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Option<Duration>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: GroqHttpClient::new_with_client(api_key, timeout, client),
            model,
        }
    }

    /// Build a client from configuration; `None` when no API key is set.
    pub fn from_config(config: &Config, client: reqwest::Client) -> Option<Self> {
        let api_key = config.groq_api_key.clone()?;
        Some(
            Self::new_with_client(api_key, config.groq_model.clone(), config.request_timeout, client)
                .with_base_url(config.groq_base_url.clone()),
        )
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, image: &ImageInput, prompt: &str) -> ChatCompletionRequest {
        let user_message = ChatMessage {
            role: "user".to_string(),
            content: vec![
                MessagePart::Text {
                    text: prompt.to_string(),
                },
                MessagePart::ImageUrl {
                    image_url: ImageUrl {
                        url: image.data_uri(),
                    },
                },
            ],
        };

        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![user_message],
            temperature: 0.0,
            max_completion_tokens: MAX_COMPLETION_TOKENS,
            response_format: Some(ResponseFormat::json_object()),
        }
    }
}

#[async_trait]
impl FieldExtractionService for GroqVisionClient {
    async fn extract_fields(&self, image: &ImageInput, prompt: &str) -> Result<String> {
        tracing::debug!(
            "Requesting field extraction ({}, {} base64 chars) from {}",
            image.mime_type,
            image.data64.len(),
            self.model
        );

        let request = self.build_request(image, prompt);
        let response = self.http.chat_completion(&request).await?;

        let content = response.first_content().unwrap_or_default();
        if content.is_empty() {
            tracing::warn!(
                finish_reason = response.first_finish_reason().unwrap_or("unknown"),
                "Groq response carried no message content"
            );
        }
        Ok(content.to_string())
    }
}
