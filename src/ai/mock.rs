use super::FieldExtractionService;
use crate::models::ImageInput;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Canned responses for the extraction service, cycled in order.
pub struct MockExtractionClient {
    responses: Arc<Mutex<Vec<MockReply>>>,
    requests: Arc<Mutex<Vec<(ImageInput, String)>>>,
}

#[derive(Clone)]
enum MockReply {
    Content(String),
    ProviderError { status: u16, message: String },
}

impl MockExtractionClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_content(self, content: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(MockReply::Content(content.into()));
        self
    }

    pub fn with_provider_error(self, status: u16, message: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(MockReply::ProviderError {
                status,
                message: message.into(),
            });
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Image and prompt of every call received so far.
    pub fn requests(&self) -> Vec<(ImageInput, String)> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockExtractionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FieldExtractionService for MockExtractionClient {
    async fn extract_fields(&self, image: &ImageInput, prompt: &str) -> Result<String> {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push((image.clone(), prompt.to_string()));
            requests.len()
        };

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Default mock response
            return Ok(r#"{"document_type":"passport","name":"Jane Doe"}"#.to_string());
        }

        match &responses[(count - 1) % responses.len()] {
            MockReply::Content(content) => Ok(content.clone()),
            MockReply::ProviderError { status, message } => Err(Error::Provider {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}
