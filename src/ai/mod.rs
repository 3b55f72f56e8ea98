//! AI service integration for document field extraction
//!
//! Provides the interface the HTTP handler talks to, backed by Groq's
//! OpenAI-compatible vision chat completions, plus a mock for tests.

pub mod groq;
pub mod mock;

pub use groq::GroqVisionClient;
pub use mock::MockExtractionClient;

use crate::models::ImageInput;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait FieldExtractionService: Send + Sync {
    /// Ask the model to read `image` and return its raw answer text.
    ///
    /// A provider reply without any message content yields an empty string.
    async fn extract_fields(&self, image: &ImageInput, prompt: &str) -> Result<String>;
}
