//! Identity-document field extraction service for VaultID
//!
//! Accepts a base64 image over HTTP, asks a Groq-hosted vision model to read
//! the document's fields as JSON, and relays the cleaned-up result to the
//! web client.

pub mod ai;
pub mod app;
pub mod error;
pub mod fields;
pub mod models;
pub mod prompts;

pub use error::{Error, Result};
