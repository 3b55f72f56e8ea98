pub mod client;
pub mod types;
pub mod vision;

pub use client::GroqHttpClient;
pub use vision::GroqVisionClient;
