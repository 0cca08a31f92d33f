//! External AI analysis: request building, the Gemini call, and
//! response validation.

pub mod client;
pub mod request;
pub mod response;

pub use client::GeminiClient;
