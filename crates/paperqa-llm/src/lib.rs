//! paperqa-llm
//!
//! Client for OpenAI-compatible chat completion endpoints, exposed through
//! the `paperqa_core::traits::ChatModel` seam.

pub mod client;
pub mod error;
pub mod types;

pub use client::{ChatClientConfig, OpenAiChatClient};
pub use error::LlmError;
