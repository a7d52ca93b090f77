//! LLM text-service client for trendcast.
//!
//! Speaks the OpenAI-style `/chat/completions` protocol over HTTP and
//! implements the engine's [`trendcast_engine::TextService`] contract:
//! text generation, topic extraction, hashtag generation, and relevance
//! assessment. Readability is scored locally, without an API call.

pub mod client;
pub mod error;
pub mod readability;
mod retry;
mod service;
mod types;

pub use client::{LlmClient, LlmConfig};
pub use error::LlmError;
pub use readability::readability_score;
