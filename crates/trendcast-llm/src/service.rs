//! [`TextService`] implementation over the chat client.
//!
//! Prompt construction and response parsing live here; transport, retry,
//! and error mapping live in [`crate::client`].

use anyhow::{Context, Result};
use async_trait::async_trait;

use trendcast_engine::TextService;

use crate::client::LlmClient;
use crate::readability;
use crate::types::ChatMessage;

/// Relevance assumed when the model's reply cannot be parsed as a number.
const DEFAULT_RELEVANCE: f64 = 0.5;

#[async_trait]
impl TextService for LlmClient {
    async fn generate_text(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        temperature: Option<f32>,
    ) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_prompt {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(prompt));

        let reply = self
            .chat(&messages, temperature)
            .await
            .context("text generation failed")?;
        Ok(reply.trim().to_string())
    }

    async fn extract_topics(&self, text: &str, max_topics: usize) -> Result<Vec<String>> {
        let system = format!(
            "You are a topic extraction expert. Extract the main topics from \
             the given text. Return up to {max_topics} topics as a JSON array \
             of strings. Focus on technology, business, and professional \
             topics.\n\n\
             Example response: [\"artificial intelligence\", \"startup funding\", \"remote work\"]"
        );
        let prompt = format!("Extract the main topics from this text: {text}");

        let reply = self
            .chat(
                &[ChatMessage::system(system), ChatMessage::user(prompt)],
                Some(0.1),
            )
            .await
            .context("topic extraction failed")?;

        let mut topics: Vec<String> = serde_json::from_str(reply.trim())
            .context("topic extraction returned a non-JSON-array reply")?;
        topics.truncate(max_topics);
        Ok(topics)
    }

    async fn generate_hashtags(&self, text: &str, max_hashtags: usize) -> Result<Vec<String>> {
        let system = format!(
            "You are a social hashtag expert. Generate relevant hashtags for \
             the given content. Return up to {max_hashtags} hashtags as a JSON \
             array of strings (without the # symbol). Focus on professional, \
             technology, and business hashtags.\n\n\
             Example response: [\"tech\", \"innovation\", \"startup\", \"AI\", \"productivity\"]"
        );
        let prompt = format!("Generate relevant hashtags for this content: {text}");

        let reply = self
            .chat(
                &[ChatMessage::system(system), ChatMessage::user(prompt)],
                Some(0.3),
            )
            .await
            .context("hashtag generation failed")?;

        let raw: Vec<String> = serde_json::from_str(reply.trim())
            .context("hashtag generation returned a non-JSON-array reply")?;
        let mut hashtags: Vec<String> = raw
            .into_iter()
            .map(|tag| tag.trim_start_matches('#').to_string())
            .filter(|tag| !tag.is_empty())
            .collect();
        hashtags.truncate(max_hashtags);
        Ok(hashtags)
    }

    async fn score_readability(&self, text: &str) -> Result<f64> {
        // Computed locally; kept on the trait so callers stay agnostic.
        Ok(readability::readability_score(text))
    }

    async fn assess_relevance(&self, topic: &str) -> Result<f64> {
        let prompt = format!(
            "Rate the relevance of this topic for a professional tech \
             audience on a scale of 0-1:\n\
             Topic: {topic}\n\n\
             Consider:\n\
             - Professional relevance\n\
             - Technology focus\n\
             - Business impact\n\
             - Current interest level\n\n\
             Respond with just a number between 0 and 1."
        );

        let reply = self
            .chat(&[ChatMessage::user(prompt)], Some(0.1))
            .await
            .context("relevance assessment failed")?;

        // Unparseable replies fall back to a documented neutral default
        // rather than failing the topic.
        let score = reply
            .trim()
            .parse::<f64>()
            .unwrap_or_else(|_| {
                tracing::warn!(topic, reply = %reply.trim(), "unparseable relevance reply; defaulting");
                DEFAULT_RELEVANCE
            });
        Ok(score.clamp(0.0, 1.0))
    }
}
