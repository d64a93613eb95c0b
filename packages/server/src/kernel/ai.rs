// AI implementation using the OpenAI chat completions API
//
// This is the infrastructure implementation of BaseAI.
// Business logic (what to prompt for) lives in domain layers.

use anyhow::{Context, Result};
use async_trait::async_trait;
use openai_client::{ChatRequest, Message, OpenAIClient};

use super::BaseAI;

/// Default model for answering questions
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Low temperature keeps answers close to the supplied policy text
const ANSWER_TEMPERATURE: f32 = 0.2;

const MAX_ANSWER_TOKENS: u32 = 1024;

/// Wrapper around the chat client that implements BaseAI
#[derive(Clone)]
pub struct OpenAIAdapter {
    client: OpenAIClient,
    model: String,
}

impl OpenAIAdapter {
    pub fn new(api_key: String, model: impl Into<String>, base_url: Option<String>) -> Self {
        let client = match base_url {
            Some(url) => OpenAIClient::new(api_key).with_base_url(url),
            None => OpenAIClient::new(api_key),
        };

        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl BaseAI for OpenAIAdapter {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        tracing::debug!(
            prompt_length = user_prompt.len(),
            model = %self.model,
            "Calling OpenAI API"
        );

        let request = ChatRequest::new(self.model.clone())
            .message(Message::system(system_prompt))
            .message(Message::user(user_prompt))
            .temperature(ANSWER_TEMPERATURE)
            .max_tokens(MAX_ANSWER_TOKENS);

        let response = self
            .client
            .chat_completion(request)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, model = %self.model, "OpenAI API call failed");
                e
            })
            .context("Failed to call OpenAI API")?;

        tracing::info!(
            response_length = response.content.len(),
            model = %self.model,
            "OpenAI API response received"
        );

        Ok(response.content)
    }
}
