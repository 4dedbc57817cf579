// src/core/session.rs — Persistent chat context with a model provider

use std::sync::Arc;

use tracing::Span;

use crate::infra::errors::SuiteGenError;
use crate::provider::{ChatRequest, Message, ModelProvider, ResponseFormat, TokenUsage};

/// Immutable settings a session is created with.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub name: String,
    pub model: String,
    pub system_prompt: String,
    pub response_format: Option<ResponseFormat>,
}

/// A conversation that keeps every prior turn and resends it with each message.
pub struct ChatSession {
    config: SessionConfig,
    provider: Arc<dyn ModelProvider>,
    history: Vec<Message>,
    usage: TokenUsage,
    span: Span,
}

impl ChatSession {
    pub fn new(provider: Arc<dyn ModelProvider>, config: SessionConfig) -> Self {
        let span = tracing::info_span!("session", name = %config.name);
        Self {
            config,
            provider,
            history: Vec::new(),
            usage: TokenUsage::default(),
            span,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Tokens spent across all turns of this session.
    pub fn usage(&self) -> &TokenUsage {
        &self.usage
    }

    /// Span that components built on this session log under.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Send one user message and return the model's text.
    ///
    /// The turn is only committed to the history once the provider answers,
    /// so a failed call leaves the conversation as it was.
    pub async fn send(&mut self, content: impl Into<String>) -> Result<String, SuiteGenError> {
        let mut messages = self.history.clone();
        messages.push(Message::user(content));

        let request = ChatRequest {
            model: self.config.model.clone(),
            system: Some(self.config.system_prompt.clone()),
            messages,
            response_format: self.config.response_format.clone(),
        };

        let response = self.provider.chat(request.clone()).await?;

        self.usage.input_tokens += response.usage.input_tokens;
        self.usage.output_tokens += response.usage.output_tokens;
        self.history = request.messages;
        self.history.push(Message::assistant(response.content.clone()));

        Ok(response.content)
    }
}
