//! AI chat companion.
//!
//! [`OpenAiChatClient`] talks to an OpenAI-compatible chat completions
//! endpoint. [`ChatCompanion`] keeps the conversation and always produces a
//! reply: when the client fails, the user gets a fixed fallback message.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ChatError;
use crate::services::{ChatClient, ChatMessage};
use crate::storage::{keyring_store, ChatConfig};

/// Reply shown when the chat endpoint cannot be reached.
pub const FALLBACK_REPLY: &str =
    "I'm having trouble connecting right now, but I'm still here. \
     Take a slow breath with me, and try again in a moment.";

const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Chat completions over HTTP.
pub struct OpenAiChatClient {
    http: reqwest::Client,
    endpoint: url::Url,
    model: String,
    api_key: Option<String>,
}

impl OpenAiChatClient {
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, ChatError> {
        let base = url::Url::parse(base_url)?;
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: base.join("chat/completions")?,
            model: model.into(),
            api_key,
        })
    }

    /// Build from config, reading the key from the environment or the OS keyring.
    pub fn from_config(config: &ChatConfig) -> Result<Self, ChatError> {
        let api_key = std::env::var(API_KEY_ENV).ok().or_else(|| {
            keyring_store::get(keyring_store::CHAT_API_KEY)
                .unwrap_or_else(|e| {
                    tracing::debug!(error = %e, "keyring unavailable");
                    None
                })
        });
        Self::new(&config.base_url, config.model.clone(), api_key)
    }

    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    async fn send_message(
        &self,
        text: &str,
        history: &[ChatMessage],
        system_prompt: &str,
    ) -> Result<String, ChatError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ChatError::NotConfigured(format!("set {API_KEY_ENV} or store a key in the keyring"))
        })?;

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(text));

        let resp = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(api_key)
            .json(&CompletionRequest {
                model: &self.model,
                messages,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: CompletionResponse = resp
            .json()
            .await
            .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ChatError::MalformedResponse("no assistant content".into()))
    }
}

/// A conversation with the companion.
pub struct ChatCompanion {
    client: Arc<dyn ChatClient>,
    system_prompt: String,
    max_history: usize,
    history: Vec<ChatMessage>,
}

impl ChatCompanion {
    pub fn new(client: Arc<dyn ChatClient>, system_prompt: impl Into<String>, max_history: usize) -> Self {
        Self {
            client,
            system_prompt: system_prompt.into(),
            max_history,
            history: Vec::new(),
        }
    }

    pub fn from_config(client: Arc<dyn ChatClient>, config: &ChatConfig) -> Self {
        Self::new(client, config.system_prompt.clone(), config.max_history)
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Send `text` and return the assistant's reply, or [`FALLBACK_REPLY`].
    ///
    /// Fallback replies are shown but not added to the history sent upstream.
    /// The stored history is capped at `max_history` messages.
    pub async fn reply(&mut self, text: &str) -> String {
        let window_start = self.history.len().saturating_sub(self.max_history);
        let window = &self.history[window_start..];

        match self.client.send_message(text, window, &self.system_prompt).await {
            Ok(reply) => {
                self.history.push(ChatMessage::user(text));
                self.history.push(ChatMessage::assistant(reply.clone()));
                if self.history.len() > self.max_history {
                    let excess = self.history.len() - self.max_history;
                    self.history.drain(..excess);
                }
                reply
            }
            Err(e) => {
                tracing::warn!(error = %e, "chat completion failed; using fallback reply");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}
