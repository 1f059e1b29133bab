//! Conversation log and the service that answers user messages.

use crate::{
    config::ChatConfig,
    constants::FALLBACK_REPLY,
    Result,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// One entry of the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub from: Sender,
    pub text: String,
}

impl Message {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            from: Sender::User,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            from: Sender::Bot,
            text: text.into(),
        }
    }
}

/// Produces a reply for a user message
pub trait ReplyService {
    /// # Errors
    ///
    /// Returns [`crate::Error::Network`] when no reply could be obtained
    fn reply(&mut self, text: &str) -> Result<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    reply: String,
}

/// Blocking JSON client for a `POST {endpoint}/chat` reply backend
pub struct HttpReplyService {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpReplyService {
    /// # Errors
    ///
    /// Returns [`crate::Error::Network`] if the HTTP client cannot be built
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        let url = format!("{}/chat", endpoint.trim_end_matches('/'));
        info!("Reply service at {}", url);
        Ok(Self { client, url })
    }

    /// # Errors
    ///
    /// See [`HttpReplyService::new`]
    pub fn from_config(config: &ChatConfig) -> Result<Self> {
        Self::new(&config.endpoint, Duration::from_secs(config.timeout_secs))
    }
}

impl ReplyService for HttpReplyService {
    fn reply(&mut self, text: &str) -> Result<String> {
        let response: ChatResponse = self
            .client
            .post(&self.url)
            .json(&ChatRequest { text })
            .send()?
            .error_for_status()?
            .json()?;
        Ok(response.reply)
    }
}

/// Offline stand-in that repeats the message back
#[derive(Debug, Default)]
pub struct EchoReplyService;

impl ReplyService for EchoReplyService {
    fn reply(&mut self, text: &str) -> Result<String> {
        Ok(format!("You said: {text}"))
    }
}

/// The visible message list
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Start with the assistant's greeting
    #[must_use]
    pub fn new(assistant_name: &str) -> Self {
        Self {
            messages: vec![Message::bot(format!("Hello! I'm {assistant_name} 🤖"))],
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Send `text` and record the reply.
    ///
    /// Blank text is ignored. A failing service is reported as one fallback bot
    /// message; the error never reaches the caller.
    pub fn send(&mut self, text: &str, service: &mut dyn ReplyService) -> Option<&Message> {
        if text.trim().is_empty() {
            return None;
        }

        self.messages.push(Message::user(text));
        let reply = match service.reply(text) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Reply service failed: {}", e);
                FALLBACK_REPLY.to_string()
            }
        };
        self.messages.push(Message::bot(reply));
        self.messages.last()
    }
}
