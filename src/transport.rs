//! Outbound delivery adapters
//!
//! The messaging channel itself lives outside this service. Outbound text is
//! handed to it through a webhook, or only logged when none is configured.

use crate::runtime::Transport;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Delivery error with classification
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SendError {
    pub kind: SendErrorKind,
    pub message: String,
}

impl SendError {
    pub fn new(kind: SendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(SendErrorKind::Network, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(SendErrorKind::Rejected, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(SendErrorKind::Unknown, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Error classification for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendErrorKind {
    /// Timeouts, refused connections, 5xx and 429 - retryable
    Network,
    /// The channel refused the message (4xx) - not retryable
    Rejected,
    /// Unknown error
    Unknown,
}

impl SendErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network)
    }
}

#[derive(Debug, Serialize)]
struct OutboundPayload<'a> {
    to: &'a str,
    text: &'a str,
}

/// Posts `{ "to", "text" }` JSON to the channel gateway
pub struct WebhookTransport {
    client: Client,
    url: String,
    token: Option<String>,
}

impl WebhookTransport {
    pub fn new(url: impl Into<String>, token: Option<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            url: url.into(),
            token,
        })
    }

    fn classify_status(status: reqwest::StatusCode, body: &str) -> SendError {
        match status.as_u16() {
            429 => SendError::network(format!("Rate limited: {body}")),
            500..=599 => SendError::network(format!("Gateway error {status}: {body}")),
            400..=499 => SendError::rejected(format!("Rejected {status}: {body}")),
            _ => SendError::unknown(format!("HTTP {status}: {body}")),
        }
    }
}

#[async_trait]
impl Transport for WebhookTransport {
    async fn send(&self, respondent_id: &str, text: &str) -> Result<(), SendError> {
        let mut request = self.client.post(&self.url).json(&OutboundPayload {
            to: respondent_id,
            text,
        });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SendError::network(format!("Request timeout: {e}"))
            } else if e.is_connect() {
                SendError::network(format!("Connection failed: {e}"))
            } else {
                SendError::unknown(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(Self::classify_status(status, &body))
    }
}

/// Logs outbound text instead of delivering it
pub struct LogTransport;

#[async_trait]
impl Transport for LogTransport {
    async fn send(&self, respondent_id: &str, text: &str) -> Result<(), SendError> {
        tracing::info!(respondent = %respondent_id, text = %text, "Outbound message (not delivered)");
        Ok(())
    }
}
