//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::grid::{Grid, GridResult};
use crate::transport::SendError;
use async_trait::async_trait;
use std::sync::Arc;

/// Durable store for accepted answers
#[async_trait]
pub trait AnswerStore: Send + Sync {
    /// Upsert and persist one answer. On error nothing was recorded.
    async fn record(&self, question: &str, respondent_name: &str, value: &str) -> GridResult<()>;
}

/// Outbound half of the messaging channel
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver `text` to a respondent address
    async fn send(&self, respondent_id: &str, text: &str) -> Result<(), SendError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: AnswerStore + ?Sized> AnswerStore for Arc<T> {
    async fn record(&self, question: &str, respondent_name: &str, value: &str) -> GridResult<()> {
        (**self).record(question, respondent_name, value).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, respondent_id: &str, text: &str) -> Result<(), SendError> {
        (**self).send(respondent_id, text).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

#[async_trait]
impl AnswerStore for Grid {
    async fn record(&self, question: &str, respondent_name: &str, value: &str) -> GridResult<()> {
        self.upsert_and_flush(question, respondent_name, value).await
    }
}
