//! Respondent runtime executor

use super::traits::{AnswerStore, Transport};
use super::{RespondentCommand, RuntimeError, StateUpdate};

use crate::grid::GridError;
use crate::prompt::OutboundMessage;
use crate::state_machine::{transition, Effect, Event, RespondentState, SurveyContext};
use crate::transport::SendError;
use crate::validator::{classify, Outcome};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, RwLock};

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            base_delay,
        }
    }

    /// Delay before retry number `attempt` (1-based): base, 2x base, 4x base, ...
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * (1u32 << attempt.saturating_sub(1).min(16))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(100))
    }
}

/// Serial event loop for one respondent.
///
/// Owning the receiving end of the respondent's queue is what keeps their
/// events in arrival order with at most one transition in flight.
pub struct RespondentRuntime<A, T>
where
    A: AnswerStore + ?Sized + 'static,
    T: Transport + ?Sized + 'static,
{
    context: SurveyContext,
    state: RespondentState,
    store: Arc<A>,
    transport: Arc<T>,
    event_rx: mpsc::Receiver<RespondentCommand>,
    updates_tx: broadcast::Sender<StateUpdate>,
    /// Shared view of every respondent's committed state
    states: Arc<RwLock<HashMap<String, RespondentState>>>,
    grid_retry: RetryPolicy,
    send_retry: RetryPolicy,
}

impl<A, T> RespondentRuntime<A, T>
where
    A: AnswerStore + ?Sized + 'static,
    T: Transport + ?Sized + 'static,
{
    pub fn new(
        context: SurveyContext,
        state: RespondentState,
        store: Arc<A>,
        transport: Arc<T>,
        event_rx: mpsc::Receiver<RespondentCommand>,
        updates_tx: broadcast::Sender<StateUpdate>,
        states: Arc<RwLock<HashMap<String, RespondentState>>>,
    ) -> Self {
        Self {
            context,
            state,
            store,
            transport,
            event_rx,
            updates_tx,
            states,
            grid_retry: RetryPolicy::default(),
            send_retry: RetryPolicy::default(),
        }
    }

    /// Override the grid write and outbound send retry policies
    pub fn with_retry(mut self, grid_retry: RetryPolicy, send_retry: RetryPolicy) -> Self {
        self.grid_retry = grid_retry;
        self.send_retry = send_retry;
        self
    }

    pub async fn run(mut self) {
        let respondent_id = self.context.respondent.id.clone();
        tracing::debug!(respondent = %respondent_id, cursor = self.state.cursor, "Starting respondent runtime");

        // Process events in a loop - one at a time, in arrival order
        while let Some(command) = self.event_rx.recv().await {
            let result = self.process_command(command).await;
            if let Err(e) = &result {
                match e {
                    RuntimeError::Delivery(_) => {
                        tracing::warn!(respondent = %respondent_id, error = %e, "Outbound delivery failed");
                    }
                    _ => {
                        tracing::error!(respondent = %respondent_id, error = %e, "Error handling event");
                    }
                }
            }
            let _ = self.updates_tx.send(StateUpdate {
                state: self.state.clone(),
                error: result.err().map(|e| e.to_string()),
            });
        }

        tracing::debug!(respondent = %respondent_id, "Respondent runtime stopped");
    }

    async fn process_command(&mut self, command: RespondentCommand) -> Result<(), RuntimeError> {
        let event = match command {
            RespondentCommand::Message(message) => {
                let outcome = classify(&message, Some(self.state.mode));
                self.log_outcome(&outcome);
                Event::Inbound(outcome)
            }
            RespondentCommand::Connected => Event::Connected,
        };

        // Pure state transition
        let result = transition(&self.state, &self.context, event)?;

        // The grid write gates the commit; sends wait until it succeeds
        let mut outbound = Vec::new();
        for effect in result.effects {
            match effect {
                Effect::RecordAnswer {
                    question_index,
                    question_text,
                    value,
                } => {
                    if let Err(e) = self.record_answer(&question_text, &value).await {
                        tracing::error!(
                            respondent = %self.context.respondent.id,
                            question = %question_text,
                            question_index,
                            error = %e,
                            "Failed to record answer; cursor not advanced"
                        );
                        // Tell the respondent to resend; never acknowledge the answer
                        if let Err(notice) = self.deliver(&OutboundMessage::SaveFailed).await {
                            tracing::warn!(
                                respondent = %self.context.respondent.id,
                                kind = OutboundMessage::SaveFailed.kind(),
                                error = %notice,
                                "Outbound delivery failed"
                            );
                            return Err(RuntimeError::PersistenceUnannounced { source: e, notice });
                        }
                        return Err(RuntimeError::Persistence(e));
                    }
                    tracing::info!(
                        respondent = %self.context.respondent.id,
                        question = %question_text,
                        value = %value,
                        "Answer recorded"
                    );
                }
                Effect::Send(message) => outbound.push(message),
            }
        }

        self.commit(result.new_state).await;

        let mut delivery = Ok(());
        for message in &outbound {
            if let Err(e) = self.deliver(message).await {
                delivery = Err(RuntimeError::Delivery(e));
            }
        }
        delivery
    }

    async fn commit(&mut self, new_state: RespondentState) {
        if new_state == self.state {
            return;
        }
        debug_assert!(new_state.cursor >= self.state.cursor);
        tracing::info!(
            respondent = %self.context.respondent.id,
            from_cursor = self.state.cursor,
            to_cursor = new_state.cursor,
            mode = new_state.mode.as_str(),
            "State changed"
        );
        self.states
            .write()
            .await
            .insert(new_state.respondent_id.clone(), new_state.clone());
        self.state = new_state;
    }

    async fn record_answer(&self, question: &str, value: &str) -> Result<(), GridError> {
        let name = &self.context.respondent.display_name;
        let mut attempt = 1;
        loop {
            match self.store.record(question, name, value).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.grid_retry.attempts => {
                    tracing::warn!(
                        respondent = %self.context.respondent.id,
                        attempt,
                        error = %e,
                        "Grid write failed, retrying"
                    );
                    tokio::time::sleep(self.grid_retry.delay(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Send one message. Messages that acknowledge an accepted answer are
    /// retried on retryable errors; everything else gets a single attempt.
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), SendError> {
        let respondent_id = &self.context.respondent.id;
        let text = message.render();
        let attempts = if message.follows_answer() {
            self.send_retry.attempts
        } else {
            1
        };

        let mut attempt = 1;
        loop {
            match self.transport.send(respondent_id, &text).await {
                Ok(()) => {
                    tracing::info!(respondent = %respondent_id, kind = message.kind(), "Message sent");
                    return Ok(());
                }
                Err(e) if e.is_retryable() && attempt < attempts => {
                    tracing::warn!(
                        respondent = %respondent_id,
                        kind = message.kind(),
                        attempt,
                        error = %e,
                        "Send failed, retrying"
                    );
                    tokio::time::sleep(self.send_retry.delay(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn log_outcome(&self, outcome: &Outcome) {
        let respondent = &self.context.respondent.id;
        match outcome {
            Outcome::NumericOption(_) | Outcome::JustificationText(_) => {
                tracing::debug!(respondent = %respondent, ?outcome, "Inbound answer");
            }
            Outcome::EmptyIgnored => {
                tracing::debug!(respondent = %respondent, "Ignoring empty message");
            }
            Outcome::MediaRejected | Outcome::Invalid | Outcome::UnknownRespondent => {
                tracing::debug!(respondent = %respondent, ?outcome, mode = self.state.mode.as_str(), "Rejected reply");
            }
        }
    }
}
