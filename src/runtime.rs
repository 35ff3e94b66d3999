//! Survey runtime
//!
//! One [`RespondentRuntime`] task per roster member, each draining its own
//! queue. The manager routes inbound messages and lifecycle signals to those
//! queues and keeps a shared view of every respondent's state.

mod executor;
mod recovery;
pub mod traits;


pub use executor::{RespondentRuntime, RetryPolicy};
pub use recovery::recover_state;
pub use traits::*;

use crate::grid::{Grid, GridError};
use crate::state_machine::{InboundMessage, Mode, RespondentState, SurveyContext, TransitionError};
use crate::survey::{Catalog, Respondent, Roster};
use crate::transport::SendError;
use crate::validator::{classify, Outcome};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, RwLock};

/// Errors surfaced while handling a respondent's event
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("Answer not recorded: {0}")]
    Persistence(#[source] GridError),
    #[error("Answer not recorded: {source}; resend request not delivered: {notice}")]
    PersistenceUnannounced {
        #[source]
        source: GridError,
        notice: SendError,
    },
    #[error("Delivery failed: {0}")]
    Delivery(#[source] SendError),
    #[error("Runtime for respondent {0} has stopped")]
    RespondentStopped(String),
}

/// Work item on a respondent's queue
#[derive(Debug, Clone)]
pub enum RespondentCommand {
    Message(InboundMessage),
    Connected,
}

/// Published after every command a respondent runtime finishes
#[derive(Debug, Clone)]
pub struct StateUpdate {
    pub state: RespondentState,
    /// Set when handling failed
    pub error: Option<String>,
}

/// Operator-facing view of one respondent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RespondentStatus {
    pub id: String,
    pub name: String,
    pub cursor: usize,
    pub total: usize,
    pub mode: Mode,
}

/// Handle to a running respondent
struct RespondentHandle {
    respondent: Respondent,
    event_tx: mpsc::Sender<RespondentCommand>,
}

/// Manager for all respondent runtimes
pub struct RuntimeManager {
    catalog: Catalog,
    roster: Roster,
    grid: Grid,
    runtimes: HashMap<String, RespondentHandle>,
    states: Arc<RwLock<HashMap<String, RespondentState>>>,
    updates_tx: broadcast::Sender<StateUpdate>,
}

impl RuntimeManager {
    /// Recover every respondent's state from the grid and start their runtimes
    pub async fn start(
        roster: Roster,
        catalog: Catalog,
        grid: Grid,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self::start_with_retry(
            roster,
            catalog,
            grid,
            transport,
            RetryPolicy::default(),
            RetryPolicy::default(),
        )
        .await
    }

    pub async fn start_with_retry(
        roster: Roster,
        catalog: Catalog,
        grid: Grid,
        transport: Arc<dyn Transport>,
        grid_retry: RetryPolicy,
        send_retry: RetryPolicy,
    ) -> Self {
        let table = grid.snapshot().await;
        let store: Arc<dyn AnswerStore> = Arc::new(grid.clone());
        let (updates_tx, _) = broadcast::channel(256);
        let states = Arc::new(RwLock::new(HashMap::new()));
        let mut runtimes = HashMap::new();

        for respondent in roster.iter() {
            let decision = recover_state(respondent, &catalog, &table);
            tracing::info!(
                respondent = %respondent.id,
                cursor = decision.state.cursor,
                reason = ?decision.reason,
                "Recovered respondent state"
            );
            states
                .write()
                .await
                .insert(respondent.id.clone(), decision.state.clone());

            let (event_tx, event_rx) = mpsc::channel(32);
            let runtime = RespondentRuntime::new(
                SurveyContext::new(respondent.clone(), catalog.clone()),
                decision.state,
                store.clone(),
                transport.clone(),
                event_rx,
                updates_tx.clone(),
                states.clone(),
            )
            .with_retry(grid_retry, send_retry);

            tokio::spawn(runtime.run());

            runtimes.insert(
                respondent.id.clone(),
                RespondentHandle {
                    respondent: respondent.clone(),
                    event_tx,
                },
            );
        }

        tracing::info!(
            respondents = roster.len(),
            questions = catalog.len(),
            "Survey runtime started"
        );

        Self {
            catalog,
            roster,
            grid,
            runtimes,
            states,
            updates_tx,
        }
    }

    /// Route an inbound message to its respondent's queue.
    ///
    /// Returns `false` when the sender is not on the roster; such messages
    /// are logged and dropped without a reply.
    pub async fn dispatch(&self, message: InboundMessage) -> Result<bool, RuntimeError> {
        let Some(handle) = self.runtimes.get(&message.respondent_id) else {
            let outcome = classify(&message, None);
            if outcome != Outcome::EmptyIgnored {
                tracing::info!(respondent = %message.respondent_id, ?outcome, "Message from unknown respondent dropped");
            }
            return Ok(false);
        };

        handle
            .event_tx
            .send(RespondentCommand::Message(message))
            .await
            .map_err(|_| RuntimeError::RespondentStopped(handle.respondent.id.clone()))?;
        Ok(true)
    }

    /// Transport (re)connected: every respondent gets whatever they are
    /// currently waiting on. Returns how many runtimes were notified.
    pub async fn connected(&self) -> usize {
        tracing::info!("Transport connected, resuming respondents");
        let sends = self.roster.iter().filter_map(|respondent| {
            let handle = self.runtimes.get(&respondent.id)?;
            Some(handle.event_tx.send(RespondentCommand::Connected))
        });
        let results = futures::future::join_all(sends).await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            tracing::error!(failed, "Some respondent runtimes have stopped");
        }
        results.len() - failed
    }

    /// Current state of every respondent, in roster order
    pub async fn snapshot(&self) -> Vec<RespondentStatus> {
        let states = self.states.read().await;
        self.roster
            .iter()
            .filter_map(|respondent| {
                let state = states.get(&respondent.id)?;
                Some(RespondentStatus {
                    id: respondent.id.clone(),
                    name: respondent.display_name.clone(),
                    cursor: state.cursor,
                    total: self.catalog.len(),
                    mode: state.mode,
                })
            })
            .collect()
    }

    /// Subscribe to per-command state updates
    pub fn subscribe(&self) -> broadcast::Receiver<StateUpdate> {
        self.updates_tx.subscribe()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}
