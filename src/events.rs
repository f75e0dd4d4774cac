use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::session::SessionState;

/// Correlates everything that happens during one backtest run.
pub type RunId = Uuid;

#[derive(Clone, Debug)]
pub enum SessionEvent {
    StateChanged {
        run_id: RunId,
        state: SessionState,
        at: DateTime<Utc>,
    },
    RunCompleted {
        run_id: RunId,
        trades: usize,
        at: DateTime<Utc>,
    },
    RunFailed {
        run_id: RunId,
        error: String,
        at: DateTime<Utc>,
    },
}

impl SessionEvent {
    pub fn run_id(&self) -> RunId {
        match self {
            SessionEvent::StateChanged { run_id, .. }
            | SessionEvent::RunCompleted { run_id, .. }
            | SessionEvent::RunFailed { run_id, .. } => *run_id,
        }
    }
}
