use serde::Serialize;
use std::fmt;

/// Lifecycle of one backtest run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum SessionState {
    #[default]
    Idle,
    Submitting,
    AwaitingResult,
    RenderingSuccess,
    ReportingFailure,
}

impl SessionState {
    /// True while a run holds the single-flight slot.
    pub fn is_busy(&self) -> bool {
        !matches!(self, SessionState::Idle)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Submitting => "submitting",
            SessionState::AwaitingResult => "awaiting_result",
            SessionState::RenderingSuccess => "rendering_success",
            SessionState::ReportingFailure => "reporting_failure",
        };
        f.write_str(s)
    }
}
