//! Backtest session orchestrator.
//!
//! Drives one run at a time through
//! `Idle → Submitting → AwaitingResult → RenderingSuccess | ReportingFailure → Idle`
//! and keeps the chart, log, results and modal views consistent with the
//! outcome. A run that fails leaves the previously rendered result in place.

pub mod render;
pub mod state;


use chrono::Utc;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{broadcast, Semaphore, SemaphorePermit};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::bus::SessionBus;
use crate::config::{AnnotationStyle, AppConfig, SingleFlightPolicy};
use crate::constants::SESSION_BUS_CAPACITY;
use crate::document::EditorSource;
use crate::error::BacktestError;
use crate::events::{RunId, SessionEvent};
use crate::service::BacktestService;
use crate::types::{BacktestResult, ChartAnnotation, StrategySource};
use crate::views::{ChartSink, ResultViews};

pub use render::{
    build_annotations, build_log_lines, format_log_line, parse_backtest_response, to_annotation,
};
pub use state::SessionState;

/// Everything one successful run rendered.
#[derive(Clone, Debug)]
pub struct BacktestOutcome {
    pub run_id: RunId,
    pub result: BacktestResult,
    pub annotations: Vec<ChartAnnotation>,
    pub log: String,
}

pub struct BacktestSession {
    service: Arc<dyn BacktestService>,
    editor: Arc<dyn EditorSource>,
    chart: ChartSink,
    views: ResultViews,
    chart_id: String,
    style: AnnotationStyle,
    policy: SingleFlightPolicy,
    slot: Semaphore,
    state: Arc<Mutex<SessionState>>,
    bus: SessionBus,
}

impl BacktestSession {
    pub fn new(
        service: Arc<dyn BacktestService>,
        editor: Arc<dyn EditorSource>,
        chart: ChartSink,
        views: ResultViews,
        config: &AppConfig,
    ) -> Self {
        Self {
            service,
            editor,
            chart,
            views,
            chart_id: config.chart_id.clone(),
            style: config.annotations.clone(),
            policy: config.single_flight,
            slot: Semaphore::new(1),
            state: Arc::new(Mutex::new(SessionState::Idle)),
            bus: SessionBus::new(SESSION_BUS_CAPACITY),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.bus.subscribe()
    }

    /// Submit whatever the editor currently holds.
    pub async fn run_from_editor(&self) -> Result<BacktestOutcome, BacktestError> {
        let source = self.editor.current_text();
        self.begin_backtest(source).await
    }

    /// Submit `source`, wait for the result and render it.
    pub async fn begin_backtest(&self, source: StrategySource) -> Result<BacktestOutcome, BacktestError> {
        let _permit = self.acquire_slot().await?;

        let run_id = Uuid::new_v4();
        let span = info_span!("backtest", %run_id);
        self.run(run_id, source).instrument(span).await
    }

    async fn acquire_slot(&self) -> Result<SemaphorePermit<'_>, BacktestError> {
        match self.policy {
            SingleFlightPolicy::Reject => self.slot.try_acquire().map_err(|_| {
                warn!("⛔ [SESSION] Backtest already running; submission rejected");
                BacktestError::AlreadyRunning
            }),
            SingleFlightPolicy::Queue => {
                if self.slot.available_permits() == 0 {
                    info!("⏳ [SESSION] Backtest already running; submission queued");
                }
                self.slot
                    .acquire()
                    .await
                    .map_err(|_| BacktestError::AlreadyRunning)
            }
        }
    }

    async fn run(&self, run_id: RunId, source: StrategySource) -> Result<BacktestOutcome, BacktestError> {
        let _idle = IdleOnExit {
            run_id,
            state: Arc::clone(&self.state),
            bus: self.bus.clone(),
        };

        info!(
            "🚀 [SESSION] Submitting strategy ({} bytes) to {}",
            source.as_str().len(),
            self.service.name()
        );
        self.transition(run_id, SessionState::Submitting);
        let request = self.service.begin_backtest(&source);

        self.transition(run_id, SessionState::AwaitingResult);
        let response = request.await;

        match response
            .map_err(BacktestError::from)
            .and_then(parse_backtest_response)
        {
            Ok(result) => {
                self.transition(run_id, SessionState::RenderingSuccess);
                let outcome = self.render(run_id, result);
                self.bus.publish(SessionEvent::RunCompleted {
                    run_id,
                    trades: outcome.result.trade_events.len(),
                    at: Utc::now(),
                });
                info!(
                    "✅ [SESSION] Backtest finished: {} trade(s), {} status message(s)",
                    outcome.result.trade_events.len(),
                    outcome.result.status_messages.len()
                );
                Ok(outcome)
            }
            Err(e) => {
                self.transition(run_id, SessionState::ReportingFailure);
                error!("❌ [SESSION] Backtest failed: {}", e);
                self.views.notify_failure(&e.to_string());
                self.bus.publish(SessionEvent::RunFailed {
                    run_id,
                    error: e.to_string(),
                    at: Utc::now(),
                });
                Err(e)
            }
        }
    }

    fn render(&self, run_id: RunId, result: BacktestResult) -> BacktestOutcome {
        let annotations = build_annotations(&result.trade_events, &self.style);
        let log = build_log_lines(&result.trade_events);

        self.chart.apply_annotations(&self.chart_id, &annotations);
        self.views.show_log(&log);
        self.views.show_results(&result.summary);
        self.views.notify_status(&result.status_messages);

        BacktestOutcome {
            run_id,
            result,
            annotations,
            log,
        }
    }

    fn transition(&self, run_id: RunId, next: SessionState) {
        set_state(&self.state, &self.bus, run_id, next);
    }
}

fn set_state(state: &Mutex<SessionState>, bus: &SessionBus, run_id: RunId, next: SessionState) {
    {
        let mut current = state.lock().unwrap_or_else(PoisonError::into_inner);
        if *current == next {
            return;
        }
        *current = next;
    }
    tracing::debug!("[SESSION] -> {}", next);
    bus.publish(SessionEvent::StateChanged {
        run_id,
        state: next,
        at: Utc::now(),
    });
}

/// Returns the session to `Idle` however the run ends, including when the
/// run future is dropped mid-request.
struct IdleOnExit {
    run_id: RunId,
    state: Arc<Mutex<SessionState>>,
    bus: SessionBus,
}

impl Drop for IdleOnExit {
    fn drop(&mut self) {
        set_state(&self.state, &self.bus, self.run_id, SessionState::Idle);
    }
}
