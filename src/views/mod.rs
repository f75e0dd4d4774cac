//! Result view updaters: chart sink, log/results panels and the modal.
//!
//! Server-supplied strings are escaped here, before anything reaches a
//! surface that renders markup.

pub mod chart;
pub mod escape;
pub mod panels;

use std::sync::Arc;

use crate::constants::views::{FAILURE_MODAL_TITLE, RESULT_MODAL_TITLE, STATUS_LINE_BREAK};

pub use chart::{
    ChartRegistry, ChartSeries, ChartSink, ChartSnapshot, MemoryChart, MemoryChartRegistry,
    StockEvent,
};
pub use escape::escape_html;
pub use panels::{
    ConsoleDropdown, ConsoleModal, ConsolePanel, DropdownSink, MemoryDropdown, MemoryModal,
    MemoryTextPanel, ModalMessage, ModalSurface, SelectOption, TextPanel,
};

/// Escape each status message and terminate it with `<br>`.
pub fn join_status_messages(messages: &[String]) -> String {
    messages
        .iter()
        .map(|m| format!("{}{}", escape_html(m), STATUS_LINE_BREAK))
        .collect()
}

/// The textual sinks of one backtest page.
#[derive(Clone)]
pub struct ResultViews {
    log: Arc<dyn TextPanel>,
    results: Arc<dyn TextPanel>,
    modal: Arc<dyn ModalSurface>,
}

impl ResultViews {
    pub fn new(
        log: Arc<dyn TextPanel>,
        results: Arc<dyn TextPanel>,
        modal: Arc<dyn ModalSurface>,
    ) -> Self {
        Self { log, results, modal }
    }

    pub fn show_log(&self, text: &str) {
        self.log.set_text(text);
    }

    pub fn show_results(&self, summary: &str) {
        self.results.set_text(summary);
    }

    pub fn notify_status(&self, messages: &[String]) {
        self.modal
            .show(RESULT_MODAL_TITLE, &join_status_messages(messages));
    }

    pub fn notify_failure(&self, error: &str) {
        self.modal.show(FAILURE_MODAL_TITLE, &escape_html(error));
    }
}
