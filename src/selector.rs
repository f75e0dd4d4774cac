//! Chart data selector: validates the chosen data file code and loads its
//! price series into the chart.

use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

use crate::error::SelectorError;
use crate::service::BacktestService;
use crate::types::CsvEntry;
use crate::views::{escape_html, ChartSink, DropdownSink, SelectOption};

/// Ticker-like data file code, e.g. `EUR_03P20230101`.
pub const TICKER_PATTERN: &str = r"^[A-Za-z]{3,4}_[0-9]{2,3}[PCpc][0-9]{8}$";

fn ticker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TICKER_PATTERN).expect("regex ticker"))
}

pub fn is_valid_ticker(code: &str) -> bool {
    ticker_regex().is_match(code)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Value did not look like a data file code; nothing was requested.
    Ignored,
    /// The service had no data for the code.
    NoData,
    Applied { points: usize },
}

#[derive(Clone)]
pub struct ChartDataSelector {
    service: Arc<dyn BacktestService>,
    chart: ChartSink,
    chart_id: String,
}

impl ChartDataSelector {
    pub fn new(service: Arc<dyn BacktestService>, chart: ChartSink, chart_id: impl Into<String>) -> Self {
        Self {
            service,
            chart,
            chart_id: chart_id.into(),
        }
    }

    /// Handle a new dropdown value.
    pub async fn on_select(&self, value: &str) -> Result<SelectionOutcome, SelectorError> {
        if !is_valid_ticker(value) {
            debug!("[SELECTOR] Ignoring selection '{}'", value);
            return Ok(SelectionOutcome::Ignored);
        }

        info!("📊 [SELECTOR] Requesting chart values for: {}", value);
        match self.service.request_chart_data(value).await? {
            Value::Null => Ok(SelectionOutcome::NoData),
            Value::Array(points) => {
                let count = points.len();
                self.chart.replace_data(&self.chart_id, points);
                Ok(SelectionOutcome::Applied { points: count })
            }
            other => Err(SelectorError::MalformedResponse(format!(
                "expected an array or null, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Fetch the chart data catalog and append it to `dropdown`.
    pub async fn load_catalog(&self, dropdown: &dyn DropdownSink) -> Result<Vec<SelectOption>, SelectorError> {
        let raw = self.service.load_chart_catalog().await?;
        let entries: Vec<CsvEntry> = serde_json::from_value(raw)
            .map_err(|e| SelectorError::MalformedResponse(e.to_string()))?;

        let options: Vec<SelectOption> = entries
            .iter()
            .map(|entry| SelectOption {
                value: escape_html(&entry.file),
                label: escape_html(&entry.title),
            })
            .collect();

        info!("📊 [SELECTOR] {} chart data file(s) available", options.len());
        dropdown.append_options(&options);
        Ok(options)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
