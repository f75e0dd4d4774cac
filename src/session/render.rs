//! Mapping of trade events into chart annotations and log text.

use serde_json::Value;
use tracing::warn;

use crate::config::AnnotationStyle;
use crate::error::BacktestError;
use crate::types::{Anchor, BacktestResponse, BacktestResult, BuySell, ChartAnnotation, TradeEvent};

pub fn to_annotation(event: &TradeEvent, style: &AnnotationStyle) -> ChartAnnotation {
    let (label, color) = if event.buysell.is_buy() {
        ("Buy", &style.buy_color)
    } else {
        if let BuySell::Other(raw) = &event.buysell {
            warn!("⚠️ [SESSION] Unexpected trade side '{}' drawn as a sale", raw);
        }
        ("Sell", &style.sell_color)
    };
    ChartAnnotation {
        date: event.date.clone(),
        display_text: format!("{} @ {}", label, event.price),
        color: color.clone(),
        graph: style.graph.clone(),
        anchor: Anchor::High,
    }
}

/// One annotation per event, in input order.
pub fn build_annotations(events: &[TradeEvent], style: &AnnotationStyle) -> Vec<ChartAnnotation> {
    events.iter().map(|e| to_annotation(e, style)).collect()
}

pub fn format_log_line(event: &TradeEvent) -> String {
    format!(
        " > {} - {} - {} - {} \n",
        event.buysell, event.price, event.instrument, event.date
    )
}

/// Log text with one line per event, in input order.
pub fn build_log_lines(events: &[TradeEvent]) -> String {
    events.iter().map(format_log_line).collect()
}

/// Check the `beginBacktest` payload and normalize it.
pub fn parse_backtest_response(raw: Value) -> Result<BacktestResult, BacktestError> {
    serde_json::from_value::<BacktestResponse>(raw)
        .map(BacktestResult::from)
        .map_err(|e| BacktestError::MalformedResponse(e.to_string()))
}
