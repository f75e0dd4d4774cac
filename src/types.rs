//! Domain and wire types shared across the desk.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy script text. Never interpreted client-side.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StrategySource(String);

impl StrategySource {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for StrategySource {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for StrategySource {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

/// Side of a trade. Anything the engine reports other than `BUY` is drawn as
/// a sale; the raw value is kept so the log shows what was actually sent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuySell {
    Buy,
    Sell,
    Other(String),
}

impl BuySell {
    pub fn is_buy(&self) -> bool {
        matches!(self, BuySell::Buy)
    }
}

impl From<String> for BuySell {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "BUY" => BuySell::Buy,
            "SELL" => BuySell::Sell,
            _ => BuySell::Other(raw),
        }
    }
}

impl From<BuySell> for String {
    fn from(side: BuySell) -> Self {
        side.to_string()
    }
}

impl fmt::Display for BuySell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuySell::Buy => f.write_str("BUY"),
            BuySell::Sell => f.write_str("SELL"),
            BuySell::Other(raw) => f.write_str(raw),
        }
    }
}

/// One executed trade reported by the backtest engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    /// Timestamp as formatted by the server; shown verbatim.
    pub date: String,
    pub instrument: String,
    pub buysell: BuySell,
    pub price: Decimal,
}

/// Where an annotation is pinned on its bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    High,
}

impl Anchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Anchor::High => "high",
        }
    }
}

/// Chart marker derived from a single [`TradeEvent`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChartAnnotation {
    pub date: String,
    pub display_text: String,
    pub color: String,
    pub graph: String,
    pub anchor: Anchor,
}

/// Normalized response of one backtest run. Replaced wholesale on every run.
#[derive(Clone, Debug, PartialEq)]
pub struct BacktestResult {
    pub status_messages: Vec<String>,
    pub trade_events: Vec<TradeEvent>,
    pub summary: String,
}

/// Raw `beginBacktest` payload.
#[derive(Debug, Deserialize)]
pub(crate) struct BacktestResponse {
    pub message: BacktestMessage,
    pub statusmessages: Vec<String>,
    pub results: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BacktestMessage {
    #[serde(rename = "buySellHistory")]
    pub buy_sell_history: Vec<TradeEvent>,
}

impl From<BacktestResponse> for BacktestResult {
    fn from(raw: BacktestResponse) -> Self {
        Self {
            status_messages: raw.statusmessages,
            trade_events: raw.message.buy_sell_history,
            summary: raw.results,
        }
    }
}

/// Chart data file offered in the selection list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvEntry {
    pub file: String,
    pub title: String,
}
