//! Chart registry and the chart sink that writes annotations and data into it.

use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

use super::escape::escape_html;
use crate::types::ChartAnnotation;

/// Event record in the shape the stock chart consumes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockEvent {
    pub date: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(rename = "backGroundColor")]
    pub background_color: String,
    pub graph: String,
    /// Escaped; the chart renders this as markup.
    pub text: String,
    pub show_at: String,
}

impl From<&ChartAnnotation> for StockEvent {
    fn from(annotation: &ChartAnnotation) -> Self {
        Self {
            date: annotation.date.clone(),
            event_type: "text".to_string(),
            background_color: annotation.color.clone(),
            graph: annotation.graph.clone(),
            text: escape_html(&annotation.display_text),
            show_at: annotation.anchor.as_str().to_string(),
        }
    }
}

/// A chart instance owned by the page.
pub trait ChartSeries: Send + Sync {
    fn id(&self) -> &str;
    /// Replace the primary data set.
    fn set_data_provider(&self, points: Vec<Value>);
    /// Replace the overlay events.
    fn set_stock_events(&self, events: Vec<StockEvent>);
    /// Re-read the data provider.
    fn validate_data(&self);
    /// Full redraw.
    fn validate_now(&self);
}

/// Lookup of charts by id. The desk never owns the charts it finds.
pub trait ChartRegistry: Send + Sync {
    fn find(&self, id: &str) -> Option<Arc<dyn ChartSeries>>;
}

#[derive(Clone, Default)]
pub struct MemoryChartRegistry {
    charts: Arc<DashMap<String, Arc<dyn ChartSeries>>>,
}

impl MemoryChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, chart: Arc<dyn ChartSeries>) {
        self.charts.insert(chart.id().to_string(), chart);
    }

    pub fn unregister(&self, id: &str) {
        self.charts.remove(id);
    }
}

impl ChartRegistry for MemoryChartRegistry {
    fn find(&self, id: &str) -> Option<Arc<dyn ChartSeries>> {
        self.charts.get(id).map(|entry| Arc::clone(entry.value()))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChartSnapshot {
    pub data_provider: Vec<Value>,
    pub stock_events: Vec<StockEvent>,
    pub data_validations: usize,
    pub redraws: usize,
}

/// Chart that keeps its state in memory.
#[derive(Debug)]
pub struct MemoryChart {
    id: String,
    state: Mutex<ChartSnapshot>,
}

impl MemoryChart {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Mutex::new(ChartSnapshot::default()),
        }
    }

    pub fn snapshot(&self) -> ChartSnapshot {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn with_state(&self, f: impl FnOnce(&mut ChartSnapshot)) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state);
    }
}

impl ChartSeries for MemoryChart {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_data_provider(&self, points: Vec<Value>) {
        self.with_state(|s| s.data_provider = points);
    }

    fn set_stock_events(&self, events: Vec<StockEvent>) {
        self.with_state(|s| s.stock_events = events);
    }

    fn validate_data(&self) {
        self.with_state(|s| s.data_validations += 1);
    }

    fn validate_now(&self) {
        self.with_state(|s| s.redraws += 1);
    }
}

#[derive(Clone)]
pub struct ChartSink {
    registry: Arc<dyn ChartRegistry>,
}

impl ChartSink {
    pub fn new(registry: Arc<dyn ChartRegistry>) -> Self {
        Self { registry }
    }

    /// Replace the chart's overlay events with `annotations` and redraw it fully.
    pub fn apply_annotations(&self, series_id: &str, annotations: &[ChartAnnotation]) {
        let Some(chart) = self.find(series_id) else {
            return;
        };
        let events: Vec<StockEvent> = annotations.iter().map(StockEvent::from).collect();
        info!("📈 [CHART] {} annotation(s) on '{}'", events.len(), series_id);
        chart.set_stock_events(events);
        chart.validate_now();
    }

    /// Replace the chart's primary data set and revalidate it.
    pub fn replace_data(&self, series_id: &str, points: Vec<Value>) {
        let Some(chart) = self.find(series_id) else {
            return;
        };
        info!("📈 [CHART] {} data point(s) on '{}'", points.len(), series_id);
        chart.set_data_provider(points);
        chart.validate_data();
    }

    fn find(&self, series_id: &str) -> Option<Arc<dyn ChartSeries>> {
        let chart = self.registry.find(series_id);
        if chart.is_none() {
            warn!("⚠️ [CHART] No chart registered as '{}'", series_id);
        }
        chart
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Anchor;
    use serde_json::json;

    fn annotation(text: &str) -> ChartAnnotation {
        ChartAnnotation {
            date: "2023-01-02".to_string(),
            display_text: text.to_string(),
            color: "#CC0000".to_string(),
            graph: "g1".to_string(),
            anchor: Anchor::High,
        }
    }

    fn sink_with_chart(id: &str) -> (Arc<MemoryChart>, ChartSink) {
        let chart = Arc::new(MemoryChart::new(id));
        let registry = MemoryChartRegistry::new();
        registry.register(chart.clone());
        (chart, ChartSink::new(Arc::new(registry)))
    }

    #[test]
    fn test_stock_event_shape() {
        let event = StockEvent::from(&annotation("Buy @ 1.2345"));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "date": "2023-01-02",
                "type": "text",
                "backGroundColor": "#CC0000",
                "graph": "g1",
                "text": "Buy @ 1.2345",
                "showAt": "high"
            })
        );
    }

    #[test]
    fn test_stock_event_text_is_escaped() {
        let event = StockEvent::from(&annotation("Sell @ <b>1</b>"));
        assert_eq!(event.text, "Sell @ &lt;b&gt;1&lt;/b&gt;");
    }

    #[test]
    fn test_apply_annotations_replaces_wholesale() {
        let (chart, sink) = sink_with_chart("chartdiv");

        sink.apply_annotations("chartdiv", &[annotation("Buy @ 1"), annotation("Sell @ 2")]);
        sink.apply_annotations("chartdiv", &[annotation("Buy @ 3")]);

        let snap = chart.snapshot();
        assert_eq!(snap.stock_events.len(), 1);
        assert_eq!(snap.stock_events[0].text, "Buy @ 3");
        assert_eq!(snap.redraws, 2);
    }

    #[test]
    fn test_apply_annotations_is_idempotent() {
        let (chart, sink) = sink_with_chart("chartdiv");
        let annotations = vec![annotation("Buy @ 1"), annotation("Sell @ 2")];

        sink.apply_annotations("chartdiv", &annotations);
        let once = chart.snapshot().stock_events;
        sink.apply_annotations("chartdiv", &annotations);
        let twice = chart.snapshot().stock_events;

        assert_eq!(once, twice);
    }

    #[test]
    fn test_replace_data_revalidates() {
        let (chart, sink) = sink_with_chart("chartdiv");

        sink.replace_data("chartdiv", vec![json!({"date": "2023-01-02", "close": "1.1"})]);

        let snap = chart.snapshot();
        assert_eq!(snap.data_provider.len(), 1);
        assert_eq!(snap.data_validations, 1);
        assert_eq!(snap.redraws, 0);
    }

    #[test]
    fn test_unknown_chart_is_skipped() {
        let (chart, sink) = sink_with_chart("chartdiv");

        sink.apply_annotations("other", &[annotation("Buy @ 1")]);

        assert_eq!(chart.snapshot(), ChartSnapshot::default());
    }

    #[test]
    fn test_registry_unregister() {
        let registry = MemoryChartRegistry::new();
        registry.register(Arc::new(MemoryChart::new("a")));
        assert!(registry.find("a").is_some());
        registry.unregister("a");
        assert!(registry.find("a").is_none());
    }
}
