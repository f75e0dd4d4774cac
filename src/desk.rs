//! Wiring of the page collaborators into a ready-to-use desk.

use std::sync::Arc;
use tracing::info;

use crate::channel::{seeded_jar, BusyIndicator, BusyOverlay, RequestChannel};
use crate::config::AppConfig;
use crate::document::{EditorSource, FileSaver, StrategyDocuments};
use crate::selector::ChartDataSelector;
use crate::service::{BacktestService, HttpBacktestService};
use crate::session::BacktestSession;
use crate::views::{ChartRegistry, ChartSink, ModalSurface, ResultViews, TextPanel};

/// Page-side collaborators the desk drives.
#[derive(Clone)]
pub struct Surfaces {
    pub editor: Arc<dyn EditorSource>,
    pub overlay: Arc<dyn BusyOverlay>,
    pub charts: Arc<dyn ChartRegistry>,
    pub log: Arc<dyn TextPanel>,
    pub results: Arc<dyn TextPanel>,
    pub modal: Arc<dyn ModalSurface>,
    pub saver: Arc<dyn FileSaver>,
}

pub struct Desk {
    pub channel: RequestChannel,
    pub documents: StrategyDocuments,
    pub session: BacktestSession,
    pub selector: ChartDataSelector,
}

impl Desk {
    pub fn build(config: &AppConfig, surfaces: Surfaces) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        config.validate()?;

        let base_url = config.base_url()?;
        let jar = seeded_jar(config.channel.cookies.as_deref(), &base_url);
        let busy = BusyIndicator::new(surfaces.overlay.clone());
        let channel = RequestChannel::new(base_url, &config.channel, jar, busy)?;
        info!("🔌 [DESK] Remote service at {}", channel.base_url());

        let service: Arc<dyn BacktestService> = Arc::new(HttpBacktestService::new(channel.clone()));
        let chart = ChartSink::new(surfaces.charts.clone());

        let documents = StrategyDocuments::new(
            surfaces.editor.clone(),
            surfaces.saver.clone(),
            config.default_filename.clone(),
        );
        let session = BacktestSession::new(
            service.clone(),
            surfaces.editor.clone(),
            chart.clone(),
            ResultViews::new(surfaces.log, surfaces.results, surfaces.modal),
            config,
        );
        let selector = ChartDataSelector::new(service, chart, config.chart_id.clone());

        Ok(Self {
            channel,
            documents,
            session,
            selector,
        })
    }
}
