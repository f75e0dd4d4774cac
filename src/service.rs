use async_trait::async_trait;
use serde_json::Value;

use crate::channel::RequestChannel;
use crate::constants::endpoints;
use crate::error::ChannelError;
use crate::types::StrategySource;

/// Remote backtest service. Responses are returned undecoded; callers own the
/// shape checks.
#[async_trait]
pub trait BacktestService: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run `source` on the server and return the raw result payload.
    async fn begin_backtest(&self, source: &StrategySource) -> Result<Value, ChannelError>;

    /// Price series for a chart data file, or `null`.
    async fn request_chart_data(&self, selected: &str) -> Result<Value, ChannelError>;

    /// Available chart data files.
    async fn load_chart_catalog(&self) -> Result<Value, ChannelError>;
}

#[derive(Clone)]
pub struct HttpBacktestService {
    channel: RequestChannel,
}

impl HttpBacktestService {
    pub fn new(channel: RequestChannel) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &RequestChannel {
        &self.channel
    }
}

#[async_trait]
impl BacktestService for HttpBacktestService {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn begin_backtest(&self, source: &StrategySource) -> Result<Value, ChannelError> {
        self.channel
            .post_form(
                endpoints::BEGIN_BACKTEST,
                &[(endpoints::STRATEGY_FIELD, source.as_str())],
            )
            .await
    }

    async fn request_chart_data(&self, selected: &str) -> Result<Value, ChannelError> {
        self.channel
            .post_form(
                endpoints::REQUEST_CHART_DATA,
                &[(endpoints::SELECTED_DATA_FIELD, selected)],
            )
            .await
    }

    async fn load_chart_catalog(&self) -> Result<Value, ChannelError> {
        self.channel.get(endpoints::LOAD_CHART_DATA_CSV).await
    }
}
