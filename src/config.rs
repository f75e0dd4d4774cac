use serde::Deserialize;
use std::fs;
use std::io;
use std::time::Duration;
use url::Url;

use crate::constants::{channel, document, views};
use crate::error::ConfigError;

/// Environment variable that overrides `base_url` from the config file.
pub const BASE_URL_ENV: &str = "BACKTEST_DESK_BASE_URL";

/// What a second backtest submission does while one is still in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SingleFlightPolicy {
    /// Refuse the second submission with `BacktestError::AlreadyRunning`.
    #[default]
    Reject,
    /// Wait for the running backtest to finish, then run (FIFO).
    Queue,
}

/// Colors and graph binding for trade annotations.
///
/// BUY and SELL share the same color by default; this reproduces what the
/// page has always rendered until product decides otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AnnotationStyle {
    #[serde(default = "default_graph")]
    pub graph: String,
    #[serde(default = "default_annotation_color")]
    pub buy_color: String,
    #[serde(default = "default_annotation_color")]
    pub sell_color: String,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            graph: default_graph(),
            buy_color: default_annotation_color(),
            sell_color: default_annotation_color(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChannelConfig {
    #[serde(default = "default_csrf_cookie")]
    pub csrf_cookie: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Raw `Cookie` header to seed the cookie store with (e.g. a copied session).
    #[serde(default)]
    pub cookies: Option<String>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            csrf_cookie: default_csrf_cookie(),
            request_timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            cookies: None,
        }
    }
}

impl ChannelConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// Root of the web application; endpoint paths are joined onto it.
    pub base_url: String,

    #[serde(default)]
    pub channel: ChannelConfig,

    #[serde(default)]
    pub single_flight: SingleFlightPolicy,

    #[serde(default = "default_chart_id")]
    pub chart_id: String,

    #[serde(default)]
    pub annotations: AnnotationStyle,

    #[serde(default = "default_filename")]
    pub default_filename: String,

    #[serde(default = "default_save_dir")]
    pub save_dir: String,
}

impl AppConfig {
    pub fn load(config_path: &str) -> Result<Self, ConfigError> {
        let mut config = Self::read(config_path)?;
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        config.validate()?;
        Ok(config)
    }

    /// Config for the CLI. Precedence for the base URL is flag, then
    /// `BACKTEST_DESK_BASE_URL`, then the file. A missing file falls back to
    /// defaults only when one of the other two supplies a base URL.
    pub fn resolve(config_path: &str, base_url: Option<String>) -> Result<Self, ConfigError> {
        Self::resolve_with_env(config_path, base_url, std::env::var(BASE_URL_ENV).ok())
    }

    pub(crate) fn resolve_with_env(
        config_path: &str,
        flag_url: Option<String>,
        env_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match Self::read(config_path) {
            Ok(config) => config,
            Err(ConfigError::Read { source, .. })
                if source.kind() == io::ErrorKind::NotFound
                    && (flag_url.is_some() || env_url.is_some()) =>
            {
                Self::with_base_url(String::new())
            }
            Err(e) => return Err(e),
        };

        if let Some(url) = flag_url.or(env_url) {
            config.base_url = url;
        }
        config.validate()?;
        Ok(config)
    }

    fn read(config_path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // Strip BOM if present
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let config: AppConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Config with defaults everywhere except the service location.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            channel: ChannelConfig::default(),
            single_flight: SingleFlightPolicy::default(),
            chart_id: default_chart_id(),
            annotations: AnnotationStyle::default(),
            default_filename: default_filename(),
            save_dir: default_save_dir(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        if self.channel.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "channel.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.chart_id.trim().is_empty() {
            return Err(ConfigError::Invalid("chart_id must not be empty".to_string()));
        }
        if self.default_filename.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_filename must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Parsed base URL, always ending with `/` so relative endpoints join under it.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw)
            .map_err(|e| ConfigError::Invalid(format!("base_url '{}': {}", self.base_url, e)))?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::Invalid(format!(
                "base_url '{}' cannot be used as a base",
                self.base_url
            )));
        }
        Ok(url)
    }
}

fn default_graph() -> String {
    views::DEFAULT_GRAPH_ID.to_string()
}

fn default_annotation_color() -> String {
    views::DEFAULT_ANNOTATION_COLOR.to_string()
}

fn default_csrf_cookie() -> String {
    channel::DEFAULT_CSRF_COOKIE.to_string()
}

fn default_timeout_secs() -> u64 {
    channel::DEFAULT_TIMEOUT_SECS
}

fn default_connect_timeout_secs() -> u64 {
    channel::DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_chart_id() -> String {
    views::DEFAULT_CHART_ID.to_string()
}

fn default_filename() -> String {
    document::DEFAULT_FILENAME.to_string()
}

fn default_save_dir() -> String {
    ".".to_string()
}
