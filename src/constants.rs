//! Application-wide constants
//!
//! Endpoint paths, header names and fixed file properties shared by the
//! channel, the session and the document source.

/// Remote service endpoints, relative to the configured base URL
pub mod endpoints {
    pub const BEGIN_BACKTEST: &str = "ajax/beginBacktest/";
    pub const REQUEST_CHART_DATA: &str = "ajax/requestChartData/";
    pub const LOAD_CHART_DATA_CSV: &str = "ajax/loadChartDataCsv/";

    /// Form field names
    pub const STRATEGY_FIELD: &str = "strategy";
    pub const SELECTED_DATA_FIELD: &str = "selectedData";
}

/// Request channel constants
pub mod channel {
    pub const CSRF_HEADER: &str = "X-CSRFToken";
    pub const DEFAULT_CSRF_COOKIE: &str = "csrftoken";

    /// The remote service only answers requests flagged as AJAX
    pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";
    pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

    /// Methods exempt from CSRF protection
    pub const SAFE_METHODS: [&str; 4] = ["GET", "HEAD", "OPTIONS", "TRACE"];

    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
    pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Error bodies (e.g. debug pages) are cut to this many characters
    pub const MAX_ERROR_BODY_CHARS: usize = 512;
}

/// Strategy document constants
pub mod document {
    pub const DEFAULT_FILENAME: &str = "Strategy.py";
    pub const SAVE_MIME: &str = "text/plain;charset=utf-8";
    pub const EXPECTED_DATA_URL_PREFIX: &str = "data:text/plain;base64,";
}

/// Chart and view constants
pub mod views {
    pub const DEFAULT_CHART_ID: &str = "chartdiv";
    pub const DEFAULT_GRAPH_ID: &str = "g1";
    pub const DEFAULT_ANNOTATION_COLOR: &str = "#CC0000";

    pub const RESULT_MODAL_TITLE: &str = "Strategy execution result";
    pub const FAILURE_MODAL_TITLE: &str = "Strategy execution failed";
    pub const STATUS_LINE_BREAK: &str = "<br>";
}

/// Capacity of the session event bus
pub const SESSION_BUS_CAPACITY: usize = 64;
