use std::path::PathBuf;
use std::sync::Arc;

use backtest_desk::channel::OverlayFlag;
use backtest_desk::config::AppConfig;
use backtest_desk::document::{DirFileSaver, LoadOutcome, MemoryEditor, PathFilePicker};
use backtest_desk::selector::SelectionOutcome;
use backtest_desk::views::{ConsoleDropdown, ConsoleModal, ConsolePanel, MemoryChart, MemoryChartRegistry};
use backtest_desk::{Desk, Surfaces};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "backtest_desk", about = "Drive a remote strategy backtesting service")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, default_value = "config.yaml")]
    config: String,

    /// Override the service base URL
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a strategy file and run a backtest with it
    Run {
        file: PathBuf,
        /// Also print the chart annotations as JSON
        #[arg(long)]
        annotations: bool,
    },
    /// List the chart data files offered by the service
    Catalog,
    /// Load chart data for a data file code (e.g. EUR_03P20230101)
    ChartData { code: String },
    /// Load a strategy file and save it under the default strategy filename
    Save {
        file: PathBuf,
        /// Target directory (defaults to `save_dir` from the config)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Setup Logging
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::resolve(&cli.config, cli.base_url.clone())?;
    info!("Loaded Configuration: base_url={} single_flight={:?}", config.base_url, config.single_flight);

    let save_dir = match &cli.command {
        Command::Save { out: Some(dir), .. } => dir.clone(),
        _ => PathBuf::from(&config.save_dir),
    };

    let charts = MemoryChartRegistry::new();
    let chart = Arc::new(MemoryChart::new(config.chart_id.clone()));
    charts.register(chart.clone());

    let surfaces = Surfaces {
        editor: Arc::new(MemoryEditor::default()),
        overlay: Arc::new(OverlayFlag::default()),
        charts: Arc::new(charts),
        log: Arc::new(ConsolePanel::new("Log")),
        results: Arc::new(ConsolePanel::new("Results")),
        modal: Arc::new(ConsoleModal),
        saver: Arc::new(DirFileSaver::new(save_dir)),
    };
    let desk = Desk::build(&config, surfaces)?;

    match cli.command {
        Command::Run { file, annotations } => {
            let picker = PathFilePicker::new(Some(file));
            if let LoadOutcome::Cancelled = desk.documents.load_from_file(&picker).await? {
                return Ok(());
            }

            if let Err(e) = desk.channel.prime_session().await {
                warn!("⚠️ Could not prime session cookies: {}", e);
            }

            desk.session.run_from_editor().await?;

            if annotations {
                let events = chart.snapshot().stock_events;
                println!("{}", serde_json::to_string_pretty(&events)?);
            }
        }
        Command::Catalog => {
            desk.selector.load_catalog(&ConsoleDropdown).await?;
        }
        Command::ChartData { code } => {
            if let Err(e) = desk.channel.prime_session().await {
                warn!("⚠️ Could not prime session cookies: {}", e);
            }

            match desk.selector.on_select(&code).await? {
                SelectionOutcome::Ignored => info!("'{}' is not a chart data code", code),
                SelectionOutcome::NoData => info!("No chart data for '{}'", code),
                SelectionOutcome::Applied { points } => {
                    println!("{} data point(s) loaded for {}", points, code);
                }
            }
        }
        Command::Save { file, .. } => {
            let picker = PathFilePicker::new(Some(file));
            if let LoadOutcome::Loaded(_) = desk.documents.load_from_file(&picker).await? {
                desk.documents.save_current();
            }
        }
    }

    Ok(())
}
