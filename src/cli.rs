//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::build_data_port;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::StockcastError;
use crate::domain::summary::{get_summary_between, Summary};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "stockcast", about = "Daily indicators and next-day close forecast")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the JSON summary for one symbol
    Predict {
        #[arg(long)]
        symbol: String,
        /// First date to fetch (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        start: NaiveDate,
        /// Last date to fetch (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date)]
        end: Option<NaiveDate>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Read <DATA_DIR>/<SYMBOL>.csv instead of the configured source
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Start the HTTP API
    Serve {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Listen address, overrides [server] listen
        #[arg(long)]
        listen: Option<String>,
    },
}

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}' (expected YYYY-MM-DD)", s))
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Predict {
            symbol,
            start,
            end,
            config,
            data_dir,
        } => run_predict(&symbol, start, end, config.as_ref(), data_dir.as_deref()),
        Command::Serve { config, listen } => run_serve(config.as_ref(), listen.as_deref()),
    }
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, StockcastError> {
    match path {
        Some(p) => FileConfigAdapter::from_file(p),
        None => Ok(FileConfigAdapter::empty()),
    }
}

/// `RUST_LOG` wins; otherwise `[log] filter`, otherwise `info`.
pub fn init_tracing(config: &dyn ConfigPort) {
    let fallback = config
        .get_string("log", "filter")
        .unwrap_or_else(|| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn resolve_data_port(
    config: &dyn ConfigPort,
    data_dir: Option<&Path>,
) -> Result<Box<dyn DataPort + Send + Sync>, StockcastError> {
    match data_dir {
        Some(dir) => Ok(Box::new(CsvAdapter::new(dir.to_path_buf()))),
        None => build_data_port(config),
    }
}

/// Summary for `symbol` over `[start, end]` (end defaults to today).
pub fn predict_summary(
    config: &dyn ConfigPort,
    data_dir: Option<&Path>,
    symbol: &str,
    start: NaiveDate,
    end: Option<NaiveDate>,
) -> Result<Summary, StockcastError> {
    let data_port = resolve_data_port(config, data_dir)?;
    let end = end.unwrap_or_else(|| chrono::Local::now().date_naive());
    Ok(get_summary_between(data_port.as_ref(), symbol, start, end))
}

pub fn exit_code_for(summary: &Summary) -> ExitCode {
    match summary.error_kind() {
        None => ExitCode::SUCCESS,
        Some(kind) => kind.into(),
    }
}

fn run_predict(
    symbol: &str,
    start: NaiveDate,
    end: Option<NaiveDate>,
    config_path: Option<&PathBuf>,
    data_dir: Option<&Path>,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    init_tracing(&config);

    let summary = match predict_summary(&config, data_dir, symbol, start, end) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "predict failed");
            return (&e).into();
        }
    };

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize summary");
            return ExitCode::from(1);
        }
    }
    exit_code_for(&summary)
}

#[cfg(feature = "web")]
pub fn resolve_listen(
    config: &dyn ConfigPort,
    listen_override: Option<&str>,
) -> Result<std::net::SocketAddr, StockcastError> {
    use crate::adapters::web::DEFAULT_LISTEN;

    let raw = listen_override
        .map(str::to_string)
        .or_else(|| config.get_string("server", "listen"))
        .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
    raw.parse().map_err(|_| StockcastError::ConfigInvalid {
        section: "server".into(),
        key: "listen".into(),
        reason: format!("invalid socket address '{}'", raw),
    })
}

fn run_serve(config_path: Option<&PathBuf>, listen_override: Option<&str>) -> ExitCode {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{build_router, serve, AppState};
        use std::sync::Arc;

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };
        init_tracing(&config);

        let addr = match resolve_listen(&config, listen_override) {
            Ok(a) => a,
            Err(e) => {
                tracing::error!(error = %e, "invalid listen address");
                return (&e).into();
            }
        };

        // Built before the runtime starts: the Yahoo client is blocking.
        let data_port: Arc<dyn DataPort + Send + Sync> = match build_data_port(&config) {
            Ok(p) => Arc::from(p),
            Err(e) => {
                tracing::error!(error = %e, "failed to build data source");
                return (&e).into();
            }
        };

        let permissive_cors = config.get_bool("server", "permissive_cors", true);
        // This handle outlives the runtime so the client is never dropped inside it.
        let router = build_router(
            AppState {
                data_port: Arc::clone(&data_port),
            },
            permissive_cors,
        );

        let runtime = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                let err = StockcastError::Io(e);
                tracing::error!(error = %err, "failed to start runtime");
                return (&err).into();
            }
        };

        let result = runtime.block_on(serve(router, addr));
        drop(runtime);
        drop(data_port);

        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                let err = StockcastError::Io(e);
                tracing::error!(error = %err, "server failed");
                (&err).into()
            }
        }
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = (config_path, listen_override);
        eprintln!("error: web feature is required for serve");
        ExitCode::from(1)
    }
}
