//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

use crate::adapters::cached_adapter::{CachedDataPort, EvictionPolicy};
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::dashboard_view::{DashboardView, ViewOptions};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_report_adapter::HtmlReportAdapter;
use crate::domain::config_validation::validate_config;
use crate::domain::error::StockdashError;
use crate::domain::metrics::{MetricsConfig, build_series, compute_metrics};
use crate::domain::query::{DEFAULT_SYMBOL, PriceQuery};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

#[derive(Parser, Debug)]
#[command(name = "stockdash", about = "Daily stock price dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the web dashboard
    Serve {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Fetch one symbol, print its latest rows and summary statistics
    Analyze {
        #[arg(long)]
        symbol: String,
        /// First day, YYYY-MM-DD (default: one year before --end)
        #[arg(long)]
        start: Option<String>,
        /// Last day, YYYY-MM-DD (default: today)
        #[arg(long)]
        end: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Also write the HTML dashboard to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Serve { config } => run_serve(config.as_ref()),
        Command::Analyze {
            symbol,
            start,
            end,
            config,
            output,
        } => run_analyze(
            &symbol,
            start.as_deref(),
            end.as_deref(),
            config.as_ref(),
            output.as_deref(),
        ),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = StockdashError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        fail(&err)
    })
}

/// Loads and validates the config, or an empty one when no path is given.
fn load_checked_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    let config = match path {
        Some(p) => {
            info!(path = %p.display(), "loading config");
            load_config(p)?
        }
        None => FileConfigAdapter::empty(),
    };
    validate_config(&config).map_err(|e| fail(&e))?;
    Ok(config)
}

fn fail(err: &StockdashError) -> ExitCode {
    error!(error = %err, "command failed");
    eprintln!("error: {err}");
    err.into()
}

/// The upstream adapter named by `[data] provider`.
pub fn build_data_port(
    config: &dyn ConfigPort,
) -> Result<Box<dyn DataPort + Send + Sync>, StockdashError> {
    let provider = config
        .get_string("data", "provider")
        .unwrap_or_else(|| "yahoo".to_string());

    match provider.trim().to_lowercase().as_str() {
        "csv" => {
            let dir = config
                .get_string("data", "csv_dir")
                .ok_or_else(|| StockdashError::ConfigMissing {
                    section: "data".into(),
                    key: "csv_dir".into(),
                })?;
            Ok(Box::new(CsvAdapter::new(PathBuf::from(dir))))
        }
        #[cfg(feature = "yahoo")]
        "yahoo" => Ok(Box::new(
            crate::adapters::yahoo_adapter::YahooAdapter::from_config(config)?,
        )),
        #[cfg(not(feature = "yahoo"))]
        "yahoo" => Err(StockdashError::ConfigInvalid {
            section: "data".into(),
            key: "provider".into(),
            reason: "built without the yahoo feature".into(),
        }),
        other => Err(StockdashError::ConfigInvalid {
            section: "data".into(),
            key: "provider".into(),
            reason: format!("unknown provider '{}'", other),
        }),
    }
}

/// The configured provider behind the fetch cache.
pub fn build_cached_port(
    config: &dyn ConfigPort,
) -> Result<CachedDataPort<Box<dyn DataPort + Send + Sync>>, StockdashError> {
    let inner = build_data_port(config)?;
    let policy = EvictionPolicy::from_config(config)?;
    info!(provider = inner.name(), ?policy, "fetch cache ready");
    Ok(CachedDataPort::new(inner, policy))
}

pub fn default_symbol(config: &dyn ConfigPort) -> String {
    config
        .get_string("dashboard", "default_symbol")
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SYMBOL.to_string())
}

pub fn resolve_query(
    symbol: &str,
    start: Option<&str>,
    end: Option<&str>,
    config: &dyn ConfigPort,
    today: NaiveDate,
) -> Result<PriceQuery, StockdashError> {
    PriceQuery::from_parts(Some(symbol), start, end, &default_symbol(config), today)
}

/// Fetches and augments `query`, returning the text report. An empty
/// result is reported as [`StockdashError::InvalidSymbol`].
pub fn analyze(
    data: &dyn DataPort,
    config: &dyn ConfigPort,
    query: &PriceQuery,
    output: Option<&Path>,
) -> Result<String, StockdashError> {
    let metrics = MetricsConfig::from_config(config)?;
    let options = ViewOptions::from_config(config)?;

    info!(
        symbol = %query.symbol,
        start = %query.start,
        end = %query.end,
        provider = data.name(),
        "analyzing"
    );
    let series = build_series(&query.symbol, data.fetch_daily(query)?)?;
    if series.is_empty() {
        return Err(StockdashError::InvalidSymbol {
            symbol: query.symbol.clone(),
        });
    }

    let augmented = compute_metrics(&series, &metrics);
    let view = DashboardView::build(query, &augmented, &options);

    if let Some(path) = output {
        HtmlReportAdapter::new(options)
            .with_source(data.source())
            .write(query, &augmented, &path.to_string_lossy())?;
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} from {} to {} ({} rows)\n",
        query.symbol,
        query.start,
        query.end,
        series.len()
    );
    out.push_str(&format_tail_table(&view));
    out.push('\n');
    out.push_str(&format_summary_table(&view));
    Ok(out)
}

fn format_table(headers: &[&str], rows: &[Vec<&str>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let line = |cells: &[&str], out: &mut String| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, &w))| {
                let pad = w.saturating_sub(cell.chars().count());
                if i == 0 {
                    format!("{}{}", cell, " ".repeat(pad))
                } else {
                    format!("{}{}", " ".repeat(pad), cell)
                }
            })
            .collect();
        let _ = writeln!(out, "{}", padded.join("  ").trim_end());
    };

    line(headers, &mut out);
    for row in rows {
        line(row.as_slice(), &mut out);
    }
    out
}

pub fn format_tail_table(view: &DashboardView) -> String {
    let headers = [
        "Date",
        "Open",
        "High",
        "Low",
        "Close",
        "Volume",
        view.sma_short_label.as_str(),
        view.sma_long_label.as_str(),
        "Daily Return",
        "Volatility",
    ];
    let rows: Vec<Vec<&str>> = view
        .tail
        .iter()
        .map(|r| {
            vec![
                r.date.as_str(),
                r.open.as_str(),
                r.high.as_str(),
                r.low.as_str(),
                r.close.as_str(),
                r.volume.as_str(),
                r.sma_short.as_str(),
                r.sma_long.as_str(),
                r.daily_return.as_str(),
                r.volatility.as_str(),
            ]
        })
        .collect();
    format_table(&headers, &rows)
}

pub fn format_summary_table(view: &DashboardView) -> String {
    let headers = ["", "count", "mean", "std", "min", "25%", "50%", "75%", "max"];
    let rows: Vec<Vec<&str>> = view
        .summary
        .iter()
        .map(|r| {
            vec![
                r.name.as_str(),
                r.count.as_str(),
                r.mean.as_str(),
                r.std.as_str(),
                r.min.as_str(),
                r.q25.as_str(),
                r.median.as_str(),
                r.q75.as_str(),
                r.max.as_str(),
            ]
        })
        .collect();
    format_table(&headers, &rows)
}

fn run_analyze(
    symbol: &str,
    start: Option<&str>,
    end: Option<&str>,
    config_path: Option<&PathBuf>,
    output: Option<&Path>,
) -> ExitCode {
    let config = match load_checked_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let query = match resolve_query(symbol, start, end, &config, Local::now().date_naive()) {
        Ok(q) => q,
        Err(e) => return fail(&e),
    };

    let data = match build_data_port(&config) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };

    match analyze(data.as_ref(), &config, &query, output) {
        Ok(report) => {
            print!("{report}");
            if let Some(path) = output {
                eprintln!("Report written to {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) if e.is_empty_state() => {
            eprintln!(
                "No data found for {} between {} and {}",
                query.symbol, query.start, query.end
            );
            (&e).into()
        }
        Err(e) => fail(&e),
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_config(&config) {
        return fail(&e);
    }

    eprintln!("Configuration is valid.");
    ExitCode::SUCCESS
}

/// Shared state for the web server, built from the config.
#[cfg(feature = "web")]
pub fn build_app_state(
    config: &dyn ConfigPort,
) -> Result<crate::adapters::web::AppState, StockdashError> {
    Ok(crate::adapters::web::AppState {
        data: std::sync::Arc::new(build_cached_port(config)?),
        metrics: MetricsConfig::from_config(config)?,
        view: ViewOptions::from_config(config)?,
        default_symbol: default_symbol(config),
    })
}

fn run_serve(config_path: Option<&PathBuf>) -> ExitCode {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::serve;

        let config = match load_checked_config(config_path) {
            Ok(c) => c,
            Err(code) => return code,
        };

        let state = match build_app_state(&config) {
            Ok(s) => s,
            Err(e) => return fail(&e),
        };
        let listen = config
            .get_string("web", "listen")
            .unwrap_or_else(|| DEFAULT_LISTEN.to_string());

        eprintln!("Starting web server on {}", listen);

        let runtime = match tokio::runtime::Runtime::new() {
            Ok(r) => r,
            Err(e) => return fail(&StockdashError::Io(e)),
        };

        match runtime.block_on(serve(state, &listen)) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(&e),
        }
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config_path;
        eprintln!("error: web feature is required for serve");
        ExitCode::from(1)
    }
}
