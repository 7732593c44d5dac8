//! Configuration validation.
//!
//! Checks every section before the dashboard starts serving or analyzing.

use crate::domain::error::StockdashError;
use crate::domain::indicator::StdDevKind;
use crate::ports::config_port::ConfigPort;

const INTEGER_KEYS: &[(&str, &str)] = &[
    ("data", "timeout_secs"),
    ("cache", "max_entries"),
    ("metrics", "sma_short"),
    ("metrics", "sma_long"),
    ("metrics", "volatility_window"),
    ("dashboard", "histogram_bins"),
    ("dashboard", "tail_rows"),
];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), StockdashError> {
    validate_integers(config)?;
    validate_data(config)?;
    validate_cache(config)?;
    validate_metrics(config)?;
    validate_dashboard(config)?;
    validate_web(config)?;
    Ok(())
}

/// `get_int` falls back to its default on a parse failure; present values must parse.
fn validate_integers(config: &dyn ConfigPort) -> Result<(), StockdashError> {
    for &(section, key) in INTEGER_KEYS {
        if let Some(value) = config.get_string(section, key) {
            if value.trim().parse::<i64>().is_err() {
                return Err(StockdashError::ConfigInvalid {
                    section: section.to_string(),
                    key: key.to_string(),
                    reason: format!("'{}' is not an integer", value.trim()),
                });
            }
        }
    }
    Ok(())
}

fn validate_data(config: &dyn ConfigPort) -> Result<(), StockdashError> {
    let provider = config
        .get_string("data", "provider")
        .unwrap_or_else(|| "yahoo".to_string());
    match provider.trim().to_lowercase().as_str() {
        "yahoo" => {}
        "csv" => match config.get_string("data", "csv_dir") {
            Some(dir) if !dir.trim().is_empty() => {}
            _ => {
                return Err(StockdashError::ConfigMissing {
                    section: "data".to_string(),
                    key: "csv_dir".to_string(),
                });
            }
        },
        other => {
            return Err(StockdashError::ConfigInvalid {
                section: "data".to_string(),
                key: "provider".to_string(),
                reason: format!("unknown provider '{}', expected 'yahoo' or 'csv'", other),
            });
        }
    }

    let timeout = config.get_int("data", "timeout_secs", 10);
    if timeout < 1 {
        return Err(StockdashError::ConfigInvalid {
            section: "data".to_string(),
            key: "timeout_secs".to_string(),
            reason: "timeout_secs must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_cache(config: &dyn ConfigPort) -> Result<(), StockdashError> {
    let eviction = config
        .get_string("cache", "eviction")
        .unwrap_or_else(|| "never".to_string());
    match eviction.trim().to_lowercase().as_str() {
        "never" => Ok(()),
        "max_entries" => {
            if config.get_int("cache", "max_entries", 0) < 1 {
                return Err(StockdashError::ConfigInvalid {
                    section: "cache".to_string(),
                    key: "max_entries".to_string(),
                    reason: "max_entries must be at least 1".to_string(),
                });
            }
            Ok(())
        }
        other => Err(StockdashError::ConfigInvalid {
            section: "cache".to_string(),
            key: "eviction".to_string(),
            reason: format!("unknown eviction policy '{}'", other),
        }),
    }
}

fn validate_metrics(config: &dyn ConfigPort) -> Result<(), StockdashError> {
    for key in ["sma_short", "sma_long", "volatility_window"] {
        if config.get_int("metrics", key, 1) < 1 {
            return Err(StockdashError::ConfigInvalid {
                section: "metrics".to_string(),
                key: key.to_string(),
                reason: format!("{} must be at least 1", key),
            });
        }
    }

    if let Some(kind) = config.get_string("metrics", "stddev") {
        if StdDevKind::parse(&kind).is_none() {
            return Err(StockdashError::ConfigInvalid {
                section: "metrics".to_string(),
                key: "stddev".to_string(),
                reason: "stddev must be 'sample' or 'population'".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_dashboard(config: &dyn ConfigPort) -> Result<(), StockdashError> {
    if config.get_int("dashboard", "histogram_bins", 50) < 1 {
        return Err(StockdashError::ConfigInvalid {
            section: "dashboard".to_string(),
            key: "histogram_bins".to_string(),
            reason: "histogram_bins must be at least 1".to_string(),
        });
    }
    if config.get_int("dashboard", "tail_rows", 5) < 0 {
        return Err(StockdashError::ConfigInvalid {
            section: "dashboard".to_string(),
            key: "tail_rows".to_string(),
            reason: "tail_rows must be non-negative".to_string(),
        });
    }
    if let Some(symbol) = config.get_string("dashboard", "default_symbol") {
        if symbol.trim().is_empty() {
            return Err(StockdashError::ConfigInvalid {
                section: "dashboard".to_string(),
                key: "default_symbol".to_string(),
                reason: "default_symbol must not be empty".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_web(config: &dyn ConfigPort) -> Result<(), StockdashError> {
    if let Some(listen) = config.get_string("web", "listen") {
        if listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(StockdashError::ConfigInvalid {
                section: "web".to_string(),
                key: "listen".to_string(),
                reason: format!("'{}' is not a socket address", listen),
            });
        }
    }
    Ok(())
}
