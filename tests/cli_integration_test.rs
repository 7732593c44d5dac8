//! CLI integration tests for the analyze pipeline.
//!
//! Tests cover:
//! - Provider selection from config (build_data_port)
//! - Query resolution and date validation
//! - analyze with MockDataPort: tables, empty state, malformed input
//! - analyze end-to-end over a CSV directory with an HTML report

mod common;

use common::*;
use stockdash::adapters::file_config_adapter::FileConfigAdapter;
use stockdash::cli;
use stockdash::domain::error::StockdashError;
use stockdash::domain::query::PriceQuery;
use stockdash::ports::data_port::DataPort;
use tempfile::TempDir;

fn query(symbol: &str) -> PriceQuery {
    PriceQuery::new(symbol, date(2024, 1, 1), date(2024, 12, 31)).unwrap()
}

mod provider_selection {
    use super::*;

    #[test]
    fn csv_provider_reads_from_configured_dir() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), "AAPL", &generate_bars("2024-01-01", 3, 100.0));
        let ini = format!(
            "[data]\nprovider = csv\ncsv_dir = {}\n",
            dir.path().display()
        );
        let config = FileConfigAdapter::from_string(&ini).unwrap();

        let port = cli::build_data_port(&config).unwrap();
        assert_eq!(port.name(), "csv");
        assert_eq!(port.fetch_daily(&query("AAPL")).unwrap().len(), 3);
    }

    #[test]
    fn csv_provider_without_dir_is_config_missing() {
        let config = FileConfigAdapter::from_string("[data]\nprovider = csv\n").unwrap();
        let err = cli::build_data_port(&config).err().unwrap();
        assert!(matches!(err, StockdashError::ConfigMissing { key, .. } if key == "csv_dir"));
    }

    #[test]
    fn unknown_provider_is_config_invalid() {
        let config = FileConfigAdapter::from_string("[data]\nprovider = bloomberg\n").unwrap();
        let err = cli::build_data_port(&config).err().unwrap();
        assert!(matches!(err, StockdashError::ConfigInvalid { key, .. } if key == "provider"));
    }

    #[test]
    fn cached_port_uses_eviction_policy() {
        let dir = TempDir::new().unwrap();
        let ini = format!(
            "[data]\nprovider = csv\ncsv_dir = {}\n[cache]\neviction = max_entries\nmax_entries = 2\n",
            dir.path().display()
        );
        let config = FileConfigAdapter::from_string(&ini).unwrap();
        let cached = cli::build_cached_port(&config).unwrap();
        assert_eq!(
            cached.policy(),
            stockdash::adapters::cached_adapter::EvictionPolicy::MaxEntries(2)
        );
    }
}

mod query_resolution {
    use super::*;

    #[test]
    fn explicit_dates_are_used() {
        let config = FileConfigAdapter::empty();
        let q = cli::resolve_query(
            "msft",
            Some("2024-02-01"),
            Some("2024-03-01"),
            &config,
            date(2024, 6, 1),
        )
        .unwrap();
        assert_eq!(q.symbol, "MSFT");
        assert_eq!(q.start, date(2024, 2, 1));
        assert_eq!(q.end, date(2024, 3, 1));
    }

    #[test]
    fn missing_dates_default_to_trailing_year() {
        let config = FileConfigAdapter::empty();
        let q = cli::resolve_query("AAPL", None, None, &config, date(2024, 6, 1)).unwrap();
        assert_eq!(q.start, date(2023, 6, 1));
        assert_eq!(q.end, date(2024, 6, 1));
    }

    #[test]
    fn end_before_start_is_rejected() {
        let config = FileConfigAdapter::empty();
        let err = cli::resolve_query(
            "AAPL",
            Some("2024-03-01"),
            Some("2024-02-01"),
            &config,
            date(2024, 6, 1),
        )
        .unwrap_err();
        assert!(matches!(err, StockdashError::DateRangeInvalid { .. }));
    }

    #[test]
    fn unparsable_date_is_invalid_input() {
        let config = FileConfigAdapter::empty();
        let err = cli::resolve_query("AAPL", Some("01/02/2024"), None, &config, date(2024, 6, 1))
            .unwrap_err();
        assert!(matches!(err, StockdashError::InvalidInput { .. }));
    }

    #[test]
    fn default_symbol_comes_from_dashboard_section() {
        let config =
            FileConfigAdapter::from_string("[dashboard]\ndefault_symbol = TSLA\n").unwrap();
        assert_eq!(cli::default_symbol(&config), "TSLA");
        assert_eq!(cli::default_symbol(&FileConfigAdapter::empty()), "AAPL");
    }
}

mod analyze_pipeline {
    use super::*;

    #[test]
    fn prints_tail_and_summary() {
        let port = MockDataPort::new().with_bars("AAPL", generate_bars("2024-01-01", 30, 100.0));
        let config = FileConfigAdapter::empty();

        let report = cli::analyze(&port, &config, &query("AAPL"), None).unwrap();

        assert!(report.starts_with("AAPL from 2024-01-01 to 2024-12-31 (30 rows)"));
        assert!(report.contains("Daily Return"));
        assert!(report.contains("SMA 50"));
        assert!(report.contains("2024-01-30"));
        assert!(!report.contains("2024-01-25"));
        // not enough history for either moving average
        assert!(report.contains("—"));
        assert!(report.contains("count"));
        assert!(report.contains("Volatility"));
    }

    #[test]
    fn tail_rows_follow_config() {
        let port = MockDataPort::new().with_bars("AAPL", generate_bars("2024-01-01", 30, 100.0));
        let config = FileConfigAdapter::from_string("[dashboard]\ntail_rows = 2\n").unwrap();

        let report = cli::analyze(&port, &config, &query("AAPL"), None).unwrap();
        assert!(report.contains("2024-01-29"));
        assert!(!report.contains("2024-01-28"));
    }

    #[test]
    fn unknown_symbol_is_invalid_symbol() {
        let port = MockDataPort::new();
        let err = cli::analyze(&port, &FileConfigAdapter::empty(), &query("ZZZZ"), None)
            .unwrap_err();
        assert!(err.is_empty_state());
    }

    #[test]
    fn empty_range_is_invalid_symbol() {
        let port = MockDataPort::new().with_bars("AAPL", generate_bars("2020-01-01", 10, 100.0));
        let err = cli::analyze(&port, &FileConfigAdapter::empty(), &query("AAPL"), None)
            .unwrap_err();
        assert!(matches!(err, StockdashError::InvalidSymbol { symbol } if symbol == "AAPL"));
    }

    #[test]
    fn provider_error_propagates() {
        let port = MockDataPort::new().with_error("AAPL", "connection reset");
        let err = cli::analyze(&port, &FileConfigAdapter::empty(), &query("AAPL"), None)
            .unwrap_err();
        assert!(matches!(err, StockdashError::Provider { .. }));
    }

    #[test]
    fn duplicate_dates_are_malformed() {
        let bars = vec![
            make_bar("2024-01-02", 10.0),
            make_bar("2024-01-02", 11.0),
        ];
        let port = MockDataPort::new().with_bars("AAPL", bars);
        let err = cli::analyze(&port, &FileConfigAdapter::empty(), &query("AAPL"), None)
            .unwrap_err();
        assert!(matches!(err, StockdashError::MalformedSeries { .. }));
    }

    #[test]
    fn invalid_metrics_config_is_rejected() {
        let port = MockDataPort::new().with_bars("AAPL", generate_bars("2024-01-01", 5, 100.0));
        let config = FileConfigAdapter::from_string("[metrics]\nstddev = fancy\n").unwrap();
        let err = cli::analyze(&port, &config, &query("AAPL"), None).unwrap_err();
        assert!(matches!(err, StockdashError::ConfigInvalid { .. }));
    }
}

mod end_to_end {
    use super::*;

    #[test]
    fn csv_directory_to_html_report() {
        let data_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        write_csv(
            data_dir.path(),
            "AAPL",
            &generate_bars("2024-01-01", 250, 100.0),
        );

        let ini = format!(
            "[data]\nprovider = csv\ncsv_dir = {}\n",
            data_dir.path().display()
        );
        let config = FileConfigAdapter::from_string(&ini).unwrap();
        stockdash::domain::config_validation::validate_config(&config).unwrap();

        let port = cli::build_data_port(&config).unwrap();
        let output = out_dir.path().join("aapl.html");
        let report = cli::analyze(port.as_ref(), &config, &query("AAPL"), Some(output.as_path())).unwrap();

        assert!(report.contains("(250 rows)"));
        let html = std::fs::read_to_string(&output).unwrap();
        assert!(html.contains("AAPL Stock Price Trend"));
        assert!(html.contains("Stock Volatility Over Time"));
        assert!(html.contains("Statistical Summary"));
        assert!(html.contains("Stock Market Data Analysis: AAPL"));
        assert!(html.contains("Data source: local CSV files"));
    }
}
