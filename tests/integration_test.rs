//! End-to-end tests of the summary pipeline.
//!
//! Tests cover:
//! - Data port → indicators → forecast → summary with a mock data port
//! - Error mappings for empty, tiny and failing fetches
//! - Chart window truncation and JSON shape
//! - CSV adapter driving the full pipeline from files on disk

mod common;

use common::*;
use stockcast::adapters::csv_adapter::CsvAdapter;
use stockcast::domain::enrich::compute_indicators;
use stockcast::domain::error::{ErrorKind, NO_DATA_MESSAGE};
use stockcast::domain::forecast::{build_pairs, chronological_split, forecast, Direction};
use stockcast::domain::summary::{assemble, get_summary, get_summary_between, Summary, CHART_WINDOW};

mod full_pipeline {
    use super::*;

    #[test]
    fn linear_uptrend_forecasts_up_with_near_zero_error() {
        let bars = generate_bars("2024-01-01", 60, 100.0, 0.5);
        let port = MockDataPort::new().with_bars("TREND", bars);

        let summary = get_summary_between(&port, "trend", date(2024, 1, 1), date(2024, 3, 31));
        let report = summary.report().expect("summary should succeed");

        assert_eq!(report.symbol, "TREND");
        assert_eq!(report.forecast.direction, Direction::Up);
        assert!(report.forecast.next_close > report.forecast.last_close);
        assert!(report.forecast.held_out_mse.abs() < 1e-9);
        assert!((report.last_close - 129.5).abs() < 1e-12);
        assert!((report.forecast.next_close - 130.0).abs() < 1e-6);
    }

    #[test]
    fn linear_downtrend_forecasts_down() {
        let bars = generate_bars("2024-01-01", 90, 300.0, -1.25);
        let summary = assemble("dn", &bars);
        let report = summary.report().unwrap();
        assert_eq!(report.forecast.direction, Direction::Down);
        assert!(report.forecast.next_close < report.last_close);
    }

    #[test]
    fn wave_series_succeeds_with_non_negative_mse() {
        let bars = generate_wave("2022-06-01", 400);
        let summary = assemble("wave", &bars);
        let report = summary.report().unwrap();

        assert!(report.forecast.held_out_mse >= 0.0);
        assert_eq!(
            report.forecast.direction == Direction::Up,
            report.forecast.next_close >= report.forecast.last_close
        );
        assert_eq!(report.last_close, bars.last().unwrap().close);
    }

    #[test]
    fn forecast_sees_full_history_not_chart_window() {
        // 400 bars -> 351 rows; the chart shows 180 of them.
        let bars = generate_wave("2022-06-01", 400);
        let rows = compute_indicators(&bars);
        let pairs = build_pairs(&rows);
        let (train, test) = chronological_split(&pairs);
        assert_eq!(train.len() + test.len(), rows.len() - 1);
        assert_eq!(test.len(), 70);

        let report = assemble("wave", &bars).report().cloned().unwrap();
        assert_eq!(report.chart.len(), CHART_WINDOW);
        assert_eq!(report.forecast, forecast(&rows).unwrap());

        let windowed = forecast(&rows[rows.len() - CHART_WINDOW..]).unwrap();
        assert_ne!(report.forecast.held_out_mse, windowed.held_out_mse);
    }

    #[test]
    fn unsorted_fetch_is_normalized() {
        let mut bars = generate_bars("2024-01-01", 60, 100.0, 0.5);
        bars.reverse();
        let port = MockDataPort::new().with_bars("REV", bars);

        let summary = get_summary_between(&port, "REV", date(2024, 1, 1), date(2024, 12, 31));
        assert_eq!(summary.report().unwrap().forecast.direction, Direction::Up);
    }

    #[test]
    fn get_summary_fetches_through_today() {
        let port = MockDataPort::new();
        let _ = get_summary(&port, "ibm", date(2020, 1, 1));

        let calls = port.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "IBM");
        assert_eq!(calls[0].1, date(2020, 1, 1));
        assert_eq!(calls[0].2, chrono::Local::now().date_naive());
    }
}

mod error_mapping {
    use super::*;

    #[test]
    fn empty_series_is_exact_no_data_payload() {
        let port = MockDataPort::new();
        let summary = get_summary_between(&port, "NOPE", date(2024, 1, 1), date(2024, 6, 1));

        assert_eq!(summary.error_kind(), Some(ErrorKind::NoData));
        let json = serde_json::to_string(&summary).unwrap();
        assert_eq!(
            json,
            format!("{{\"ok\":false,\"error\":\"{}\"}}", NO_DATA_MESSAGE)
        );
    }

    #[test]
    fn fetch_error_is_treated_as_no_data() {
        let port = MockDataPort::new().with_error("FAIL", "connection reset");
        let summary = get_summary_between(&port, "fail", date(2024, 1, 1), date(2024, 6, 1));
        assert_eq!(summary.error_kind(), Some(ErrorKind::NoData));
    }

    #[test]
    fn single_bar_is_insufficient_data() {
        let summary = assemble("ONE", &[make_bar("2024-01-02", 10.0)]);
        match summary {
            Summary::Failure { kind, error } => {
                assert_eq!(kind, ErrorKind::InsufficientData);
                assert!(error.contains("insufficient data"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn forty_nine_bars_is_insufficient_data() {
        let summary = assemble("X", &generate_bars("2024-01-01", 49, 10.0, 1.0));
        assert_eq!(summary.error_kind(), Some(ErrorKind::InsufficientData));
    }

    #[test]
    fn fifty_two_bars_is_smallest_success() {
        // 3 rows -> 2 pairs -> 1 train, 1 test
        assert!(!assemble("X", &generate_bars("2024-01-01", 51, 10.0, 1.0)).is_ok());
        assert!(assemble("X", &generate_bars("2024-01-01", 52, 10.0, 1.0)).is_ok());
    }

    #[test]
    fn non_finite_prices_fail_without_partial_success() {
        let mut bars = generate_bars("2024-01-01", 80, 10.0, 1.0);
        for bar in bars.iter_mut().skip(40) {
            bar.close = f64::NAN;
        }
        let summary = assemble("NAN", &bars);
        assert!(!summary.is_ok());
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("chart").is_none());
        assert!(json.get("forecast").is_none());
    }
}

mod chart_window {
    use super::*;

    #[test]
    fn three_hundred_rows_truncate_to_last_180() {
        let bars = generate_wave("2021-01-01", 349);
        let rows = compute_indicators(&bars);
        assert_eq!(rows.len(), 300);

        let summary = assemble("W", &bars);
        let chart = &summary.report().unwrap().chart;

        let expected: Vec<String> = rows[120..]
            .iter()
            .map(|r| r.date().format("%Y-%m-%d").to_string())
            .collect();
        assert_eq!(chart.dates, expected);
        assert!(chart.dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn chart_arrays_are_index_aligned() {
        let bars = generate_wave("2021-01-01", 260);
        let rows = compute_indicators(&bars);
        let summary = assemble("W", &bars);
        let chart = &summary.report().unwrap().chart;

        let offset = rows.len() - chart.len();
        for (i, row) in rows[offset..].iter().enumerate() {
            assert_eq!(chart.close[i], row.close());
            assert_eq!(chart.sma20[i], Some(row.sma20));
            assert_eq!(chart.upper_band[i], Some(row.upper_band));
            assert_eq!(chart.lower_band[i], Some(row.lower_band));
        }
    }

    #[test]
    fn success_json_has_no_error_field() {
        let summary = assemble("aapl", &generate_wave("2021-01-01", 120));
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["ok"], true);
        assert_eq!(json["symbol"], "AAPL");
        assert_eq!(json["lastClose"], json["forecast"]["lastClose"]);
        assert!(json.get("error").is_none());
        let n = json["chart"]["dates"].as_array().unwrap().len();
        assert_eq!(n, 120 - 49);
    }
}

mod csv_pipeline {
    use super::*;
    use std::fmt::Write as _;
    use std::fs;

    #[test]
    fn csv_files_drive_full_summary() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut content = String::from("date,open,high,low,close,volume\n");
        for bar in generate_bars("2023-01-01", 120, 50.0, 0.25) {
            writeln!(
                content,
                "{},{},{},{},{},{}",
                bar.date.format("%Y-%m-%d"),
                bar.open,
                bar.high,
                bar.low,
                bar.close,
                bar.volume
            )
            .unwrap();
        }
        fs::write(dir.path().join("ACME.csv"), content).unwrap();

        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let summary = get_summary_between(&adapter, "acme", date(2023, 1, 1), date(2023, 12, 31));
        let report = summary.report().unwrap();

        assert_eq!(report.symbol, "ACME");
        assert_eq!(report.chart.len(), 120 - 49);
        assert_eq!(report.forecast.direction, Direction::Up);

        let missing = get_summary_between(&adapter, "none", date(2023, 1, 1), date(2023, 12, 31));
        assert_eq!(missing.error_kind(), Some(ErrorKind::NoData));
    }
}
