//! End-to-end pipeline runs against an in-memory record source.

use std::collections::HashMap;
use std::sync::Mutex;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};

use space_weather_forecast::config::RunConfig;
use space_weather_forecast::error::{FetchError, PipelineError};
use space_weather_forecast::fetcher::RecordFetcher;
use space_weather_forecast::forecast::SeasonalModel;
use space_weather_forecast::formatters::Status;
use space_weather_forecast::models::Category;
use space_weather_forecast::pipeline::{run, run_report};

/// Serves canned records per category; a category mapped to `None` fails.
struct CannedFetcher {
    responses: HashMap<Category, Option<Vec<Value>>>,
    requested: Mutex<Vec<String>>,
}

impl CannedFetcher {
    fn new(cme: Option<Vec<Value>>, flr: Option<Vec<Value>>, gst: Option<Vec<Value>>) -> Self {
        let responses = HashMap::from([
            (Category::CoronalMassEjection, cme),
            (Category::SolarFlare, flr),
            (Category::GeomagneticStorm, gst),
        ]);
        Self {
            responses,
            requested: Mutex::new(Vec::new()),
        }
    }
}

impl RecordFetcher for CannedFetcher {
    async fn fetch(&self, category: Category, url: &str) -> Result<Vec<Value>, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        match self.responses.get(&category).cloned().flatten() {
            Some(records) => Ok(records),
            None => Err(FetchError::Status {
                category,
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            }),
        }
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn config() -> RunConfig {
    RunConfig::new("TEST_KEY", NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), today())
}

/// Forty event timestamps, eight days apart, ending shortly before today.
fn timestamps() -> Vec<String> {
    let first = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
    (0..40)
        .map(|i| {
            let date = first + Duration::days(i * 8);
            format!("{}T12:30Z", date.format("%Y-%m-%d"))
        })
        .collect()
}

fn cme_records() -> Vec<Value> {
    timestamps()
        .into_iter()
        .enumerate()
        .map(|(i, ts)| json!({"time21_5": ts, "speed": 400.0 + 10.0 * i as f64}))
        .collect()
}

fn flare_records() -> Vec<Value> {
    let classes = ["C3.0", "M1.2", "X1.0", "M5.5"];
    timestamps()
        .into_iter()
        .enumerate()
        .map(|(i, ts)| {
            json!({
                "peakTime": ts,
                "classType": classes[i % classes.len()],
                "sourceLocation": format!("N{}W{}", i % 30, i % 60)
            })
        })
        .collect()
}

fn storm_records() -> Vec<Value> {
    timestamps()
        .into_iter()
        .enumerate()
        .map(|(i, ts)| {
            json!({
                "startTime": ts,
                "allKpIndex": [{"kpIndex": 5.0}, {"kpIndex": 5.0 + (i % 4) as f64}]
            })
        })
        .collect()
}

#[tokio::test]
async fn test_success_has_future_records_for_every_category() {
    let fetcher = CannedFetcher::new(
        Some(cme_records()),
        Some(flare_records()),
        Some(storm_records()),
    );

    let document = run(&fetcher, &SeasonalModel, &config())
        .await
        .unwrap();

    assert_eq!(document.categories.len(), 3);
    for category in Category::ALL {
        let node = document.category(category).unwrap();
        assert!(!node.records.is_empty(), "{} has no records", category);
        for record in &node.records {
            let date = NaiveDate::parse_from_str(&record.date, "%Y-%m-%d").unwrap();
            assert!(date > today());
            assert!(record.value.parse::<f64>().unwrap().is_finite());
        }
    }
}

#[tokio::test]
async fn test_success_report_line() {
    let fetcher = CannedFetcher::new(
        Some(cme_records()),
        Some(flare_records()),
        Some(storm_records()),
    );

    let report = run_report(&fetcher, &SeasonalModel, &config()).await;
    let line = report.to_line();
    let parts: Vec<&str> = line.split(' ').collect();

    assert_eq!(report.status, Status::Success);
    assert_eq!(parts.len(), 3);
    let xml = String::from_utf8(general_purpose::STANDARD.decode(parts[0]).unwrap()).unwrap();
    assert_eq!(parts[1], xml.len().to_string());
    assert_eq!(parts[2], "Success");
    assert!(xml.contains("<forecast_data><CME><record>"));
    assert!(xml.contains("<FLR><record>"));
    assert!(xml.contains("<GST><record>"));
}

#[tokio::test]
async fn test_any_fetch_failure_fails_the_run() {
    let fetcher = CannedFetcher::new(Some(cme_records()), None, Some(storm_records()));

    let report = run_report(&fetcher, &SeasonalModel, &config()).await;

    assert_eq!(report.status, Status::Failure);
    assert!(report.payload.starts_with("Error: FLR request failed"));
    assert!(!report.payload.contains("<forecast_data"));
    assert!(report.to_line().ends_with(" Failure"));
}

#[tokio::test]
async fn test_fetch_failure_is_typed() {
    let fetcher = CannedFetcher::new(None, Some(flare_records()), Some(storm_records()));

    let err = run(&fetcher, &SeasonalModel, &config())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Fetch(FetchError::Status {
            category: Category::CoronalMassEjection,
            ..
        })
    ));
}

#[tokio::test]
async fn test_empty_category_is_omitted() {
    let fetcher = CannedFetcher::new(Some(cme_records()), Some(vec![]), Some(storm_records()));

    let document = run(&fetcher, &SeasonalModel, &config())
        .await
        .unwrap();

    let codes: Vec<&str> = document.categories.iter().map(|n| n.category.code()).collect();
    assert_eq!(codes, vec!["CME", "GST"]);
}

#[tokio::test]
async fn test_unusable_rows_do_not_fail_the_run() {
    let mut flares = flare_records();
    flares.push(json!({"peakTime": "garbage", "classType": "X1.0", "sourceLocation": "N1E1"}));
    flares.push(json!({"peakTime": "2024-01-01T00:00Z", "classType": "X1.0", "sourceLocation": "N15"}));
    let mut storms = storm_records();
    storms.push(json!({"startTime": "yesterday"}));

    let fetcher = CannedFetcher::new(Some(cme_records()), Some(flares), Some(storms));

    let report = run_report(&fetcher, &SeasonalModel, &config()).await;

    assert_eq!(report.status, Status::Success);
}

#[tokio::test]
async fn test_requests_cover_run_window() {
    let fetcher = CannedFetcher::new(Some(vec![]), Some(vec![]), Some(vec![]));

    let document = run(&fetcher, &SeasonalModel, &config())
        .await
        .unwrap();

    assert!(document.categories.is_empty());
    let mut requested = fetcher.requested.lock().unwrap().clone();
    requested.sort();
    assert_eq!(requested.len(), 3);
    for url in &requested {
        assert!(url.contains("startDate=2023-01-01&endDate=2024-06-01"));
        assert!(url.ends_with("api_key=TEST_KEY"));
    }
    assert!(requested[0].contains("/CMEAnalysis?"));
}

#[tokio::test]
async fn test_inverted_window_is_rejected() {
    let fetcher = CannedFetcher::new(Some(vec![]), Some(vec![]), Some(vec![]));
    let mut config = config();
    config.start_date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

    let err = run(&fetcher, &SeasonalModel, &config)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Window(_)));
    assert!(fetcher.requested.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_oversized_horizon_reports_failure() {
    let fetcher = CannedFetcher::new(Some(vec![]), Some(flare_records()), Some(vec![]));
    let mut config = config();
    config.horizon_days = u32::MAX;

    let report = run_report(&fetcher, &SeasonalModel, &config).await;

    assert_eq!(report.status, Status::Failure);
    assert!(report.payload.contains("horizon"), "{}", report.payload);
    assert!(report.to_line().ends_with(" Failure"));
}
