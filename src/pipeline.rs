//! One batch run: fetch, normalize, forecast, assemble.

use crate::config::RunConfig;
use crate::error::{PipelineError, Result};
use crate::fetcher::{donki_url, RecordFetcher};
use crate::forecast::{forecast, ForecastModel};
use crate::formatters::{assemble, ForecastDocument, RunReport};
use crate::models::{Category, RawRecord};
use crate::normalizers::normalize;

/// Runs the whole pipeline. Any fetch failure aborts the run.
pub async fn run<F, M>(fetcher: &F, model: &M, config: &RunConfig) -> Result<ForecastDocument>
where
    F: RecordFetcher,
    M: ForecastModel,
{
    if config.start_date > config.end_date {
        return Err(PipelineError::Window(format!(
            "start date {} is after end date {}",
            config.start_date, config.end_date
        )));
    }

    let start = config.start_date.to_string();
    let end = config.end_date.to_string();
    let fetch = |category: Category| {
        let url = donki_url(category, &start, &end, &config.api_key);
        async move { fetcher.fetch(category, &url).await }
    };

    let (cme, flr, gst) = tokio::try_join!(
        fetch(Category::CoronalMassEjection),
        fetch(Category::SolarFlare),
        fetch(Category::GeomagneticStorm),
    )?;

    let collections: [(Category, Vec<RawRecord>); 3] = [
        (Category::CoronalMassEjection, cme),
        (Category::SolarFlare, flr),
        (Category::GeomagneticStorm, gst),
    ];

    let mut forecasts = Vec::with_capacity(collections.len());
    for (category, records) in &collections {
        let series = normalize(*category, records);
        forecasts.push((*category, forecast(model, *category, &series, config.horizon_days)?));
    }

    Ok(assemble(forecasts, config.today))
}

/// Runs the pipeline and folds any failure into a diagnostic report.
pub async fn run_report<F, M>(fetcher: &F, model: &M, config: &RunConfig) -> RunReport
where
    F: RecordFetcher,
    M: ForecastModel,
{
    let result = run(fetcher, model, config).await;
    if let Err(e) = &result {
        tracing::error!("Forecast run failed: {}", e);
    }
    RunReport::from_result(result)
}
