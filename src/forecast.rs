//! Forecast engine.
//!
//! The engine only knows the [`ForecastModel`] / [`FittedModel`] pair; it owns
//! the prediction grid (unique history dates followed by the horizon) and the
//! empty-series skip. [`SeasonalModel`] is the default model: the series is
//! laid on a daily grid and forecast with augurs, using MSTL (weekly and,
//! with enough history, yearly seasonality) over an AutoETS trend.

use augurs::{
    ets::AutoETS,
    forecaster::{transforms::LinearInterpolator, Forecaster, Transformer},
    mstl::MSTLModel,
};
use chrono::{Days, NaiveDate};

use crate::constants::MAX_HORIZON_DAYS;
use crate::error::ForecastError;
use crate::models::{Category, ForecastPoint, ForecastSeries, TimeSeries};

/// A model that can be trained on a normalized series.
pub trait ForecastModel {
    type Fitted: FittedModel;

    fn fit(&self, series: &TimeSeries) -> Result<Self::Fitted, String>;
}

/// A trained model; returns one prediction per requested date.
pub trait FittedModel {
    fn predict(&mut self, dates: &[NaiveDate]) -> Result<Vec<f64>, String>;
}

/// Fits `model` on `series` and predicts over the history plus
/// `horizon_days` days past the last historical date.
///
/// Returns `Ok(None)` without touching the model when the series is empty.
pub fn forecast<M: ForecastModel>(
    model: &M,
    category: Category,
    series: &TimeSeries,
    horizon_days: u32,
) -> Result<Option<ForecastSeries>, ForecastError> {
    if horizon_days == 0 || horizon_days > MAX_HORIZON_DAYS {
        return Err(ForecastError::Horizon(horizon_days));
    }
    if series.is_empty() {
        tracing::info!("{}: no usable rows, skipping forecast", category);
        return Ok(None);
    }

    let dates =
        prediction_dates(series, horizon_days).ok_or(ForecastError::Horizon(horizon_days))?;

    let mut fitted = model
        .fit(series)
        .map_err(|reason| ForecastError::Fit(category, reason))?;
    let values = fitted
        .predict(&dates)
        .map_err(|reason| ForecastError::Fit(category, reason))?;
    if values.len() != dates.len() {
        return Err(ForecastError::Fit(
            category,
            format!("{} predictions for {} dates", values.len(), dates.len()),
        ));
    }

    let points: Vec<ForecastPoint> = dates
        .into_iter()
        .zip(values)
        .map(|(date, value)| ForecastPoint { date, value })
        .collect();

    tracing::info!(
        "{}: fitted {} rows, predicted {} dates",
        category,
        series.len(),
        points.len()
    );
    Ok(Some(ForecastSeries { points }))
}

/// Sorted unique history dates followed by `horizon_days` consecutive days.
/// `None` if the horizon runs past the last representable date.
fn prediction_dates(series: &TimeSeries, horizon_days: u32) -> Option<Vec<NaiveDate>> {
    let mut dates: Vec<NaiveDate> = series.points.iter().map(|p| p.date).collect();
    dates.sort_unstable();
    dates.dedup();

    let last = *dates.last()?;
    for offset in 1..=u64::from(horizon_days) {
        dates.push(last.checked_add_days(Days::new(offset))?);
    }
    Some(dates)
}

// ============================================================================
// Seasonal model (augurs MSTL + AutoETS)
// ============================================================================

/// Below this many grid days the model predicts the mean level
const MIN_DATA_POINTS: usize = 7;

const WEEKLY_PERIOD: usize = 7;

const YEARLY_PERIOD: usize = 365;

/// Longest history the daily grid will hold (100 years)
const MAX_HISTORY_DAYS: usize = 36_525;

/// Level passed to augurs; the intervals themselves are not reported
const PREDICTION_LEVEL: f64 = 0.95;

/// In-sample and out-of-sample point forecasts for a given horizon
type Predictions = Result<(Vec<f64>, Vec<f64>), String>;

#[derive(Debug, Clone, Copy, Default)]
pub struct SeasonalModel;

pub struct FittedSeasonal {
    start: NaiveDate,
    observed: usize,
    predictor: Predictor,
}

enum Predictor {
    Level(f64),
    Model(Box<dyn FnMut(usize) -> Predictions>),
}

impl ForecastModel for SeasonalModel {
    type Fitted = FittedSeasonal;

    fn fit(&self, series: &TimeSeries) -> Result<FittedSeasonal, String> {
        let (start, values) = daily_grid(series)?;
        let observed = values.len();

        let predictor = if observed < MIN_DATA_POINTS {
            let known: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
            Predictor::Level(known.iter().sum::<f64>() / known.len() as f64)
        } else {
            let mut periods = Vec::new();
            if observed >= 2 * WEEKLY_PERIOD {
                periods.push(WEEKLY_PERIOD);
            }
            if observed >= 2 * YEARLY_PERIOD {
                periods.push(YEARLY_PERIOD);
            }
            if periods.is_empty() {
                fit_ets(&values)?
            } else {
                fit_mstl(&values, periods)?
            }
        };

        Ok(FittedSeasonal {
            start,
            observed,
            predictor,
        })
    }
}

impl FittedModel for FittedSeasonal {
    fn predict(&mut self, dates: &[NaiveDate]) -> Result<Vec<f64>, String> {
        let mut offsets = Vec::with_capacity(dates.len());
        for date in dates {
            let offset = (*date - self.start).num_days();
            if offset < 0 {
                return Err(format!("{date} is before the fitted history"));
            }
            offsets.push(offset as usize);
        }

        let run = match &mut self.predictor {
            Predictor::Level(level) => return Ok(vec![*level; dates.len()]),
            Predictor::Model(run) => run,
        };

        let horizon = offsets
            .iter()
            .max()
            .map_or(0, |&max| (max + 1).saturating_sub(self.observed));
        let (in_sample, future) = run(horizon.max(1))?;

        offsets
            .into_iter()
            .map(|offset| {
                let value = if offset < self.observed {
                    in_sample.get(offset)
                } else {
                    future.get(offset - self.observed)
                };
                value
                    .copied()
                    .ok_or_else(|| format!("no prediction for day {offset}"))
            })
            .collect()
    }
}

/// Lays the series on a daily grid from its first to its last date.
/// Days with several rows take their mean; days without rows are NaN and
/// are filled by the interpolator before fitting.
fn daily_grid(series: &TimeSeries) -> Result<(NaiveDate, Vec<f64>), String> {
    let (start, end) = match (series.first_date(), series.last_date()) {
        (Some(start), Some(end)) => (start, end),
        _ => return Err("series is empty".to_string()),
    };
    let len = (end - start).num_days() as usize + 1;
    if len > MAX_HISTORY_DAYS {
        return Err(format!("history spans {len} days"));
    }

    let mut sums = vec![0.0; len];
    let mut counts = vec![0usize; len];
    for point in &series.points {
        let index = (point.date - start).num_days() as usize;
        sums[index] += point.value;
        counts[index] += 1;
    }

    let values = sums
        .into_iter()
        .zip(counts)
        .map(|(sum, count)| {
            if count == 0 {
                f64::NAN
            } else {
                sum / count as f64
            }
        })
        .collect();
    Ok((start, values))
}

fn interpolation() -> Vec<Box<dyn Transformer>> {
    vec![Box::new(LinearInterpolator::default())]
}

/// MSTL over the given periods with AutoETS as the trend model.
fn fit_mstl(values: &[f64], periods: Vec<usize>) -> Result<Predictor, String> {
    let ets = AutoETS::non_seasonal().into_trend_model();
    let mstl = MSTLModel::new(periods, ets);
    let mut forecaster = Forecaster::new(mstl).with_transformers(interpolation());

    forecaster
        .fit(values)
        .map_err(|e| format!("MSTL fit error: {e}"))?;

    Ok(Predictor::Model(Box::new(move |horizon: usize| -> Predictions {
        let in_sample = forecaster
            .predict_in_sample(PREDICTION_LEVEL)
            .map_err(|e| format!("MSTL predict error: {e}"))?;
        let future = forecaster
            .predict(horizon, PREDICTION_LEVEL)
            .map_err(|e| format!("MSTL predict error: {e}"))?;
        Ok((in_sample.point, future.point))
    })))
}

/// Non-seasonal AutoETS, for histories shorter than two weeks.
fn fit_ets(values: &[f64]) -> Result<Predictor, String> {
    let ets = AutoETS::non_seasonal();
    let mut forecaster = Forecaster::new(ets).with_transformers(interpolation());

    forecaster
        .fit(values)
        .map_err(|e| format!("ETS fit error: {e}"))?;

    Ok(Predictor::Model(Box::new(move |horizon: usize| -> Predictions {
        let in_sample = forecaster
            .predict_in_sample(PREDICTION_LEVEL)
            .map_err(|e| format!("ETS predict error: {e}"))?;
        let future = forecaster
            .predict(horizon, PREDICTION_LEVEL)
            .map_err(|e| format!("ETS predict error: {e}"))?;
        Ok((in_sample.point, future.point))
    })))
}
