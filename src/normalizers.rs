//! Per-category conversion of raw DONKI records into normalized series.
//!
//! Rows that lack a required field, fail to deserialize, or carry a token
//! that does not decode are dropped. None of this is an error: an input with
//! no usable rows simply yields an empty series.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::constants::TIMESTAMP_PATTERN;
use crate::decoders::{decode_location, decode_severity, decode_timestamp};
use crate::models::{
    Category, CmeAnalysis, Flare, GeomagneticStorm, RawRecord, SeriesPoint, TimeSeries,
};

/// Dispatches to the normalizer for `category`.
pub fn normalize(category: Category, records: &[RawRecord]) -> TimeSeries {
    let series = match category {
        Category::CoronalMassEjection => normalize_cme(records),
        Category::SolarFlare => normalize_flares(records),
        Category::GeomagneticStorm => normalize_storms(records),
    };
    tracing::debug!(
        "{}: kept {} of {} records",
        category,
        series.len(),
        records.len()
    );
    series
}

/// CME analyses: `(time21_5 date, speed)`.
pub fn normalize_cme(records: &[RawRecord]) -> TimeSeries {
    typed::<CmeAnalysis>(records)
        .filter_map(|cme| {
            let date = decode_timestamp(cme.time_21_5.as_deref()?, TIMESTAMP_PATTERN)
                .map_err(|e| tracing::trace!("dropping CME row: {}", e))
                .ok()?;
            let speed = cme.speed.filter(|s| s.is_finite())?;
            Some(SeriesPoint::new(date, speed))
        })
        .collect()
}

/// Solar flares: `(peakTime date, class severity)` with the decoded source
/// latitude and longitude as auxiliary columns.
pub fn normalize_flares(records: &[RawRecord]) -> TimeSeries {
    // Candidate rows need both a peak time and a class token.
    let candidates: Vec<_> = typed::<Flare>(records)
        .filter_map(|flare| {
            let peak = flare.peak_time?;
            let class = flare.class_type?;
            let severity = decode_severity(&class);
            Some((peak, severity, flare.source_location))
        })
        .collect();

    candidates
        .into_iter()
        .filter_map(|(peak, severity, location)| {
            let date = decode_timestamp(&peak, TIMESTAMP_PATTERN)
                .map_err(|e| tracing::trace!("dropping FLR row: {}", e))
                .ok()?;
            let location = decode_location(location.as_deref())
                .map_err(|e| tracing::trace!("dropping FLR row: {}", e))
                .ok()??;
            Some(SeriesPoint::new(date, severity).with_aux(vec![
                f64::from(location.latitude),
                f64::from(location.longitude),
            ]))
        })
        .collect()
}

/// Geomagnetic storms: `(startTime date, max Kp index)`; a storm without
/// readings scores 0.
pub fn normalize_storms(records: &[RawRecord]) -> TimeSeries {
    typed::<GeomagneticStorm>(records)
        .filter_map(|storm| {
            let date = decode_timestamp(storm.start_time.as_deref()?, TIMESTAMP_PATTERN)
                .map_err(|e| tracing::trace!("dropping GST row: {}", e))
                .ok()?;
            let peak_kp = storm
                .all_kp_index
                .unwrap_or_default()
                .into_iter()
                .filter_map(|reading| reading.get("kpIndex").and_then(Value::as_f64))
                .filter(|kp| kp.is_finite())
                .fold(None, |max: Option<f64>, kp| Some(max.map_or(kp, |m| m.max(kp))))
                .unwrap_or(0.0);
            Some(SeriesPoint::new(date, peak_kp))
        })
        .collect()
}

/// Reads each raw record as `T`, skipping records whose shape does not fit.
fn typed<T: DeserializeOwned>(records: &[RawRecord]) -> impl Iterator<Item = T> + '_ {
    records
        .iter()
        .filter_map(|record| T::deserialize(record).ok())
}
