//! Decoders for the compact tokens DONKI packs into event fields.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::DecodeError;
use crate::models::GeoLocation;

/// Decodes a heliographic location such as `S12W34`.
///
/// The longitude marker is the first `E`, or failing that the first `W`;
/// everything between the leading hemisphere letter and the marker is the
/// latitude magnitude. `S` and `W` negate their magnitude. An absent or empty
/// token decodes to `Ok(None)`.
pub fn decode_location(token: Option<&str>) -> Result<Option<GeoLocation>, DecodeError> {
    let token = match token {
        Some(t) if !t.is_empty() => t,
        _ => return Ok(None),
    };

    let mut chars = token.chars();
    let lat_hemisphere = chars.next().unwrap_or_default();
    let rest = chars.as_str();

    let split = rest
        .find('E')
        .or_else(|| rest.find('W'))
        .ok_or_else(|| DecodeError::LocationMarker(token.to_string()))?;
    let lon_hemisphere = &rest[split..split + 1];

    let magnitude = |digits: &str| {
        digits
            .parse::<i32>()
            .map_err(|_| DecodeError::LocationMagnitude(token.to_string()))
    };
    let mut latitude = magnitude(&rest[..split])?;
    let mut longitude = magnitude(&rest[split + 1..])?;

    if lat_hemisphere == 'S' {
        latitude = -latitude;
    }
    if lon_hemisphere == "W" {
        longitude = -longitude;
    }

    Ok(Some(GeoLocation {
        latitude,
        longitude,
    }))
}

/// Maps a flare class token (`X2.5`, `M1.0`, `C3.0`) onto one linear scale
/// where M1.0 is 1.0. Unknown classes and unreadable magnitudes score 0.
pub fn decode_severity(token: &str) -> f64 {
    let mut chars = token.chars();
    let class = chars.next();
    let magnitude = match chars.as_str().parse::<f64>() {
        Ok(m) if m.is_finite() && m >= 0.0 => m,
        _ => return 0.0,
    };
    match class {
        Some('X') => magnitude * 10.0,
        Some('M') => magnitude,
        Some('C') => magnitude / 10.0,
        _ => 0.0,
    }
}

/// Strictly parses a timestamp token and keeps only its calendar date.
pub fn decode_timestamp(token: &str, pattern: &str) -> Result<NaiveDate, DecodeError> {
    NaiveDateTime::parse_from_str(token, pattern)
        .map(|ts| ts.date())
        .map_err(|_| DecodeError::Timestamp {
            token: token.to_string(),
            pattern: pattern.to_string(),
        })
}
