use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Series categories
// ============================================================================

/// The three DONKI event types we forecast, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    CoronalMassEjection,
    SolarFlare,
    GeomagneticStorm,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::CoronalMassEjection,
        Category::SolarFlare,
        Category::GeomagneticStorm,
    ];

    /// Element name used in the output document
    pub fn code(self) -> &'static str {
        match self {
            Category::CoronalMassEjection => "CME",
            Category::SolarFlare => "FLR",
            Category::GeomagneticStorm => "GST",
        }
    }

    /// DONKI endpoint path for this category
    pub fn endpoint(self) -> &'static str {
        match self {
            Category::CoronalMassEjection => "CMEAnalysis",
            Category::SolarFlare => "FLR",
            Category::GeomagneticStorm => "GST",
        }
    }

    /// Extra query parameters the endpoint needs beyond the date range
    pub fn extra_query(self) -> &'static str {
        match self {
            Category::CoronalMassEjection => "&mostAccurateOnly=true",
            Category::SolarFlare | Category::GeomagneticStorm => "",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// DONKI record models
// ============================================================================

/// One raw record as returned by the provider. The shape differs per
/// category, so it stays untyped until a normalizer picks the fields it needs.
pub type RawRecord = serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct CmeAnalysis {
    #[serde(rename = "time21_5")]
    pub time_21_5: Option<String>,
    pub speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct Flare {
    #[serde(rename = "peakTime")]
    pub peak_time: Option<String>,
    #[serde(rename = "classType")]
    pub class_type: Option<String>,
    #[serde(rename = "sourceLocation")]
    pub source_location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeomagneticStorm {
    #[serde(rename = "startTime")]
    pub start_time: Option<String>,
    /// Readings stay untyped so one malformed reading does not lose the storm
    #[serde(rename = "allKpIndex", default)]
    pub all_kp_index: Option<Vec<serde_json::Value>>,
}

// ============================================================================
// Decoded field values
// ============================================================================

/// Heliographic source location in signed whole degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoLocation {
    pub latitude: i32,
    pub longitude: i32,
}

// ============================================================================
// Normalized series
// ============================================================================

/// One row of a normalized series. `aux` holds extra numeric columns
/// (flare latitude/longitude) that travel with the row into the model fit.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub aux: Vec<f64>,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value,
            aux: Vec::new(),
        }
    }

    pub fn with_aux(mut self, aux: Vec<f64>) -> Self {
        self.aux = aux;
        self
    }
}

/// A normalized series. Dates may repeat and need not be sorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    pub points: Vec<SeriesPoint>,
}

impl TimeSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.iter().map(|p| p.date).min()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.iter().map(|p| p.date).max()
    }
}

impl FromIterator<SeriesPoint> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = SeriesPoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// Forecast output
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Model output over the history plus the horizon, in chronological order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastSeries {
    pub points: Vec<ForecastPoint>,
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct GetSpaceWeatherForecastRequest {
    /// First day of history to fetch, formatted YYYY-MM-DD
    pub start_date: Option<String>,
    /// Days to predict past the last historical event
    pub horizon_days: Option<u32>,
}
