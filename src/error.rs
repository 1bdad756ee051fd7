//! Error types for the forecast pipeline.

use thiserror::Error;

use crate::models::Category;

/// A domain-encoded field token that could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("timestamp {token:?} does not match {pattern}")]
    Timestamp { token: String, pattern: String },

    #[error("source location {0:?} has no E/W longitude marker")]
    LocationMarker(String),

    #[error("source location {0:?} has a non-integer magnitude")]
    LocationMagnitude(String),
}

/// Failure retrieving one category's records.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{category} request failed: {source}")]
    Transport {
        category: Category,
        #[source]
        source: reqwest::Error,
    },

    #[error("{category} request failed with status: {status}")]
    Status {
        category: Category,
        status: reqwest::StatusCode,
    },

    #[error("{category} response is not a record list: {reason}")]
    Payload { category: Category, reason: String },
}

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("{0} model fit failed: {1}")]
    Fit(Category, String),

    #[error("forecast horizon of {0} days is out of range")]
    Horizon(u32),
}

/// Anything that aborts a run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error("invalid run window: {0}")]
    Window(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
