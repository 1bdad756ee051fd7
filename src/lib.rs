//! Space-weather forecasting from NASA DONKI event history.
//!
//! Raw CME, flare and geomagnetic storm records are normalized into daily
//! series, each series is forecast independently, and the future points are
//! assembled into one XML document.

pub mod config;
pub mod constants;
pub mod decoders;
pub mod error;
pub mod fetcher;
pub mod forecast;
pub mod formatters;
pub mod models;
pub mod normalizers;
pub mod pipeline;
pub mod service;
