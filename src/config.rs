//! Command line and environment configuration.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::constants::{DEFAULT_API_KEY, DEFAULT_HORIZON_DAYS, DEFAULT_START_DATE, MAX_HORIZON_DAYS};

#[derive(Debug, Parser)]
#[command(name = "space-weather-forecast", version, about = "Forecast DONKI space-weather activity")]
pub struct Cli {
    /// api.nasa.gov key
    #[arg(long, env = "NASA_API_KEY", default_value = DEFAULT_API_KEY, hide_env_values = true)]
    pub api_key: String,

    /// First day of history to fetch (YYYY-MM-DD)
    #[arg(long, default_value = DEFAULT_START_DATE)]
    pub start_date: NaiveDate,

    /// Last day of history to fetch; defaults to today
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Days to predict past the last historical event
    #[arg(
        long,
        default_value_t = DEFAULT_HORIZON_DAYS,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_HORIZON_DAYS))
    )]
    pub horizon_days: u32,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the forecast as an MCP tool over stdio
    Serve,
}

impl Cli {
    /// Resolves the run window against the run date.
    pub fn run_config(&self, today: NaiveDate) -> RunConfig {
        RunConfig {
            api_key: self.api_key.clone(),
            start_date: self.start_date,
            end_date: self.end_date.unwrap_or(today),
            today,
            horizon_days: self.horizon_days,
        }
    }
}

/// Explicit inputs of one pipeline run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub api_key: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Forecast points on or before this date are not reported.
    pub today: NaiveDate,
    pub horizon_days: u32,
}

impl RunConfig {
    pub fn new(api_key: impl Into<String>, start_date: NaiveDate, today: NaiveDate) -> Self {
        Self {
            api_key: api_key.into(),
            start_date,
            end_date: today,
            today,
            horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["space-weather-forecast"]).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();

        let config = cli.run_config(today);

        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2012, 1, 1).unwrap());
        assert_eq!(config.end_date, today);
        assert_eq!(config.horizon_days, 365);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_overrides_and_serve() {
        let cli = Cli::try_parse_from([
            "space-weather-forecast",
            "--api-key",
            "abc",
            "--start-date",
            "2020-02-01",
            "--end-date",
            "2021-02-01",
            "--horizon-days",
            "30",
            "serve",
        ])
        .unwrap();

        let config = cli.run_config(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());

        assert_eq!(config.api_key, "abc");
        assert_eq!(config.end_date, NaiveDate::from_ymd_opt(2021, 2, 1).unwrap());
        assert_eq!(config.horizon_days, 30);
        assert!(matches!(cli.command, Some(Command::Serve)));
    }

    #[test]
    fn test_rejects_out_of_range_horizon() {
        for horizon in ["0", "3651", "4294967295"] {
            let parsed = Cli::try_parse_from(["space-weather-forecast", "--horizon-days", horizon]);
            assert!(parsed.is_err(), "accepted {horizon}");
        }
        let cli = Cli::try_parse_from(["space-weather-forecast", "--horizon-days", "3650"]).unwrap();
        assert_eq!(cli.horizon_days, MAX_HORIZON_DAYS);
    }

    #[test]
    fn test_rejects_bad_date() {
        assert!(Cli::try_parse_from(["space-weather-forecast", "--start-date", "01/02/2020"]).is_err());
    }
}
