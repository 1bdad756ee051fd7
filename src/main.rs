use anyhow::Result;
use chrono::Local;
use clap::Parser;
use rmcp::ServiceExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use space_weather_forecast::config::{Cli, Command};
use space_weather_forecast::fetcher::HttpFetcher;
use space_weather_forecast::forecast::SeasonalModel;
use space_weather_forecast::formatters::RunReport;
use space_weather_forecast::pipeline;
use space_weather_forecast::service::SpaceWeather;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the result line (or the MCP transport), so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "space_weather_forecast=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.run_config(Local::now().date_naive());

    match cli.command {
        Some(Command::Serve) => {
            tracing::info!("Starting MCP space-weather server");

            let service = SpaceWeather::new(config)?;
            let server = service.serve(rmcp::transport::stdio()).await?;
            server.waiting().await?;

            tracing::info!("Server shutdown complete");
        }
        None => {
            tracing::info!(
                "Forecasting DONKI events from {} to {}",
                config.start_date,
                config.end_date
            );

            let report = match HttpFetcher::new() {
                Ok(fetcher) => {
                    pipeline::run_report(&fetcher, &SeasonalModel, &config).await
                }
                Err(e) => RunReport::failure(&e),
            };
            println!("{}", report.to_line());
        }
    }

    Ok(())
}
