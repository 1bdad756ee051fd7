use anyhow::Result;
use chrono::{Local, NaiveDate};
use rmcp::{
    handler::server::{wrapper::Parameters, ServerHandler, tool::ToolRouter},
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};
use std::sync::Arc;

use crate::config::RunConfig;
use crate::constants::MAX_HORIZON_DAYS;
use crate::fetcher::HttpFetcher;
use crate::forecast::SeasonalModel;
use crate::formatters::{render_xml, RunReport};
use crate::models::GetSpaceWeatherForecastRequest;
use crate::pipeline;

/// MCP service exposing the forecast pipeline as a tool
#[derive(Clone)]
pub struct SpaceWeather {
    fetcher: Arc<HttpFetcher>,
    defaults: RunConfig,
    tool_router: ToolRouter<Self>,
}

impl SpaceWeather {
    /// Creates a new service; `defaults` fills any parameter a call omits
    pub fn new(defaults: RunConfig) -> Result<Self> {
        Ok(Self {
            fetcher: Arc::new(HttpFetcher::new()?),
            defaults,
            tool_router: Self::tool_router(),
        })
    }

    /// Applies request overrides on top of the defaults for a run on `today`
    fn run_config(
        &self,
        request: &GetSpaceWeatherForecastRequest,
        today: NaiveDate,
    ) -> Result<RunConfig, McpError> {
        let mut config = self.defaults.clone();
        config.today = today;
        config.end_date = today;

        if let Some(start) = &request.start_date {
            config.start_date = NaiveDate::parse_from_str(start, "%Y-%m-%d").map_err(|_| {
                McpError::invalid_params(
                    format!("start_date must be formatted YYYY-MM-DD, got {:?}", start),
                    None,
                )
            })?;
        }
        if let Some(horizon) = request.horizon_days {
            if horizon == 0 || horizon > MAX_HORIZON_DAYS {
                return Err(McpError::invalid_params(
                    format!("horizon_days must be between 1 and {MAX_HORIZON_DAYS}, got {horizon}"),
                    None,
                ));
            }
            config.horizon_days = horizon;
        }
        Ok(config)
    }
}

#[tool_handler]
impl ServerHandler for SpaceWeather {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "space-weather-forecast".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "Forecasts coronal mass ejection speed, solar flare intensity and \
                geomagnetic storm Kp index from NASA DONKI event history."
                    .to_string(),
            ),
        }
    }
}

#[tool_router]
impl SpaceWeather {
    /// Runs the forecast pipeline once
    #[tool(description = "Forecast space-weather activity (CME speed, flare intensity, storm Kp) for the next year from NASA DONKI history. Optional start_date (YYYY-MM-DD) bounds the history; optional horizon_days sets how far past the last event to predict. Returns an XML document of future daily predictions.")]
    async fn get_space_weather_forecast(
        &self,
        Parameters(request): Parameters<GetSpaceWeatherForecastRequest>,
    ) -> Result<CallToolResult, McpError> {
        let config = self.run_config(&request, Local::now().date_naive())?;
        tracing::info!(
            "Forecasting from {} to {} with horizon {} days",
            config.start_date,
            config.end_date,
            config.horizon_days
        );

        match pipeline::run(self.fetcher.as_ref(), &SeasonalModel, &config).await {
            Ok(document) => Ok(CallToolResult::success(vec![Content::text(render_xml(&document))])),
            Err(e) => {
                tracing::error!("Forecast run failed: {}", e);
                Ok(CallToolResult::error(vec![Content::text(RunReport::failure(&e).payload)]))
            }
        }
    }
}
