use std::future::Future;

use reqwest::Client;

use crate::constants::{DONKI_API_BASE, USER_AGENT};
use crate::error::FetchError;
use crate::models::{Category, RawRecord};

/// Source of raw event records for one category.
pub trait RecordFetcher {
    fn fetch(
        &self,
        category: Category,
        url: &str,
    ) -> impl Future<Output = Result<Vec<RawRecord>, FetchError>> + Send;
}

/// Builds the DONKI request URL for `category` over `[start_date, end_date]`.
pub fn donki_url(category: Category, start_date: &str, end_date: &str, api_key: &str) -> String {
    format!(
        "{}/{}?startDate={}&endDate={}{}&api_key={}",
        DONKI_API_BASE,
        category.endpoint(),
        start_date,
        end_date,
        category.extra_query(),
        api_key
    )
}

/// Fetches DONKI records over HTTP
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }
}

impl RecordFetcher for HttpFetcher {
    async fn fetch(&self, category: Category, url: &str) -> Result<Vec<RawRecord>, FetchError> {
        // reqwest errors carry the URL, which carries the API key.
        let transport = |source: reqwest::Error| FetchError::Transport {
            category,
            source: source.without_url(),
        };

        tracing::info!("Fetching {} records", category);
        let response = self.client.get(url).send().await.map_err(transport)?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                category,
                status: response.status(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        let records = parse_records(category, &body)?;
        tracing::info!("Fetched {} {} records", records.len(), category);
        Ok(records)
    }
}

/// DONKI answers an empty window with an empty body rather than `[]`.
pub fn parse_records(category: Category, body: &str) -> Result<Vec<RawRecord>, FetchError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(body).map_err(|e| FetchError::Payload {
        category,
        reason: e.to_string(),
    })
}
