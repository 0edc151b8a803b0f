use std::time::Duration;

use reqwest::Client;

use crate::outage::ExtractError;

/// Public site the listing and incident pages are served from.
pub const DEFAULT_BASE_URL: &str = "http://water.gov.ge";

/// Per-request timeout for every page fetch.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const MAP_PATH: &str = "/page/map";
const PROBLEM_PATH: &str = "/page/problem";

/// HTTP transport for water.gov.ge pages.
#[derive(Clone)]
pub struct WaterGovGeClient {
    base_url: String,
    http: Client,
}

impl WaterGovGeClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ExtractError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| ExtractError::Transport {
                url: base_url.clone(),
                source,
            })?;

        Ok(Self { base_url, http })
    }

    /// URL of the listing page with the embedded marker payload.
    pub fn map_url(&self) -> String {
        format!("{}{}", self.base_url, MAP_PATH)
    }

    /// URL of the detail page for incident `id`.
    pub fn problem_url(&self, id: &str) -> String {
        format!("{}{}/{}", self.base_url, PROBLEM_PATH, id)
    }

    pub async fn fetch_map(&self) -> Result<String, ExtractError> {
        self.fetch_raw_html(&self.map_url()).await
    }

    pub async fn fetch_problem(&self, id: &str) -> Result<String, ExtractError> {
        self.fetch_raw_html(&self.problem_url(id)).await
    }

    /// GET `url` and return the body text. Non-2xx and empty bodies are failures.
    async fn fetch_raw_html(&self, url: &str) -> Result<String, ExtractError> {
        tracing::debug!(url, "fetching html");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ExtractError::Transport {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(ExtractError::UnexpectedStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| ExtractError::Transport {
                url: url.to_string(),
                source,
            })?;

        if body.is_empty() {
            return Err(ExtractError::NoResponseBody {
                url: url.to_string(),
            });
        }

        Ok(body)
    }
}
