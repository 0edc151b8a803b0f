//! water.gov.ge outage provider
//!
//! Adapts [`WaterGovGeClient`] and [`WaterGovGeParser`] to the
//! [`OutageProvider`] trait. One failed incident page voids the whole
//! fetch, so callers never see a silently partial outage list.

use async_trait::async_trait;

use crate::outage::{
    error::ExtractError,
    parser::{marker_location, WaterGovGeParser},
    provider::OutageProvider,
    types::{MapMarker, OutageRecord},
};
use crate::services::water_gov_ge::WaterGovGeClient;

/// Provider that scrapes active outages from water.gov.ge
pub struct WaterGovGeExtractor {
    client: WaterGovGeClient,
    parser: WaterGovGeParser,
}

impl WaterGovGeExtractor {
    pub fn new(client: WaterGovGeClient) -> Self {
        Self {
            client,
            parser: WaterGovGeParser::new(),
        }
    }

    /// Fetch and decode the listing, keeping only markers flagged as problems.
    async fn fetch_problem_markers(&self) -> Result<Vec<MapMarker>, ExtractError> {
        let map_html = self.client.fetch_map().await?;
        let markers = self.parser.parse_map_markers(&map_html)?;
        let total = markers.len();

        let problems: Vec<MapMarker> = markers.into_iter().filter(|m| m.problem).collect();
        tracing::debug!(total, problems = problems.len(), "parsed map markers");

        Ok(problems)
    }

    async fn fetch_problem(&self, marker: &MapMarker) -> Result<OutageRecord, ExtractError> {
        let id = marker.id.trim();
        let html = self.client.fetch_problem(id).await?;
        let location = marker_location(marker);
        self.parser.parse_incident(location, &html)
    }
}

#[async_trait]
impl OutageProvider for WaterGovGeExtractor {
    async fn fetch_all(&self) -> Result<Vec<OutageRecord>, ExtractError> {
        let markers = self.fetch_problem_markers().await?;

        let mut outages = Vec::with_capacity(markers.len());
        for marker in &markers {
            let outage = self
                .fetch_problem(marker)
                .await
                .map_err(|err| err.for_incident(marker.id.trim()))?;
            outages.push(outage);
        }

        Ok(outages)
    }

    fn provider_name(&self) -> &str {
        "water.gov.ge"
    }
}
