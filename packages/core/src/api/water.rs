use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::AppState;
use crate::outage::OutageRecord;

#[derive(Debug, Deserialize)]
pub struct WaterQuery {
    /// Latin location title, as produced by the transliteration.
    pub location: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpcomingOutagesResponse {
    pub location: String,
    pub outages: Vec<OutageRecord>,
}

/// `GET /water`
///
/// Without parameters this only acknowledges the request. With
/// `?location=<title_lat>` it returns the outages at that location that
/// start after the current time.
pub async fn water(State(state): State<AppState>, Query(query): Query<WaterQuery>) -> Response {
    tracing::info!(location = ?query.location, "handling a water request");

    let Some(location) = query.location.filter(|l| !l.trim().is_empty()) else {
        return (StatusCode::OK, "ok").into_response();
    };

    match state.store.query_upcoming(&location, Utc::now()).await {
        Ok(outages) => Json(UpcomingOutagesResponse { location, outages }).into_response(),
        Err(err) => {
            tracing::error!(%location, "Failed to query upcoming outages: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "failed to query outages" })),
            )
                .into_response()
        }
    }
}
