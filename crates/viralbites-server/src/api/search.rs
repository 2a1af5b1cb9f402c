//! Venue search and diagnostics handlers.
//!
//! - `POST /api/v1/search`: discover, verify and rank viral venues
//! - `POST /api/v1/diagnostics`: run the self-check probes

use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use viralbites_core::{Coordinates, UserSettings};
use viralbites_pipeline::{run_diagnostics, PipelineError, SearchPipeline, SearchResults, TestResult};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SearchRequest {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    query: String,
    #[serde(default)]
    settings: UserSettings,
}

impl SearchRequest {
    fn origin(&self, req_id: &str) -> Result<Coordinates, ApiError> {
        let valid_lat = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let valid_lon = self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);
        if valid_lat && valid_lon {
            Ok(Coordinates::new(self.latitude, self.longitude))
        } else {
            Err(ApiError::new(
                req_id,
                "validation_error",
                format!(
                    "coordinates out of range: latitude {}, longitude {}",
                    self.latitude, self.longitude
                ),
            ))
        }
    }
}

fn require_pipeline<'a>(state: &'a AppState, req_id: &str) -> Result<&'a SearchPipeline, ApiError> {
    state.pipeline.as_deref().ok_or_else(|| {
        ApiError::new(
            req_id,
            "not_configured",
            "search is unavailable: GEMINI_API_KEY is not configured",
        )
    })
}

pub(super) fn map_pipeline_error(request_id: &str, error: &PipelineError) -> ApiError {
    let code = match error {
        PipelineError::NoPlacesFound => "no_results",
        PipelineError::Unauthorized(_) => "upstream_unauthorized",
        PipelineError::Discovery(_) => "upstream_failed",
        PipelineError::Config(_) => "not_configured",
        PipelineError::Client(_) => "internal_error",
    };
    if matches!(error, PipelineError::NoPlacesFound) {
        tracing::info!("search finished without results");
    } else {
        tracing::error!(error = %error, code, "search failed");
    }
    ApiError::new(request_id, code, error.to_string())
}

pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<ApiResponse<SearchResults>>, ApiError> {
    let pipeline = require_pipeline(&state, &req_id.0)?;
    let origin = body.origin(&req_id.0)?;

    let results = pipeline
        .search(&origin, &body.query, &body.settings)
        .await
        .map_err(|e| map_pipeline_error(&req_id.0, &e))?;

    Ok(Json(ApiResponse {
        data: results,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn diagnostics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<TestResult>>>, ApiError> {
    let pipeline = require_pipeline(&state, &req_id.0)?;
    let results = run_diagnostics(pipeline).await;

    Ok(Json(ApiResponse {
        data: results,
        meta: ResponseMeta::new(req_id.0),
    }))
}
