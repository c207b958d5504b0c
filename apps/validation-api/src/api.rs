//! API handlers for the validation server
//!
//! Provides REST endpoints for:
//! - Global validation of a persona's asset set
//! - Auto-fix (regenerate below-threshold messaging/script)

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use shared_types::{AutoFixOutcome, AutoFixResult, GlobalValidationResult, ValidationRequest};
use tracing::info;
use validation_core::{AutoFixOptions, PipelineError};

use crate::error::ApiError;
use crate::state::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "validation-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Success envelope. `error` is only set on the blocked auto-fix reply,
/// which still carries its result in `data`.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

/// Handler: POST /validate/global
pub async fn handle_validate_global(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ValidationRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<GlobalValidationResult>>, ApiError> {
    let Json(request) = payload?;
    info!("Global validation for persona {}", request.persona_id);

    let result = state
        .coordinator
        .validate(&request)
        .await
        .map_err(PipelineError::from)?;

    Ok(Json(ApiResponse::ok(result)))
}

/// Auto-fix request: the validation ids plus fix options
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoFixRequest {
    #[serde(flatten)]
    pub ids: ValidationRequest,

    /// Minimum acceptable overall score, in `[0, 1]`
    pub threshold: Option<f64>,

    pub fix_messaging: Option<bool>,

    pub fix_script: Option<bool>,
}

impl AutoFixRequest {
    pub fn options(&self) -> Result<AutoFixOptions, ApiError> {
        let defaults = AutoFixOptions::default();
        let threshold = self.threshold.unwrap_or(defaults.threshold);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ApiError::InvalidRequest(format!(
                "threshold must be between 0 and 1, got {}",
                threshold
            )));
        }

        Ok(AutoFixOptions {
            threshold,
            fix_messaging: self.fix_messaging.unwrap_or(defaults.fix_messaging),
            fix_script: self.fix_script.unwrap_or(defaults.fix_script),
        })
    }
}

/// Handler: POST /validate/auto-fix
///
/// Hard-check failures answer 400 but still carry the full result so the
/// caller can show what blocked the fix.
pub async fn handle_auto_fix(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AutoFixRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<AutoFixResult>>), ApiError> {
    let Json(request) = payload?;
    let options = request.options()?;
    info!(
        "Auto-fix for persona {} (threshold {:.2})",
        request.ids.persona_id, options.threshold
    );

    let result = state.orchestrator.auto_fix(&request.ids, &options).await?;

    if result.outcome == AutoFixOutcome::HardChecksFailed {
        let error = format!(
            "Hard checks failed with {} error(s); auto-fix was not applied",
            result.hard_checks.errors.len()
        );
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse {
                success: false,
                data: result,
                error: Some(error),
            }),
        ));
    }

    Ok((StatusCode::OK, Json(ApiResponse::ok(result))))
}
