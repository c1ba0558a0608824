// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Access matrix completeness ("ok" or "incomplete").
    pub matrix: String,
    /// Token verification ("ok", "development" or "unconfigured").
    pub auth: String,
    /// FuelSync backend reachability (if configured).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}

/// Simple health check response for liveness checks.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

fn check_matrix(state: &AppState) -> &'static str {
    let missing = state.matrix.missing_entries();
    if missing.is_empty() {
        "ok"
    } else {
        tracing::warn!(missing = missing.len(), "Access matrix is incomplete");
        "incomplete"
    }
}

fn check_auth(state: &AppState) -> &'static str {
    if state.auth_config.decoding_key.is_some() {
        "ok"
    } else if cfg!(feature = "dev") {
        "development"
    } else {
        "unconfigured"
    }
}

async fn check_backend(state: &AppState) -> Option<String> {
    let backend = state.backend.as_ref()?;
    match backend.health().await {
        Ok(()) => Some("ok".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "FuelSync backend health check failed");
            Some("unavailable".to_string())
        }
    }
}

/// Health check endpoint handler.
///
/// Returns 200 if all checks pass, 503 if any check fails.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse),
        (status = 503, description = "Service is unhealthy", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let matrix = check_matrix(&state);
    let auth = check_auth(&state);
    let backend = check_backend(&state).await;

    let backend_ok = backend.as_deref().map(|s| s == "ok").unwrap_or(true);
    let all_ok = matrix == "ok" && auth != "unconfigured" && backend_ok;

    let response = ReadyResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            matrix: matrix.to_string(),
            auth: auth.to_string(),
            backend,
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness check handler.
///
/// Always returns 200 if the process is running.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness check handler.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(state: State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    health(state).await
}
