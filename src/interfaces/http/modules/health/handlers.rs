//! Health check handler

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::CredentialsService;
use crate::interfaces::http::common::CallPolicy;

/// Health check state
#[derive(Clone)]
pub struct HealthState {
    pub service: Arc<CredentialsService>,
    pub calls: CallPolicy,
    pub started_at: Arc<Instant>,
}

/// Service health response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub directory: DirectoryHealth,
}

/// Partner directory probe result
#[derive(Debug, Serialize, ToSchema)]
pub struct DirectoryHealth {
    pub status: String,
    pub latency_ms: Option<u64>,
    pub partners: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Partner directory unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let uptime = state.started_at.elapsed().as_secs();

    let probe_start = Instant::now();
    let directory = match state.service.partner_count(&state.calls.context()).await {
        Ok(count) => DirectoryHealth {
            status: "ok".to_string(),
            latency_ms: Some(probe_start.elapsed().as_millis() as u64),
            partners: Some(count),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Health probe failed");
            DirectoryHealth {
                status: "error".to_string(),
                latency_ms: None,
                partners: None,
            }
        }
    };

    let (http_status, overall_status) = if directory.status == "ok" {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        http_status,
        Json(HealthResponse {
            status: overall_status.to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: uptime,
            directory,
        }),
    )
}
