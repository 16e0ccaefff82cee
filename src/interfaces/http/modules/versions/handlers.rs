//! Version discovery handlers
//!
//! Partners start the handshake here: the versions list points at the
//! details document, which advertises the credentials endpoint.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::HubSettings;
use crate::interfaces::http::common::{ApiError, ApiResult, OcpiResponse};

#[derive(Clone)]
pub struct VersionsState {
    pub hub: HubSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VersionDto {
    #[schema(example = "2.3")]
    pub version: String,
    /// Version details endpoint
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum InterfaceRole {
    Sender,
    Receiver,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EndpointDto {
    /// Module identifier, e.g. "credentials"
    pub identifier: String,
    pub role: InterfaceRole,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VersionDetailsDto {
    pub version: String,
    pub endpoints: Vec<EndpointDto>,
}

fn details_url(hub: &HubSettings) -> String {
    format!("{}/details", hub.hub_url)
}

#[utoipa::path(
    get,
    path = "/ocpi/versions",
    tag = "Versions",
    responses(
        (status = 200, description = "Supported OCPI versions", body = OcpiResponse<Vec<VersionDto>>)
    )
)]
pub async fn list_versions(State(state): State<VersionsState>) -> ApiResult<Vec<VersionDto>> {
    Ok(Json(OcpiResponse::success(vec![VersionDto {
        version: state.hub.version.clone(),
        url: details_url(&state.hub),
    }])))
}

#[utoipa::path(
    get,
    path = "/ocpi/{version}/details",
    tag = "Versions",
    params(("version" = String, Path, description = "OCPI version")),
    responses(
        (status = 200, description = "Endpoints of this version", body = OcpiResponse<VersionDetailsDto>),
        (status = 404, description = "Unsupported version")
    )
)]
pub async fn version_details(
    State(state): State<VersionsState>,
    Path(version): Path<String>,
) -> ApiResult<VersionDetailsDto> {
    if version != state.hub.version {
        return Err(ApiError::NotFound("unsupported version".into()));
    }

    let credentials_url = format!("{}/credentials", state.hub.hub_url);
    let endpoints = [InterfaceRole::Sender, InterfaceRole::Receiver]
        .into_iter()
        .map(|role| EndpointDto {
            identifier: "credentials".into(),
            role,
            url: credentials_url.clone(),
        })
        .collect();

    Ok(Json(OcpiResponse::success(VersionDetailsDto {
        version,
        endpoints,
    })))
}
