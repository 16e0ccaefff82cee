//! Credentials API handlers
//!
//! `POST` is the public registration entry point. `GET`, `PUT` and `DELETE`
//! run behind [`partner_auth_middleware`] and act on the authenticated
//! partner's own record.
//!
//! [`partner_auth_middleware`]: crate::interfaces::http::middleware::partner_auth_middleware

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Extension, Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::dto::{CredentialsDto, CredentialsResponseDto};
use crate::application::CredentialsService;
use crate::domain::partner::PartnerType;
use crate::interfaces::http::common::{ApiResult, CallPolicy, OcpiResponse, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedPartner;

/// Header consulted for the partner type when `?type=` is absent
pub const PARTNER_TYPE_HEADER: &str = "x-partner-type";

/// Credentials handler state
#[derive(Clone)]
pub struct CredentialsState {
    pub service: Arc<CredentialsService>,
    pub calls: CallPolicy,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RegisterParams {
    /// CPO or EMSP; defaults to CPO
    #[serde(rename = "type")]
    pub partner_type: Option<String>,
}

/// Query parameter first, then header; anything unrecognised means CPO.
pub fn select_partner_type(query: Option<&str>, headers: &HeaderMap) -> PartnerType {
    query
        .or_else(|| {
            headers
                .get(PARTNER_TYPE_HEADER)
                .and_then(|h| h.to_str().ok())
        })
        .and_then(PartnerType::parse)
        .unwrap_or(PartnerType::Cpo)
}

#[utoipa::path(
    post,
    path = "/ocpi/{version}/credentials",
    tag = "Credentials",
    params(
        ("version" = String, Path, description = "OCPI version"),
        RegisterParams
    ),
    request_body = CredentialsDto,
    responses(
        (status = 200, description = "Partner registered", body = OcpiResponse<CredentialsResponseDto>),
        (status = 400, description = "Malformed request or invalid roles"),
        (status = 409, description = "Partner already registered")
    )
)]
pub async fn register(
    State(state): State<CredentialsState>,
    Query(params): Query<RegisterParams>,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<CredentialsDto>,
) -> ApiResult<CredentialsResponseDto> {
    let partner_type = select_partner_type(params.partner_type.as_deref(), &headers);
    let response = state
        .service
        .register(&state.calls.context(), body.into(), partner_type)
        .await?;
    Ok(Json(OcpiResponse::success(response.into())))
}

#[utoipa::path(
    get,
    path = "/ocpi/{version}/credentials",
    tag = "Credentials",
    params(("version" = String, Path, description = "OCPI version")),
    responses(
        (status = 200, description = "Hub credentials", body = OcpiResponse<CredentialsResponseDto>),
        (status = 401, description = "Missing, unknown or inactive token")
    ),
    security(("token_auth" = []))
)]
pub async fn get_credentials(
    State(state): State<CredentialsState>,
    Extension(partner): Extension<AuthenticatedPartner>,
) -> ApiResult<CredentialsResponseDto> {
    let response = state
        .service
        .get_credentials(&state.calls.context(), &partner.token)
        .await?;
    Ok(Json(OcpiResponse::success(response.into())))
}

#[utoipa::path(
    put,
    path = "/ocpi/{version}/credentials",
    tag = "Credentials",
    params(("version" = String, Path, description = "OCPI version")),
    request_body = CredentialsDto,
    responses(
        (status = 200, description = "Credentials updated, hub token rotated", body = OcpiResponse<CredentialsResponseDto>),
        (status = 400, description = "Malformed request or invalid roles"),
        (status = 401, description = "Missing, unknown or inactive token")
    ),
    security(("token_auth" = []))
)]
pub async fn update_credentials(
    State(state): State<CredentialsState>,
    Extension(partner): Extension<AuthenticatedPartner>,
    ValidatedJson(body): ValidatedJson<CredentialsDto>,
) -> ApiResult<CredentialsResponseDto> {
    let response = state
        .service
        .update_credentials(&state.calls.context(), &partner.token, body.into())
        .await?;
    Ok(Json(OcpiResponse::success(response.into())))
}

#[utoipa::path(
    delete,
    path = "/ocpi/{version}/credentials",
    tag = "Credentials",
    params(("version" = String, Path, description = "OCPI version")),
    responses(
        (status = 200, description = "Partner deregistered", body = OcpiResponse<String>),
        (status = 401, description = "Missing, unknown or inactive token")
    ),
    security(("token_auth" = []))
)]
pub async fn delete_credentials(
    State(state): State<CredentialsState>,
    Extension(partner): Extension<AuthenticatedPartner>,
) -> ApiResult<()> {
    state
        .service
        .delete_credentials(&state.calls.context(), &partner.token)
        .await?;
    Ok(Json(OcpiResponse::empty(
        "Partner registration deleted successfully",
    )))
}
