//! OCPI router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{CredentialsService, HubSettings};
use crate::interfaces::http::common::CallPolicy;
use crate::interfaces::http::middleware::{partner_auth_middleware, AuthState};
use crate::interfaces::http::modules::{credentials, health, metrics, request_id, versions};

/// Unified router state. Each handler extracts its own slice via `FromRef`.
#[derive(Clone)]
pub struct OcpiAppState {
    pub service: Arc<CredentialsService>,
    pub calls: CallPolicy,
    pub started_at: Arc<Instant>,
    pub metrics: metrics::MetricsState,
}

impl OcpiAppState {
    pub fn new(service: Arc<CredentialsService>, calls: CallPolicy) -> Self {
        Self {
            service,
            calls,
            started_at: Arc::new(Instant::now()),
            metrics: metrics::MetricsState::default(),
        }
    }

    pub fn with_metrics(mut self, metrics: metrics::MetricsState) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn hub(&self) -> &HubSettings {
        self.service.hub()
    }
}

impl FromRef<OcpiAppState> for credentials::CredentialsState {
    fn from_ref(s: &OcpiAppState) -> Self {
        credentials::CredentialsState {
            service: Arc::clone(&s.service),
            calls: s.calls.clone(),
        }
    }
}

impl FromRef<OcpiAppState> for AuthState {
    fn from_ref(s: &OcpiAppState) -> Self {
        AuthState {
            service: Arc::clone(&s.service),
            calls: s.calls.clone(),
        }
    }
}

impl FromRef<OcpiAppState> for health::HealthState {
    fn from_ref(s: &OcpiAppState) -> Self {
        health::HealthState {
            service: Arc::clone(&s.service),
            calls: s.calls.clone(),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

impl FromRef<OcpiAppState> for versions::VersionsState {
    fn from_ref(s: &OcpiAppState) -> Self {
        versions::VersionsState {
            hub: s.hub().clone(),
        }
    }
}

impl FromRef<OcpiAppState> for metrics::MetricsState {
    fn from_ref(s: &OcpiAppState) -> Self {
        s.metrics.clone()
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token_auth",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "Hub token issued at registration, optionally prefixed with `Token `",
                ))),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        versions::list_versions,
        versions::version_details,
        credentials::register,
        credentials::get_credentials,
        credentials::update_credentials,
        credentials::delete_credentials,
    ),
    components(
        schemas(
            credentials::CredentialsDto,
            credentials::CredentialsResponseDto,
            credentials::CredentialRoleDto,
            credentials::BusinessDetailsDto,
            credentials::ImageDto,
            versions::VersionDto,
            versions::VersionDetailsDto,
            versions::EndpointDto,
            versions::InterfaceRole,
            health::HealthResponse,
            health::DirectoryHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service and partner directory health"),
        (name = "Versions", description = "OCPI version discovery"),
        (name = "Credentials", description = "Partner registration, credential rotation and deregistration"),
    ),
    info(
        title = "ChargeSphere OCPI Hub API",
        version = "1.0.0",
        description = "Credentials handshake between CPOs, eMSPs and the hub",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(state: OcpiAppState) -> Router {
    let auth_state = AuthState::from_ref(&state);
    let version = state.hub().version.clone();

    // POST is the unauthenticated handshake entry; the rest act on the
    // caller's own registration.
    let credentials_routes = post(credentials::register).merge(
        get(credentials::get_credentials)
            .put(credentials::update_credentials)
            .delete(credentials::delete_credentials)
            .route_layer(middleware::from_fn_with_state(
                auth_state,
                partner_auth_middleware,
            )),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::prometheus_metrics))
        .route("/ocpi/versions", get(versions::list_versions))
        .route("/ocpi/{version}/details", get(versions::version_details))
        .route(&format!("/ocpi/{}/credentials", version), credentials_routes)
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Tests ──────────────────────────────────────────────────────
