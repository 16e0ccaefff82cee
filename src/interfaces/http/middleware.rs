//! Authentication middleware for Axum
//!
//! Resolves the `Authorization: Token <hub token>` header to an active
//! partner and attaches the identity to the request.
//!
//! [`require_cpo`] and [`require_emsp`] are not mounted on any current
//! route; the credentials module serves both partner types. They are meant
//! for role-specific modules, layered after the resolver.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::counter;
use tracing::warn;

use crate::application::CredentialsService;
use crate::domain::partner::PartnerType;
use crate::interfaces::http::common::{ApiError, CallPolicy};
use crate::shared::DomainError;

/// Optional scheme in front of the token; matched case-sensitively.
pub const TOKEN_PREFIX: &str = "Token ";

/// State for [`partner_auth_middleware`]
#[derive(Clone)]
pub struct AuthState {
    pub service: Arc<CredentialsService>,
    pub calls: CallPolicy,
}

/// Partner resolved from the bearer token, stored in request extensions.
#[derive(Clone, Debug)]
pub struct AuthenticatedPartner {
    pub partner_id: String,
    pub partner_type: PartnerType,
    /// The hub token presented on this request
    pub token: String,
}

/// Strip an optional `Token ` prefix. Blank credentials count as missing.
pub fn extract_token(header_value: &str) -> Option<&str> {
    let token = header_value
        .strip_prefix(TOKEN_PREFIX)
        .unwrap_or(header_value);
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn rejection_reason(error: &DomainError) -> &'static str {
    match error {
        DomainError::Unauthorized(msg) if msg == "partner is not active" => "inactive",
        DomainError::Unauthorized(_) => "invalid",
        _ => "error",
    }
}

fn reject(reason: &'static str, error: DomainError) -> Response {
    counter!("ocpi_auth_rejections_total", "reason" => reason).increment(1);
    warn!(reason, error = %error, "Partner authentication rejected");
    ApiError::from(error).into_response()
}

/// Token authentication for partner-facing OCPI routes.
///
/// No directory lookup happens when the header is absent or blank.
pub async fn partner_auth_middleware(
    State(state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_token)
        .map(String::from);
    let Some(token) = token else {
        return reject(
            "missing",
            DomainError::Unauthorized("missing authorization token".into()),
        );
    };

    let ctx = state.calls.context();
    match state.service.validate_token(&ctx, &token).await {
        Ok(partner) => {
            request.extensions_mut().insert(AuthenticatedPartner {
                partner_id: partner.partner_id,
                partner_type: partner.partner_type,
                token,
            });
            next.run(request).await
        }
        Err(e) => reject(rejection_reason(&e), e),
    }
}

/// Only CPO partners may pass.
pub async fn require_cpo(request: Request<Body>, next: Next) -> Response {
    require_partner_type(PartnerType::Cpo, request, next).await
}

/// Only eMSP partners may pass.
pub async fn require_emsp(request: Request<Body>, next: Next) -> Response {
    require_partner_type(PartnerType::Emsp, request, next).await
}

async fn require_partner_type(
    required: PartnerType,
    request: Request<Body>,
    next: Next,
) -> Response {
    match request.extensions().get::<AuthenticatedPartner>() {
        Some(partner) if partner.partner_type == required => next.run(request).await,
        Some(partner) => {
            warn!(partner_id = %partner.partner_id, required = %required, "Role gate rejected partner");
            ApiError::from(DomainError::Forbidden(format!(
                "This endpoint requires {} role",
                required
            )))
            .into_response()
        }
        None => ApiError::from(DomainError::Unauthorized(
            "missing authorization token".into(),
        ))
        .into_response(),
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{middleware, Extension, Router};
    use tower::ServiceExt;

    use crate::application::HubSettings;
    use crate::domain::partner::{
        CredentialRole, CredentialsRequest, PartnerRepository, PartnerStatus, Role,
    };
    use crate::infrastructure::crypto::OsTokenIssuer;
    use crate::infrastructure::storage::InMemoryPartnerRepository;
    use crate::shared::CallContext;

    struct Fixture {
        state: AuthState,
        repo: Arc<InMemoryPartnerRepository>,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(InMemoryPartnerRepository::new());
        let service = CredentialsService::new(
            repo.clone(),
            Arc::new(OsTokenIssuer),
            HubSettings::default(),
        );
        Fixture {
            state: AuthState {
                service: Arc::new(service),
                calls: CallPolicy::default(),
            },
            repo,
        }
    }

    async fn register(state: &AuthState, role: Role, party: &str) -> String {
        let partner_type = match role {
            Role::Emsp => PartnerType::Emsp,
            _ => PartnerType::Cpo,
        };
        state
            .service
            .register(
                &CallContext::new(),
                CredentialsRequest {
                    token: "partner-token".into(),
                    url: "https://partner.example/ocpi".into(),
                    roles: vec![CredentialRole::new(role, party, "DE")],
                },
                partner_type,
            )
            .await
            .unwrap()
            .token
    }

    async fn whoami(Extension(partner): Extension<AuthenticatedPartner>) -> String {
        partner.partner_id
    }

    fn app(state: AuthState) -> Router {
        let cpo_only = Router::new()
            .route("/cpo", get(whoami))
            .route_layer(middleware::from_fn(require_cpo));
        let emsp_only = Router::new()
            .route("/emsp", get(whoami))
            .route_layer(middleware::from_fn(require_emsp));

        Router::new()
            .route("/me", get(whoami))
            .merge(cpo_only)
            .merge(emsp_only)
            .route_layer(middleware::from_fn_with_state(state, partner_auth_middleware))
    }

    async fn call(app: Router, path: &str, auth: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri(path);
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let resp = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn token_prefix_is_optional_and_case_sensitive() {
        assert_eq!(extract_token("Token abc"), Some("abc"));
        assert_eq!(extract_token("abc"), Some("abc"));
        assert_eq!(extract_token("token abc"), Some("token abc"));
        assert_eq!(extract_token("Token "), None);
        assert_eq!(extract_token(""), None);
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let f = fixture();
        let (status, body) = call(app(f.state), "/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("missing authorization token"));
        assert!(body.contains("2001"));
    }

    #[tokio::test]
    async fn bare_prefix_counts_as_missing() {
        let f = fixture();
        let (status, body) = call(app(f.state), "/me", Some("Token ")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("missing authorization token"));
    }

    #[tokio::test]
    async fn unknown_token_is_rejected() {
        let f = fixture();
        let (status, body) = call(app(f.state), "/me", Some("Token nope")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("invalid token"));
    }

    #[tokio::test]
    async fn valid_token_with_or_without_prefix_resolves_partner() {
        let f = fixture();
        let token = register(&f.state, Role::Cpo, "ABC").await;

        let (status, body) = call(app(f.state.clone()), "/me", Some(&format!("Token {token}"))).await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "DE-ABC"));

        let (status, body) = call(app(f.state), "/me", Some(&token)).await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "DE-ABC"));
    }

    #[tokio::test]
    async fn suspended_partner_is_rejected() {
        let f = fixture();
        let token = register(&f.state, Role::Cpo, "ABC").await;
        f.repo
            .update_status(&CallContext::new(), "DE-ABC", PartnerStatus::Suspended)
            .await
            .unwrap();

        let (status, body) = call(app(f.state), "/me", Some(&token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("partner is not active"));
    }

    #[tokio::test]
    async fn role_gates_compare_partner_type() {
        let f = fixture();
        let cpo = register(&f.state, Role::Cpo, "ABC").await;
        let emsp = register(&f.state, Role::Emsp, "XYZ").await;

        let (status, _) = call(app(f.state.clone()), "/cpo", Some(&cpo)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(app(f.state.clone()), "/emsp", Some(&cpo)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains("This endpoint requires EMSP role"));

        let (status, body) = call(app(f.state), "/cpo", Some(&emsp)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains("This endpoint requires CPO role"));
    }
}
