//! HTTP application wiring (Axum router + shared state).
//!
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, middleware::from_fn_with_state};
use tower::ServiceBuilder;
use uuid::Uuid;

use gatehouse_auth::{PolicyTable, SessionManager, TokenCodec};
use gatehouse_core::{Identity, Role, SigningSecret, SubjectId};
use gatehouse_edge::{EdgeGate, EdgeVerifier, GateConfig};

use crate::config::AppConfig;
use crate::credentials::{CredentialCheck, StaticCredentials};
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Everything a request needs; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub policy: Arc<PolicyTable>,
    pub credentials: Arc<dyn CredentialCheck>,
    pub gate: Arc<EdgeGate>,
}

impl AppState {
    pub async fn new(
        secret: SigningSecret,
        secure_cookies: bool,
        policy: PolicyTable,
        credentials: Arc<dyn CredentialCheck>,
    ) -> Self {
        let verifier = EdgeVerifier::new(&secret).await;
        Self {
            sessions: Arc::new(SessionManager::new(TokenCodec::new(secret), secure_cookies)),
            policy: Arc::new(policy),
            credentials,
            gate: Arc::new(EdgeGate::new(verifier, GateConfig::default())),
        }
    }

    /// Standard policy, plus the bootstrap admin (as the super-role) when
    /// one is configured.
    pub async fn from_config(config: &AppConfig) -> Self {
        let mut credentials = StaticCredentials::new();
        if let Some(admin) = &config.bootstrap_admin {
            let identity = Identity {
                subject_id: SubjectId::new(Uuid::now_v7().to_string()),
                role: Role::SUPER,
                email: admin.email.clone(),
                display_name: admin.display_name.clone(),
            };
            credentials = credentials.with_account(identity, admin.password.clone());
        }

        Self::new(
            config.session_secret.clone(),
            config.secure_cookies(),
            PolicyTable::standard(),
            Arc::new(credentials),
        )
        .await
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(state: AppState) -> Router {
    assemble(state, Router::new())
}

/// Same as `build_app`, with a business router mounted behind the session
/// and API-policy guards. Rules match the path the client requested.
/// `business` must have at least one route.
pub fn build_app_with(state: AppState, business: Router) -> Router {
    let guarded = guard_api(&state, business);
    assemble(state, guarded)
}

/// Session first, then the API table.
pub fn guard_api(state: &AppState, business: Router) -> Router {
    business.route_layer(
        ServiceBuilder::new()
            .layer(from_fn_with_state(state.clone(), middleware::require_session))
            .layer(from_fn_with_state(state.clone(), middleware::require_api_policy)),
    )
}

fn assemble(state: AppState, guarded: Router) -> Router {
    let session_only = routes::session_router().route_layer(from_fn_with_state(
        state.clone(),
        middleware::require_session,
    ));

    let pages = routes::page_router().route_layer(from_fn_with_state(
        state.clone(),
        middleware::require_page_access,
    ));

    Router::new()
        .merge(routes::public_router())
        .merge(session_only)
        .merge(pages)
        .merge(guarded)
        .layer(from_fn_with_state(state.clone(), middleware::edge_gate))
        .layer(Extension(state))
}
