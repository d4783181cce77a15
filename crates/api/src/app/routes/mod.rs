use axum::{
    routing::{get, post},
    Router,
};

pub mod admin;
pub mod auth;
pub mod navigation;
pub mod system;

/// Endpoints reachable without a session.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/admin/login", get(admin::login_page))
}

/// Endpoints that need a session but describe only the caller.
pub fn session_router() -> Router {
    Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/navigation", get(navigation::navigation))
        .route("/api/actions", get(navigation::actions))
        .route("/api/authz/explain", get(navigation::explain))
}

/// Back-office pages, guarded by the page table.
pub fn page_router() -> Router {
    Router::new()
        .route("/admin", get(admin::page))
        .route("/admin/:section", get(admin::page))
}
