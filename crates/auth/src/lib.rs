//! `gatehouse-auth`: signed sessions and role-based authorization for the
//! full server environment.
//!
//! Decoupled from HTTP: the transport layer hands over cookie access and
//! the request's method and path, and gets back a principal and a decision.

pub mod authorize;
pub mod codec;
pub mod policy;
pub mod session;
pub mod signature;

pub use authorize::{
    AuthorizationExplanation, AuthzError, Decision, Denial, Grant, Resource, authorize,
    explain_authorization,
};
pub use codec::TokenCodec;
pub use policy::{ApiRule, NamedRule, PathPattern, PolicyError, PolicyTable, RoleSet};
pub use session::{CookieJar, SameSite, SessionCookie, SessionManager};
