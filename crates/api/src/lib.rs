//! HTTP API: server wiring, session guards, and request/response mapping.

pub mod app;
pub mod config;
pub mod context;
pub mod cookies;
pub mod credentials;
pub mod middleware;
