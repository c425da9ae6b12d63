//! Stateless signed-token authentication for axum services.
//!
//! - [`wire`]: domain value <-> signable JSON
//! - [`services::auth`]: engines (sign / verify / acquire / refresh) and the
//!   middleware registry
//! - [`middleware::auth::access`]: the per-request dispatcher
pub mod api;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
pub mod wire;
