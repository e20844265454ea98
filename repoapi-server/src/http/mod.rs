//! HTTP layer
//!
//! Axum server with:
//! - Request-scoped API contexts built by middleware
//! - Uniform JSON error bodies
//! - `Link` pagination headers on listings

pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;

pub use error::{ApiError, ErrorBody, ErrorPayload};
pub use server::{build_router, run_server, AppState, ServerConfig, ServerError};
