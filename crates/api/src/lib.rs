//! HTTP API layer for cinewix.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: authentication, catalog, bookings, profile, admin
//! - **Extractors**: authenticated user, admin gate
//! - **Middleware**: token authentication, application state
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{auth_middleware, AppState, TOKEN_COOKIE};
pub use response::{ApiResponse, Empty};
