//! API endpoints.

mod admin;
mod auth;
mod bookings;
mod movies;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/movies", movies::router())
        .nest("/bookings", bookings::router())
        .nest("/users", users::router())
        .nest("/admin", admin::router())
}
