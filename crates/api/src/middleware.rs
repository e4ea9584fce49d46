//! API middleware.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use cinewix_core::{AdminService, AuthService, BookingService, MovieService, UserService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub movie_service: MovieService,
    pub booking_service: BookingService,
    pub admin_service: AdminService,
}

/// Name of the session cookie set on login.
pub const TOKEN_COOKIE: &str = "token";

/// Authentication middleware.
///
/// Accepts a bearer token in the `Authorization` header or the session
/// cookie, with the header taking precedence. A valid token puts the
/// user model into request extensions for the [`crate::extractors`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = extract_token(&req, &jar) {
        if let Ok(user) = state.auth_service.authenticate(&token).await {
            req.extensions_mut().insert(user);
        }
    }

    next.run(req).await
}

fn extract_token(req: &Request<Body>, jar: &CookieJar) -> Option<String> {
    if let Some(auth_header) = req.headers().get("Authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_owned());
            }
        }
    }

    jar.get(TOKEN_COOKIE).map(|c| c.value().to_owned())
}
