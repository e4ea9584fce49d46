//! Profile endpoints.

use axum::extract::{Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use cinewix_common::{AppError, AppResult};
use cinewix_core::UpdateProfileInput;
use cinewix_db::entities::user;
use serde::Serialize;

use crate::extractors::AuthUser;
use crate::middleware::AppState;
use crate::response::ApiResponse;

/// Profile response.
#[derive(Serialize)]
pub struct ProfileResponse {
    pub user: user::Model,
}

/// Fetch the caller's profile.
async fn profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let user = state.user_service.get_profile(&user.id).await?;

    Ok(ApiResponse::ok(ProfileResponse { user }))
}

/// Update name, email or phone on the caller's profile.
async fn update_profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let user = state.user_service.update_profile(&user.id, req).await?;

    Ok(ApiResponse::ok(ProfileResponse { user }).with_message("Profile updated"))
}

/// Upload a profile photo as multipart form data under the `photo` field.
async fn upload_photo(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<ProfileResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("photo") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("photo").to_owned();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let user = state
            .user_service
            .update_photo(&user.id, &file_name, &content_type, &data)
            .await?;

        return Ok(ApiResponse::ok(ProfileResponse { user }).with_message("Profile photo updated"));
    }

    Err(AppError::BadRequest("Missing photo field".to_owned()))
}

/// Create the profile router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile).put(update_profile))
        .route("/profile/photo", post(upload_photo))
}
