//! Authentication endpoints.

use axum::response::{IntoResponse, Response};
use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cinewix_common::AppResult;
use cinewix_core::{
    LoginInput, LoginOutcome, RegisterInput, ResendLoginOtpInput, ResetPasswordInput,
    VerifyEmailInput, VerifyLoginOtpInput,
};
use cinewix_db::entities::user;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::extractors::AuthUser;
use crate::middleware::{AppState, TOKEN_COOKIE};
use crate::response::{ApiResponse, Empty};

/// Registration response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: String,
}

/// Register a new account. A six digit verification code is emailed.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterInput>,
) -> AppResult<ApiResponse<RegisterResponse>> {
    let user = state.auth_service.register(req).await?;

    Ok(
        ApiResponse::created(RegisterResponse { user_id: user.id })
            .with_message("Registration successful. Check your email for the verification code."),
    )
}

/// Token response shared by the verify endpoints.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub user: user::Model,
}

/// Confirm the emailed verification code and open a session.
async fn verify_email(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<VerifyEmailInput>,
) -> AppResult<(CookieJar, ApiResponse<SessionResponse>)> {
    let (user, token) = state.auth_service.verify_email(req).await?;
    let jar = jar.add(session_cookie(&token, state.auth_service.token_days()));

    Ok((
        jar,
        ApiResponse::ok(SessionResponse { token, user }).with_message("Email verified"),
    ))
}

/// Resend verification request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendVerificationRequest {
    pub user_id: String,
}

/// Send a fresh verification code to an unverified account.
async fn resend_verification(
    State(state): State<AppState>,
    Json(req): Json<ResendVerificationRequest>,
) -> AppResult<ApiResponse<Empty>> {
    state.auth_service.resend_verification(&req.user_id).await?;

    Ok(ApiResponse::message("Verification code sent"))
}

/// OTP step response for a successful credential check.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: String,
    pub require_otp: bool,
}

/// First login step: check credentials and email a one time code.
///
/// An unverified account gets a 401 carrying `needVerification` so the
/// client can route to the verification screen instead of the OTP one.
async fn login(State(state): State<AppState>, Json(req): Json<LoginInput>) -> AppResult<Response> {
    match state.auth_service.login(req).await? {
        LoginOutcome::OtpSent { user_id } => Ok(ApiResponse::ok(LoginResponse {
            user_id,
            require_otp: true,
        })
        .with_message("A login code has been sent to your email")
        .into_response()),
        LoginOutcome::NeedsVerification { user_id } => Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "success": false,
                "message": "Email not verified. Check your inbox for the verification code.",
                "needVerification": true,
                "userId": user_id,
            })),
        )
            .into_response()),
    }
}

/// Second login step: confirm the emailed OTP and open a session.
async fn verify_login_otp(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<VerifyLoginOtpInput>,
) -> AppResult<(CookieJar, ApiResponse<SessionResponse>)> {
    let (user, token) = state.auth_service.verify_login_otp(req).await?;
    let jar = jar.add(session_cookie(&token, state.auth_service.token_days()));

    Ok((
        jar,
        ApiResponse::ok(SessionResponse { token, user }).with_message("Login successful"),
    ))
}

/// Send a fresh login OTP.
async fn resend_login_otp(
    State(state): State<AppState>,
    Json(req): Json<ResendLoginOtpInput>,
) -> AppResult<ApiResponse<Empty>> {
    state.auth_service.resend_login_otp(req).await?;

    Ok(ApiResponse::message("A new login code has been sent"))
}

/// Forgot password request.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Email a password reset link.
async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> AppResult<ApiResponse<Empty>> {
    state.auth_service.forgot_password(&req.email).await?;

    Ok(ApiResponse::message("Password reset email sent"))
}

/// Set a new password using an emailed reset token.
async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordInput>,
) -> AppResult<ApiResponse<Empty>> {
    state.auth_service.reset_password(req).await?;

    Ok(ApiResponse::message("Password updated. You can now sign in."))
}

/// Current user response.
#[derive(Serialize)]
pub struct MeResponse {
    pub user: user::Model,
}

/// Return the authenticated user.
async fn me(AuthUser(user): AuthUser) -> ApiResponse<MeResponse> {
    ApiResponse::ok(MeResponse { user })
}

/// Clear the session cookie.
async fn logout(jar: CookieJar) -> (CookieJar, ApiResponse<Empty>) {
    let jar = jar.remove(Cookie::build(TOKEN_COOKIE).path("/"));

    (jar, ApiResponse::message("Logged out"))
}

fn session_cookie(token: &str, token_days: i64) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token.to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(token_days))
        .build()
}

/// Create the authentication router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/verify-email", post(verify_email))
        .route("/resend-verification", post(resend_verification))
        .route("/login", post(login))
        .route("/verify-login-otp", post(verify_login_otp))
        .route("/resend-login-otp", post(resend_login_otp))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/me", get(me))
        .route("/logout", post(logout))
}
