//! Admin dashboard and management endpoints.

use axum::extract::{Path, State};
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use cinewix_common::AppResult;
use cinewix_core::{UpdateBookingStatusInput, UpdateUserRoleInput};
use cinewix_db::entities::{booking, movie, transaction, user};
use serde::Serialize;

use crate::extractors::AdminUser;
use crate::middleware::AppState;
use crate::response::{ApiResponse, Empty};

/// A booking paired with its customer.
#[derive(Serialize)]
pub struct BookingWithUser {
    #[serde(flatten)]
    pub booking: booking::Model,
    pub user: Option<user::Model>,
}

/// Dashboard response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub total_users: u64,
    pub total_movies: u64,
    pub total_bookings: u64,
    pub total_revenue: i64,
    pub recent_bookings: Vec<BookingWithUser>,
    pub recent_transactions: Vec<transaction::Model>,
}

/// Aggregate counts, revenue and recent activity.
async fn stats(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<DashboardResponse>> {
    let stats = state.admin_service.stats().await?;

    Ok(ApiResponse::ok(DashboardResponse {
        total_users: stats.total_users,
        total_movies: stats.total_movies,
        total_bookings: stats.total_bookings,
        total_revenue: stats.total_revenue,
        recent_bookings: stats
            .recent_bookings
            .into_iter()
            .map(|(booking, user)| BookingWithUser { booking, user })
            .collect(),
        recent_transactions: stats.recent_transactions,
    }))
}

/// User list response.
#[derive(Serialize)]
pub struct UserListResponse {
    pub users: Vec<user::Model>,
}

/// List every account.
async fn list_users(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserListResponse>> {
    let users = state.admin_service.list_users().await?;

    Ok(ApiResponse::ok(UserListResponse { users }))
}

/// Single user response.
#[derive(Serialize)]
pub struct UserResponse {
    pub user: user::Model,
}

/// Change an account's role.
async fn update_user_role(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateUserRoleInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.admin_service.update_user_role(&admin, req).await?;

    Ok(ApiResponse::ok(UserResponse { user }).with_message("Role updated"))
}

/// Delete an account.
async fn delete_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Empty>> {
    state.admin_service.delete_user(&admin, &id).await?;

    Ok(ApiResponse::message("User deleted"))
}

/// Movie list response, including inactive titles.
#[derive(Serialize)]
pub struct MovieListResponse {
    pub movies: Vec<movie::Model>,
}

/// List the full catalog, inactive titles included.
async fn list_movies(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<MovieListResponse>> {
    let movies = state.movie_service.list_all().await?;

    Ok(ApiResponse::ok(MovieListResponse { movies }))
}

/// A booking with its customer and movie.
#[derive(Serialize)]
pub struct BookingRow {
    #[serde(flatten)]
    pub booking: booking::Model,
    pub user: Option<user::Model>,
    pub movie: Option<movie::Model>,
}

/// Booking list response.
#[derive(Serialize)]
pub struct BookingListResponse {
    pub bookings: Vec<BookingRow>,
}

/// List every booking with customer and movie attached.
async fn list_bookings(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<BookingListResponse>> {
    let rows = state.admin_service.list_bookings().await?;
    let bookings = rows
        .into_iter()
        .map(|(booking, user, movie)| BookingRow {
            booking,
            user,
            movie,
        })
        .collect();

    Ok(ApiResponse::ok(BookingListResponse { bookings }))
}

/// Single booking response.
#[derive(Serialize)]
pub struct BookingResponse {
    pub booking: booking::Model,
}

/// Override a booking's status or payment status.
async fn update_booking_status(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateBookingStatusInput>,
) -> AppResult<ApiResponse<BookingResponse>> {
    let booking = state.admin_service.update_booking_status(req).await?;

    Ok(ApiResponse::ok(BookingResponse { booking }).with_message("Booking updated"))
}

/// A payment transaction with its customer.
#[derive(Serialize)]
pub struct TransactionRow {
    #[serde(flatten)]
    pub transaction: transaction::Model,
    pub user: Option<user::Model>,
}

/// Transaction list response.
#[derive(Serialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<TransactionRow>,
}

/// List every payment transaction, newest first.
async fn list_transactions(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<TransactionListResponse>> {
    let rows = state.admin_service.list_transactions().await?;
    let transactions = rows
        .into_iter()
        .map(|(transaction, user)| TransactionRow { transaction, user })
        .collect();

    Ok(ApiResponse::ok(TransactionListResponse { transactions }))
}

/// Create the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/users", get(list_users))
        .route("/users/role", put(update_user_role))
        .route("/users/{id}", delete(delete_user))
        .route("/movies", get(list_movies))
        .route("/bookings", get(list_bookings))
        .route("/bookings/status", put(update_booking_status))
        .route("/transactions", get(list_transactions))
}
