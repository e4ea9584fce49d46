//! Seat booking endpoints.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use cinewix_common::AppResult;
use cinewix_core::{CreateBookingInput, SeatAvailability};
use cinewix_db::entities::{booking, movie, transaction};
use serde::{Deserialize, Serialize};

use crate::extractors::AuthUser;
use crate::middleware::AppState;
use crate::response::ApiResponse;

/// Booking creation response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingResponse {
    pub booking: booking::Model,
    pub transaction: transaction::Model,
    pub movie: movie::Model,
}

/// Book seats for a screening and open a pending payment.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateBookingInput>,
) -> AppResult<ApiResponse<CreateBookingResponse>> {
    let (booking, transaction, movie) = state.booking_service.create(&user, req).await?;

    Ok(ApiResponse::created(CreateBookingResponse {
        booking,
        transaction,
        movie,
    })
    .with_message("Booking confirmed. A receipt has been sent to your email."))
}

/// A booking paired with its movie, for listings.
#[derive(Serialize)]
pub struct BookingWithMovie {
    #[serde(flatten)]
    pub booking: booking::Model,
    pub movie: Option<movie::Model>,
}

/// Booking list response.
#[derive(Serialize)]
pub struct BookingListResponse {
    pub bookings: Vec<BookingWithMovie>,
}

/// List the caller's bookings, newest first.
async fn list_mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<BookingListResponse>> {
    let rows = state.booking_service.my_bookings(&user.id).await?;
    let bookings = rows
        .into_iter()
        .map(|(booking, movie)| BookingWithMovie { booking, movie })
        .collect();

    Ok(ApiResponse::ok(BookingListResponse { bookings }))
}

/// Seat availability query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatQuery {
    pub movie_id: String,
    pub date: NaiveDate,
    pub time: String,
    pub studio: String,
}

/// Seat availability response.
#[derive(Serialize)]
pub struct SeatListResponse {
    pub seats: Vec<SeatAvailability>,
}

/// Seat map for a screening, marking which seats are taken.
async fn seats(
    State(state): State<AppState>,
    Query(query): Query<SeatQuery>,
) -> AppResult<ApiResponse<SeatListResponse>> {
    let seats = state
        .booking_service
        .available_seats(&query.movie_id, query.date, &query.time, &query.studio)
        .await?;

    Ok(ApiResponse::ok(SeatListResponse { seats }))
}

/// Single booking response.
#[derive(Serialize)]
pub struct BookingResponse {
    pub booking: booking::Model,
}

/// Fetch one booking. Owners and staff only.
async fn detail(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<BookingResponse>> {
    let booking = state.booking_service.get_for_user(&id, &user).await?;

    Ok(ApiResponse::ok(BookingResponse { booking }))
}

/// Cancel a booking and release its seats.
async fn cancel(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<BookingResponse>> {
    let booking = state.booking_service.cancel(&id, &user).await?;

    Ok(ApiResponse::ok(BookingResponse { booking }).with_message("Booking cancelled"))
}

/// Create the booking router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/my-bookings", get(list_mine))
        .route("/available-seats", get(seats))
        .route("/{id}", get(detail))
        .route("/{id}/cancel", post(cancel))
}
