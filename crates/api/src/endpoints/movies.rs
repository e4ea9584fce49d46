//! Movie catalog and review endpoints.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use cinewix_common::AppResult;
use cinewix_core::{CreateMovieInput, CreateReviewInput, UpdateMovieInput};
use cinewix_db::entities::{movie, review};
use serde::{Deserialize, Serialize};

use crate::extractors::{AdminUser, AuthUser};
use crate::middleware::AppState;
use crate::response::{ApiResponse, Empty};

/// Movie list response.
#[derive(Serialize)]
pub struct MovieListResponse {
    pub movies: Vec<movie::Model>,
}

/// List movies that are visible to customers.
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<MovieListResponse>> {
    let movies = state.movie_service.list_active().await?;

    Ok(ApiResponse::ok(MovieListResponse { movies }))
}

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

/// Search active movies by title, director or genre.
async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<ApiResponse<MovieListResponse>> {
    let movies = state.movie_service.search(&params.query).await?;

    Ok(ApiResponse::ok(MovieListResponse { movies }))
}

/// Movie detail response: the movie with its reviews attached.
#[derive(Serialize)]
pub struct MovieDetailResponse {
    #[serde(flatten)]
    pub movie: movie::Model,
    pub reviews: Vec<review::Model>,
}

/// Fetch a single movie with its reviews.
async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MovieDetailResponse>> {
    let (movie, reviews) = state.movie_service.get_with_reviews(&id).await?;

    Ok(ApiResponse::ok(MovieDetailResponse { movie, reviews }))
}

/// Single movie response.
#[derive(Serialize)]
pub struct MovieResponse {
    pub movie: movie::Model,
}

/// Add a movie to the catalog. Admin only.
async fn create(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<CreateMovieInput>,
) -> AppResult<ApiResponse<MovieResponse>> {
    let movie = state.movie_service.create(req).await?;

    Ok(ApiResponse::created(MovieResponse { movie }).with_message("Movie created"))
}

/// Update catalog fields on a movie. Admin only.
async fn update(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateMovieInput>,
) -> AppResult<ApiResponse<MovieResponse>> {
    let movie = state.movie_service.update(&id, req).await?;

    Ok(ApiResponse::ok(MovieResponse { movie }).with_message("Movie updated"))
}

/// Remove a movie from the catalog. Admin only.
async fn delete(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Empty>> {
    state.movie_service.delete(&id).await?;

    Ok(ApiResponse::message("Movie deleted"))
}

/// Review response.
#[derive(Serialize)]
pub struct ReviewResponse {
    pub review: review::Model,
}

/// Create or replace the caller's review for a movie.
async fn add_review(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CreateReviewInput>,
) -> AppResult<ApiResponse<ReviewResponse>> {
    let review = state.movie_service.add_review(&id, &user, req).await?;

    Ok(ApiResponse::created(ReviewResponse { review }).with_message("Review saved"))
}

/// Create the movie router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/search", get(search))
        .route("/{id}", get(detail).put(update).delete(delete))
        .route("/{id}/reviews", post(add_review))
}
