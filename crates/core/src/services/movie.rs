//! Movie catalog service.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use validator::Validate;

use cinewix_common::{AppError, AppResult, CodeGenerator};
use cinewix_db::{
    entities::{movie, review, user},
    repositories::{MovieRepository, ReviewRepository},
};
use sea_orm::{Set, Unchanged};

/// A screening slot in catalog input.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ShowTimeInput {
    /// Calendar date, `YYYY-MM-DD`.
    #[validate(length(equal = 10))]
    pub date: String,
    /// Start time, `HH:MM`.
    #[validate(length(equal = 5))]
    pub time: String,
    #[validate(length(min = 1, max = 64))]
    pub studio: String,
}

/// Input for creating a movie.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovieInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(length(min = 1))]
    pub description: String,

    pub genres: Vec<String>,

    #[validate(range(min = 1, max = 600))]
    pub duration_minutes: i32,

    /// Editorial rating, 0.0 to 10.0.
    #[validate(range(min = 0.0, max = 10.0))]
    pub rating: f64,

    pub director: Option<String>,

    #[serde(default)]
    pub cast: Vec<String>,

    #[validate(url)]
    pub poster_url: Option<String>,

    #[validate(url)]
    pub trailer_url: Option<String>,

    pub release_date: NaiveDate,

    pub language: Option<String>,

    pub age_rating: movie::AgeRating,

    #[serde(default)]
    #[validate(nested)]
    pub show_times: Vec<ShowTimeInput>,
}

/// Input for updating a movie. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMovieInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub description: Option<String>,

    pub genres: Option<Vec<String>>,

    #[validate(range(min = 1, max = 600))]
    pub duration_minutes: Option<i32>,

    #[validate(range(min = 0.0, max = 10.0))]
    pub rating: Option<f64>,

    pub director: Option<String>,

    pub cast: Option<Vec<String>>,

    #[validate(url)]
    pub poster_url: Option<String>,

    #[validate(url)]
    pub trailer_url: Option<String>,

    pub release_date: Option<NaiveDate>,

    pub language: Option<String>,

    pub age_rating: Option<movie::AgeRating>,

    #[validate(nested)]
    pub show_times: Option<Vec<ShowTimeInput>>,

    pub is_active: Option<bool>,
}

/// Input for reviewing a movie.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewInput {
    /// Star rating, 1 to 5.
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,

    #[validate(length(min = 1, max = 2048))]
    pub comment: String,
}

/// Movie service for business logic.
#[derive(Clone)]
pub struct MovieService {
    movie_repo: MovieRepository,
    review_repo: ReviewRepository,
    code_gen: CodeGenerator,
}

impl MovieService {
    /// Create a new movie service.
    #[must_use]
    pub fn new(movie_repo: MovieRepository, review_repo: ReviewRepository) -> Self {
        Self {
            movie_repo,
            review_repo,
            code_gen: CodeGenerator::new(),
        }
    }

    /// Active movies for the public catalog, newest release first.
    pub async fn list_active(&self) -> AppResult<Vec<movie::Model>> {
        self.movie_repo.find_active().await
    }

    /// All movies including inactive ones, for the admin catalog.
    pub async fn list_all(&self) -> AppResult<Vec<movie::Model>> {
        self.movie_repo.find_all().await
    }

    /// Case-insensitive title/director/genre search over active movies.
    pub async fn search(&self, query: &str) -> AppResult<Vec<movie::Model>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::BadRequest("Search query is required".to_string()));
        }
        self.movie_repo.search(query).await
    }

    /// A movie with its reviews, newest review first.
    pub async fn get_with_reviews(
        &self,
        id: &str,
    ) -> AppResult<(movie::Model, Vec<review::Model>)> {
        let movie = self.movie_repo.get_by_id(id).await?;
        let reviews = self.review_repo.find_by_movie(id).await?;
        Ok((movie, reviews))
    }

    /// Create a movie.
    pub async fn create(&self, input: CreateMovieInput) -> AppResult<movie::Model> {
        input.validate()?;

        let model = movie::ActiveModel {
            id: Set(self.code_gen.generate_id()),
            title: Set(input.title),
            description: Set(input.description),
            genres: Set(serde_json::json!(input.genres)),
            duration_minutes: Set(input.duration_minutes),
            rating: Set(input.rating),
            director: Set(input.director),
            cast: Set(serde_json::json!(input.cast)),
            poster_url: Set(input.poster_url),
            trailer_url: Set(input.trailer_url),
            release_date: Set(input.release_date),
            language: Set(input.language.unwrap_or_else(|| "Indonesian".to_string())),
            age_rating: Set(input.age_rating),
            show_times: Set(show_times_json(&input.show_times)),
            average_user_rating: Set(0.0),
            review_count: Set(0),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.movie_repo.create(model).await?;
        tracing::info!(movie_id = %created.id, title = %created.title, "Created movie");
        Ok(created)
    }

    /// Update a movie.
    pub async fn update(&self, id: &str, input: UpdateMovieInput) -> AppResult<movie::Model> {
        input.validate()?;

        let current = self.movie_repo.get_by_id(id).await?;

        let mut model = movie::ActiveModel {
            id: Unchanged(current.id),
            updated_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };

        if let Some(title) = input.title {
            model.title = Set(title);
        }
        if let Some(description) = input.description {
            model.description = Set(description);
        }
        if let Some(genres) = input.genres {
            model.genres = Set(serde_json::json!(genres));
        }
        if let Some(duration) = input.duration_minutes {
            model.duration_minutes = Set(duration);
        }
        if let Some(rating) = input.rating {
            model.rating = Set(rating);
        }
        if let Some(director) = input.director {
            model.director = Set(Some(director));
        }
        if let Some(cast) = input.cast {
            model.cast = Set(serde_json::json!(cast));
        }
        if let Some(poster_url) = input.poster_url {
            model.poster_url = Set(Some(poster_url));
        }
        if let Some(trailer_url) = input.trailer_url {
            model.trailer_url = Set(Some(trailer_url));
        }
        if let Some(release_date) = input.release_date {
            model.release_date = Set(release_date);
        }
        if let Some(language) = input.language {
            model.language = Set(language);
        }
        if let Some(age_rating) = input.age_rating {
            model.age_rating = Set(age_rating);
        }
        if let Some(show_times) = input.show_times {
            model.show_times = Set(show_times_json(&show_times));
        }
        if let Some(is_active) = input.is_active {
            model.is_active = Set(is_active);
        }

        self.movie_repo.update(model).await
    }

    /// Delete a movie and its reviews/bookings (cascade).
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        // 404 for unknown ids, matching the other admin operations.
        self.movie_repo.get_by_id(id).await?;
        self.movie_repo.delete(id).await?;
        tracing::info!(movie_id = %id, "Deleted movie");
        Ok(())
    }

    /// Upsert the caller's review and refresh the movie's rating aggregate.
    pub async fn add_review(
        &self,
        movie_id: &str,
        reviewer: &user::Model,
        input: CreateReviewInput,
    ) -> AppResult<review::Model> {
        input.validate()?;

        // Ensure the movie exists before writing.
        self.movie_repo.get_by_id(movie_id).await?;

        self.review_repo
            .upsert(
                self.code_gen.generate_id(),
                movie_id,
                &reviewer.id,
                &reviewer.full_name(),
                input.rating,
                &input.comment,
            )
            .await
    }
}

fn show_times_json(show_times: &[ShowTimeInput]) -> serde_json::Value {
    serde_json::json!(
        show_times
            .iter()
            .map(|s| {
                serde_json::json!({
                    "date": s.date,
                    "time": s.time,
                    "studio": s.studio,
                })
            })
            .collect::<Vec<_>>()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn review_input_enforces_rating_bounds() {
        let too_low = CreateReviewInput {
            rating: 0,
            comment: "meh".to_string(),
        };
        assert!(too_low.validate().is_err());

        let too_high = CreateReviewInput {
            rating: 6,
            comment: "wow".to_string(),
        };
        assert!(too_high.validate().is_err());

        let ok = CreateReviewInput {
            rating: 4,
            comment: "Great pacing".to_string(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn review_input_rejects_empty_comment() {
        let input = CreateReviewInput {
            rating: 3,
            comment: String::new(),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn show_times_serialize_to_schedule_objects() {
        let json = show_times_json(&[ShowTimeInput {
            date: "2025-07-01".to_string(),
            time: "19:00".to_string(),
            studio: "Studio 1".to_string(),
        }]);
        assert_eq!(
            json,
            serde_json::json!([{"date": "2025-07-01", "time": "19:00", "studio": "Studio 1"}])
        );
    }
}
