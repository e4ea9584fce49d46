//! Review repository.

use std::sync::Arc;

use crate::entities::{Review, movie, review};
use cinewix_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, Unchanged,
};

/// Review repository for database operations.
///
/// Writes also refresh the denormalized rating aggregate on the movie row,
/// inside the same database transaction.
#[derive(Clone)]
pub struct ReviewRepository {
    db: Arc<DatabaseConnection>,
}

impl ReviewRepository {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List reviews for a movie, newest first.
    pub async fn find_by_movie(&self, movie_id: &str) -> AppResult<Vec<review::Model>> {
        Review::find()
            .filter(review::Column::MovieId.eq(movie_id))
            .order_by_desc(review::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert or replace a user's review and refresh the movie's rating
    /// aggregate. Returns the stored review.
    pub async fn upsert(
        &self,
        new_id: String,
        movie_id: &str,
        user_id: &str,
        user_name: &str,
        rating: i16,
        comment: &str,
    ) -> AppResult<review::Model> {
        let now = chrono::Utc::now();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let existing = Review::find()
            .filter(review::Column::MovieId.eq(movie_id))
            .filter(review::Column::UserId.eq(user_id))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let stored = if let Some(current) = existing {
            review::ActiveModel {
                id: Unchanged(current.id),
                user_name: Set(user_name.to_owned()),
                rating: Set(rating),
                comment: Set(comment.to_owned()),
                updated_at: Set(Some(now.into())),
                ..Default::default()
            }
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        } else {
            review::ActiveModel {
                id: Set(new_id),
                movie_id: Set(movie_id.to_owned()),
                user_id: Set(user_id.to_owned()),
                user_name: Set(user_name.to_owned()),
                rating: Set(rating),
                comment: Set(comment.to_owned()),
                created_at: Set(now.into()),
                updated_at: Set(None),
            }
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        };

        // Recompute the aggregate from all ratings of the movie.
        let ratings: Vec<i16> = Review::find()
            .filter(review::Column::MovieId.eq(movie_id))
            .select_only()
            .column(review::Column::Rating)
            .into_tuple()
            .all(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let count = i32::try_from(ratings.len()).unwrap_or(i32::MAX);
        let average = if ratings.is_empty() {
            0.0
        } else {
            let sum: f64 = ratings.iter().map(|r| f64::from(*r)).sum();
            (sum / ratings.len() as f64 * 10.0).round() / 10.0
        };

        movie::ActiveModel {
            id: Unchanged(movie_id.to_owned()),
            average_user_rating: Set(average),
            review_count: Set(count),
            updated_at: Set(Some(now.into())),
            ..Default::default()
        }
        .update(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(stored)
    }
}
