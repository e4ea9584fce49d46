//! Movie repository.

use std::sync::Arc;

use crate::entities::{Movie, movie};
use cinewix_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

/// Movie repository for database operations.
#[derive(Clone)]
pub struct MovieRepository {
    db: Arc<DatabaseConnection>,
}

impl MovieRepository {
    /// Create a new movie repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a movie by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<movie::Model>> {
        Movie::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a movie by ID, or fail with a not-found error.
    pub async fn get_by_id(&self, id: &str) -> AppResult<movie::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::MovieNotFound(id.to_owned()))
    }

    /// List active movies, newest release first.
    pub async fn find_active(&self) -> AppResult<Vec<movie::Model>> {
        Movie::find()
            .filter(movie::Column::IsActive.eq(true))
            .order_by_desc(movie::Column::ReleaseDate)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all movies including inactive ones, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<movie::Model>> {
        Movie::find()
            .order_by_desc(movie::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Search active movies by title, director or genre (case-insensitive).
    pub async fn search(&self, query: &str) -> AppResult<Vec<movie::Model>> {
        let pattern = format!("%{query}%");
        Movie::find()
            .filter(movie::Column::IsActive.eq(true))
            .filter(
                Condition::any()
                    .add(Expr::cust_with_values("title ILIKE ?", [pattern.clone()]))
                    .add(Expr::cust_with_values("director ILIKE ?", [pattern.clone()]))
                    .add(Expr::cust_with_values(
                        "CAST(genres AS TEXT) ILIKE ?",
                        [pattern],
                    )),
            )
            .order_by_desc(movie::Column::ReleaseDate)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find several movies by ID.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<movie::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Movie::find()
            .filter(movie::Column::Id.is_in(ids.iter().map(String::as_str)))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new movie.
    pub async fn create(&self, model: movie::ActiveModel) -> AppResult<movie::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a movie.
    pub async fn update(&self, model: movie::ActiveModel) -> AppResult<movie::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a movie by ID.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let movie = self.find_by_id(id).await?;
        if let Some(m) = movie {
            m.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Count movies visible to customers.
    pub async fn count_active(&self) -> AppResult<u64> {
        Movie::find()
            .filter(movie::Column::IsActive.eq(true))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::mock_movie;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn get_by_id_maps_missing_movie_to_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<movie::Model>::new()])
            .into_connection();

        let repo = MovieRepository::new(Arc::new(db));
        let err = repo.get_by_id("missing").await.unwrap_err();
        assert!(matches!(err, AppError::MovieNotFound(_)));
    }

    #[tokio::test]
    async fn find_active_returns_rows() {
        let movie = mock_movie("m1", "Dune");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![movie.clone()]])
            .into_connection();

        let repo = MovieRepository::new(Arc::new(db));
        let movies = repo.find_active().await.unwrap();
        assert_eq!(movies, vec![movie]);
    }

    #[tokio::test]
    async fn count_active_filters_on_visibility() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(3))
                }]])
                .into_connection(),
        );

        let repo = MovieRepository::new(db.clone());
        let count = repo.count_active().await.unwrap();
        assert_eq!(count, 3);

        drop(repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert!(format!("{log:?}").contains("is_active"));
    }
}
