//! User repository.

use std::sync::Arc;

use crate::entities::{User, user};
use cinewix_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user by ID, or fail with a not-found error.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_owned()))
    }

    /// Find a user by email. Callers must lowercase the address first.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user holding the given login OTP code.
    pub async fn find_by_login_otp(&self, code: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::LoginOtpCode.eq(code))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user holding the given password reset token.
    pub async fn find_by_reset_token(&self, token: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::ResetToken.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a user by ID.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let user = self.find_by_id(id).await?;
        if let Some(u) = user {
            u.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// List all users, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<user::Model>> {
        User::find()
            .order_by_desc(user::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all accounts.
    pub async fn count(&self) -> AppResult<u64> {
        User::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::mock_user;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn find_by_email_returns_matching_user() {
        let alice = mock_user("u1", "alice@example.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![alice.clone()]])
            .into_connection();

        let repo = UserRepository::new(Arc::new(db));
        let found = repo.find_by_email("alice@example.com").await.unwrap();
        assert_eq!(found, Some(alice));
    }

    #[tokio::test]
    async fn count_covers_every_role() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(7))
                }]])
                .into_connection(),
        );

        let repo = UserRepository::new(db.clone());
        assert_eq!(repo.count().await.unwrap(), 7);

        drop(repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert!(!format!("{log:?}").contains("role"));
    }

    #[tokio::test]
    async fn get_by_id_maps_missing_user_to_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let repo = UserRepository::new(Arc::new(db));
        let err = repo.get_by_id("missing").await.unwrap_err();
        assert!(matches!(err, AppError::UserNotFound(_)));
    }
}
