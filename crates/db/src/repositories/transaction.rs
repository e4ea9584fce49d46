//! Payment transaction repository.

use std::sync::Arc;

use crate::entities::{Transaction, transaction, user};
use cinewix_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Payment transaction repository for database operations.
#[derive(Clone)]
pub struct TransactionRepository {
    db: Arc<DatabaseConnection>,
}

impl TransactionRepository {
    /// Create a new transaction repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the transaction attached to a booking.
    pub async fn find_by_booking(&self, booking_id: &str) -> AppResult<Option<transaction::Model>> {
        Transaction::find()
            .filter(transaction::Column::BookingId.eq(booking_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all transactions with their owning user, newest first.
    pub async fn find_all_with_user(
        &self,
    ) -> AppResult<Vec<(transaction::Model, Option<user::Model>)>> {
        Transaction::find()
            .find_also_related(user::Entity)
            .order_by_desc(transaction::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The most recent transactions.
    pub async fn find_recent(&self, limit: u64) -> AppResult<Vec<transaction::Model>> {
        Transaction::find()
            .order_by_desc(transaction::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Total revenue in rupiah over successful transactions.
    pub async fn total_revenue(&self) -> AppResult<i64> {
        let total: Option<i64> = Transaction::find()
            .filter(transaction::Column::Status.eq(transaction::TransactionStatus::Success))
            .select_only()
            .column_as(
                Expr::cust("CAST(COALESCE(SUM(amount), 0) AS BIGINT)"),
                "total",
            )
            .into_tuple()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(total.unwrap_or(0))
    }

    /// Update a transaction.
    pub async fn update(&self, model: transaction::ActiveModel) -> AppResult<transaction::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
