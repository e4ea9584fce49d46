//! Booking repository.

use std::sync::Arc;

use crate::entities::{Booking, BookingSeat, booking, booking_seat, transaction, user};
use cinewix_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};

/// Booking repository for database operations.
#[derive(Clone)]
pub struct BookingRepository {
    db: Arc<DatabaseConnection>,
}

impl BookingRepository {
    /// Create a new booking repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a booking by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<booking::Model>> {
        Booking::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a booking by ID, or fail with a not-found error.
    pub async fn get_by_id(&self, id: &str) -> AppResult<booking::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(id.to_owned()))
    }

    /// List a user's bookings, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<booking::Model>> {
        Booking::find()
            .filter(booking::Column::UserId.eq(user_id))
            .order_by_desc(booking::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all bookings with their owning user, newest first.
    pub async fn find_all_with_user(
        &self,
    ) -> AppResult<Vec<(booking::Model, Option<user::Model>)>> {
        Booking::find()
            .find_also_related(user::Entity)
            .order_by_desc(booking::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The most recent bookings with their owning user.
    pub async fn find_recent_with_user(
        &self,
        limit: u64,
    ) -> AppResult<Vec<(booking::Model, Option<user::Model>)>> {
        Booking::find()
            .find_also_related(user::Entity)
            .order_by_desc(booking::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all bookings.
    pub async fn count(&self) -> AppResult<u64> {
        Booking::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Seat labels already claimed for a screening.
    pub async fn taken_seats(
        &self,
        movie_id: &str,
        show_date: chrono::NaiveDate,
        show_time: &str,
        studio: &str,
    ) -> AppResult<Vec<String>> {
        BookingSeat::find()
            .filter(booking_seat::Column::MovieId.eq(movie_id))
            .filter(booking_seat::Column::ShowDate.eq(show_date))
            .filter(booking_seat::Column::ShowTime.eq(show_time))
            .filter(booking_seat::Column::Studio.eq(studio))
            .select_only()
            .column(booking_seat::Column::SeatNumber)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a booking, its seat claims and its payment transaction in one
    /// database transaction.
    ///
    /// The unique index on seat claims turns a concurrent double-book into a
    /// constraint violation, reported as [`AppError::SeatsTaken`].
    pub async fn create_with_payment(
        &self,
        booking: booking::ActiveModel,
        seats: Vec<booking_seat::ActiveModel>,
        payment: transaction::ActiveModel,
    ) -> AppResult<(booking::Model, transaction::Model)> {
        let requested: Vec<String> = seats
            .iter()
            .filter_map(|s| match &s.seat_number {
                sea_orm::ActiveValue::Set(v) => Some(v.clone()),
                _ => None,
            })
            .collect();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let stored = booking
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Err(e) = BookingSeat::insert_many(seats).exec(&txn).await {
            return match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(AppError::SeatsTaken(requested)),
                _ => Err(AppError::Database(e.to_string())),
            };
        }

        let payment = payment
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((stored, payment))
    }

    /// Apply a booking update, an optional payment-transaction update and an
    /// optional seat-claim release in one database transaction.
    ///
    /// Cancellation goes through here so a failure partway cannot leave seat
    /// claims attached to a cancelled booking.
    pub async fn update_with_payment(
        &self,
        booking_id: &str,
        booking: booking::ActiveModel,
        payment: Option<transaction::ActiveModel>,
        release_seats: bool,
    ) -> AppResult<booking::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let updated = booking
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(payment) = payment {
            payment
                .update(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        if release_seats {
            BookingSeat::delete_many()
                .filter(booking_seat::Column::BookingId.eq(booking_id))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::mock_booking;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn get_by_id_maps_missing_booking_to_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<booking::Model>::new()])
            .into_connection();

        let repo = BookingRepository::new(Arc::new(db));
        let err = repo.get_by_id("missing").await.unwrap_err();
        assert!(matches!(err, AppError::BookingNotFound(_)));
    }

    #[tokio::test]
    async fn update_with_payment_releases_claims_in_one_transaction() {
        use sea_orm::{ActiveValue, MockExecResult};

        let mut cancelled = mock_booking("b1", "u1", "m1");
        cancelled.status = booking::BookingStatus::Cancelled;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![cancelled.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );

        let repo = BookingRepository::new(db.clone());
        let updated = repo
            .update_with_payment(
                "b1",
                booking::ActiveModel {
                    id: ActiveValue::Unchanged("b1".to_string()),
                    status: ActiveValue::Set(booking::BookingStatus::Cancelled),
                    ..Default::default()
                },
                None,
                true,
            )
            .await
            .unwrap();
        assert_eq!(updated.status, booking::BookingStatus::Cancelled);

        drop(repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        // One log entry: the status flip and the claim delete share a transaction.
        assert_eq!(log.len(), 1);
        assert!(format!("{:?}", log[0]).contains("booking_seat"));
    }

    #[tokio::test]
    async fn find_by_user_returns_rows() {
        let booking = mock_booking("b1", "u1", "m1");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![booking.clone()]])
            .into_connection();

        let repo = BookingRepository::new(Arc::new(db));
        let bookings = repo.find_by_user("u1").await.unwrap();
        assert_eq!(bookings, vec![booking]);
    }
}
