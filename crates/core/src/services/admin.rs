//! Admin dashboard and management service.

use chrono::Utc;
use serde::Deserialize;

use cinewix_common::{AppError, AppResult};
use cinewix_db::{
    entities::{booking, movie, transaction, user},
    repositories::{BookingRepository, MovieRepository, TransactionRepository, UserRepository},
};
use sea_orm::{Set, Unchanged};

/// Number of recent items shown on the dashboard.
const DASHBOARD_RECENT_LIMIT: u64 = 10;

/// Aggregate figures for the admin dashboard.
#[derive(Debug)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_movies: u64,
    pub total_bookings: u64,
    /// Sum of successful transactions, in rupiah.
    pub total_revenue: i64,
    pub recent_bookings: Vec<(booking::Model, Option<user::Model>)>,
    pub recent_transactions: Vec<transaction::Model>,
}

/// Input for changing a user's role.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRoleInput {
    pub user_id: String,
    pub role: user::Role,
}

/// Input for overriding a booking's status fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingStatusInput {
    pub booking_id: String,
    pub status: Option<booking::BookingStatus>,
    pub payment_status: Option<booking::PaymentStatus>,
}

/// Admin service for dashboard and management operations.
#[derive(Clone)]
pub struct AdminService {
    user_repo: UserRepository,
    movie_repo: MovieRepository,
    booking_repo: BookingRepository,
    transaction_repo: TransactionRepository,
}

impl AdminService {
    /// Create a new admin service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        movie_repo: MovieRepository,
        booking_repo: BookingRepository,
        transaction_repo: TransactionRepository,
    ) -> Self {
        Self {
            user_repo,
            movie_repo,
            booking_repo,
            transaction_repo,
        }
    }

    /// Dashboard totals, revenue and recent activity.
    pub async fn stats(&self) -> AppResult<DashboardStats> {
        let total_users = self.user_repo.count().await?;
        let total_movies = self.movie_repo.count_active().await?;
        let total_bookings = self.booking_repo.count().await?;
        let total_revenue = self.transaction_repo.total_revenue().await?;
        let recent_bookings = self
            .booking_repo
            .find_recent_with_user(DASHBOARD_RECENT_LIMIT)
            .await?;
        let recent_transactions = self
            .transaction_repo
            .find_recent(DASHBOARD_RECENT_LIMIT)
            .await?;

        Ok(DashboardStats {
            total_users,
            total_movies,
            total_bookings,
            total_revenue,
            recent_bookings,
            recent_transactions,
        })
    }

    /// All user accounts, newest first.
    pub async fn list_users(&self) -> AppResult<Vec<user::Model>> {
        self.user_repo.find_all().await
    }

    /// All bookings with their users and movies, newest first.
    pub async fn list_bookings(
        &self,
    ) -> AppResult<Vec<(booking::Model, Option<user::Model>, Option<movie::Model>)>> {
        let rows = self.booking_repo.find_all_with_user().await?;

        let mut movie_ids: Vec<String> = rows.iter().map(|(b, _)| b.movie_id.clone()).collect();
        movie_ids.sort();
        movie_ids.dedup();
        let movies = self.movie_repo.find_by_ids(&movie_ids).await?;

        Ok(rows
            .into_iter()
            .map(|(b, u)| {
                let movie = movies.iter().find(|m| m.id == b.movie_id).cloned();
                (b, u, movie)
            })
            .collect())
    }

    /// All payment transactions with their users, newest first.
    pub async fn list_transactions(
        &self,
    ) -> AppResult<Vec<(transaction::Model, Option<user::Model>)>> {
        self.transaction_repo.find_all_with_user().await
    }

    /// Change a user's role.
    ///
    /// Permanent accounts are untouchable, and any change that grants or
    /// revokes admin access requires a superadmin actor.
    pub async fn update_user_role(
        &self,
        actor: &user::Model,
        input: UpdateUserRoleInput,
    ) -> AppResult<user::Model> {
        let target = self.user_repo.get_by_id(&input.user_id).await?;

        if target.is_permanent {
            return Err(AppError::Forbidden(
                "Permanent accounts cannot be modified".to_string(),
            ));
        }

        let touches_admin = input.role.is_admin() || target.role.is_admin();
        if touches_admin && actor.role != user::Role::Superadmin {
            return Err(AppError::Forbidden(
                "Only superadmins can grant or revoke admin access".to_string(),
            ));
        }

        let updated = self
            .user_repo
            .update(user::ActiveModel {
                id: Unchanged(target.id),
                role: Set(input.role),
                updated_at: Set(Some(Utc::now().into())),
                ..Default::default()
            })
            .await?;

        tracing::info!(user_id = %updated.id, role = ?updated.role, "Changed user role");
        Ok(updated)
    }

    /// Delete a user account.
    ///
    /// Permanent accounts are undeletable; deleting an admin requires a
    /// superadmin actor.
    pub async fn delete_user(&self, actor: &user::Model, user_id: &str) -> AppResult<()> {
        let target = self.user_repo.get_by_id(user_id).await?;

        if target.is_permanent {
            return Err(AppError::Forbidden(
                "Permanent accounts cannot be deleted".to_string(),
            ));
        }
        if target.role.is_admin() && actor.role != user::Role::Superadmin {
            return Err(AppError::Forbidden(
                "Only superadmins can delete admin accounts".to_string(),
            ));
        }

        self.user_repo.delete(user_id).await?;
        tracing::info!(user_id = %user_id, "Deleted user account");
        Ok(())
    }

    /// Override a booking's status and/or payment status.
    ///
    /// A payment status change cascades onto the paired transaction
    /// (paid → success, anything else → pending), and cancelling releases
    /// the booking's seat claims.
    pub async fn update_booking_status(
        &self,
        input: UpdateBookingStatusInput,
    ) -> AppResult<booking::Model> {
        let booking = self.booking_repo.get_by_id(&input.booking_id).await?;

        let mut model = booking::ActiveModel {
            id: Unchanged(booking.id.clone()),
            updated_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };
        if let Some(status) = input.status {
            model.status = Set(status);
        }
        if let Some(payment_status) = input.payment_status {
            model.payment_status = Set(payment_status);
        }

        let mut payment = None;
        if let Some(payment_status) = input.payment_status {
            let cascade = if payment_status == booking::PaymentStatus::Paid {
                transaction::TransactionStatus::Success
            } else {
                transaction::TransactionStatus::Pending
            };
            payment = self
                .transaction_repo
                .find_by_booking(&booking.id)
                .await?
                .map(|p| transaction::ActiveModel {
                    id: Unchanged(p.id),
                    status: Set(cascade),
                    updated_at: Set(Some(Utc::now().into())),
                    ..Default::default()
                });
        }

        let release = input.status == Some(booking::BookingStatus::Cancelled);
        let updated = self
            .booking_repo
            .update_with_payment(&booking.id, model, payment, release)
            .await?;

        tracing::info!(booking_id = %updated.id, "Updated booking status");
        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cinewix_db::test_utils::mock_user;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service(db: sea_orm::DatabaseConnection) -> AdminService {
        let db = Arc::new(db);
        AdminService::new(
            UserRepository::new(db.clone()),
            MovieRepository::new(db.clone()),
            BookingRepository::new(db.clone()),
            TransactionRepository::new(db),
        )
    }

    #[tokio::test]
    async fn permanent_accounts_cannot_be_demoted() {
        let mut target = mock_user("u1", "root@example.com");
        target.role = user::Role::Superadmin;
        target.is_permanent = true;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![target]])
            .into_connection();

        let mut actor = mock_user("u2", "boss@example.com");
        actor.role = user::Role::Superadmin;

        let err = service(db)
            .update_user_role(
                &actor,
                UpdateUserRoleInput {
                    user_id: "u1".to_string(),
                    role: user::Role::User,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn admins_cannot_promote_to_admin() {
        let target = mock_user("u1", "user@example.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![target]])
            .into_connection();

        let mut actor = mock_user("u2", "admin@example.com");
        actor.role = user::Role::Admin;

        let err = service(db)
            .update_user_role(
                &actor,
                UpdateUserRoleInput {
                    user_id: "u1".to_string(),
                    role: user::Role::Admin,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
