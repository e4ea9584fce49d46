//! Seat booking service.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use cinewix_common::{AppError, AppResult, CodeGenerator, Config, config::BookingConfig};
use cinewix_db::{
    entities::{booking, booking_seat, movie, transaction, user},
    repositories::{BookingRepository, MovieRepository, TransactionRepository},
};
use sea_orm::{Set, Unchanged};

use crate::{BookingReceipt, EmailService};

/// Input for creating a booking.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingInput {
    #[validate(length(min = 1))]
    pub movie_id: String,

    pub show_date: NaiveDate,

    /// Start time, `HH:MM`.
    #[validate(length(equal = 5))]
    pub show_time: String,

    #[validate(length(min = 1, max = 64))]
    pub studio: String,

    /// Seat labels, e.g. `["A1", "A2"]`.
    #[validate(length(min = 1))]
    pub seats: Vec<String>,

    #[validate(length(min = 1, max = 64))]
    pub payment_method: String,
}

/// One seat of the fixed studio grid with its booking state.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeatAvailability {
    pub seat_number: String,
    pub is_booked: bool,
}

/// Booking service for business logic.
#[derive(Clone)]
pub struct BookingService {
    booking_repo: BookingRepository,
    movie_repo: MovieRepository,
    transaction_repo: TransactionRepository,
    email_service: EmailService,
    code_gen: CodeGenerator,
    booking_config: BookingConfig,
}

impl BookingService {
    /// Create a new booking service.
    #[must_use]
    pub fn new(
        booking_repo: BookingRepository,
        movie_repo: MovieRepository,
        transaction_repo: TransactionRepository,
        email_service: EmailService,
        config: &Config,
    ) -> Self {
        Self {
            booking_repo,
            movie_repo,
            transaction_repo,
            email_service,
            code_gen: CodeGenerator::new(),
            booking_config: config.booking.clone(),
        }
    }

    /// The fixed seat grid every studio uses, row by row.
    #[must_use]
    pub fn seat_grid(&self) -> Vec<String> {
        seat_grid(&self.booking_config)
    }

    /// Create a booking with its seat claims and payment transaction in one
    /// database transaction, then email the receipt.
    ///
    /// The receipt email is best-effort: delivery failure is logged and the
    /// booking still succeeds.
    pub async fn create(
        &self,
        customer: &user::Model,
        input: CreateBookingInput,
    ) -> AppResult<(booking::Model, transaction::Model, movie::Model)> {
        input.validate()?;

        let movie = self.movie_repo.get_by_id(&input.movie_id).await?;
        if !movie.has_show_time(
            &input.show_date.to_string(),
            &input.show_time,
            &input.studio,
        ) {
            return Err(AppError::BadRequest(
                "Movie is not scheduled for this date, time and studio".to_string(),
            ));
        }

        let grid = self.seat_grid();
        let mut seats = input.seats.clone();
        seats.sort();
        seats.dedup();
        for seat in &seats {
            if !grid.contains(seat) {
                return Err(AppError::BadRequest(format!("Invalid seat number: {seat}")));
            }
        }

        // Early conflict check with a friendly payload. The unique index on
        // seat claims still catches races at insert time.
        let taken = self
            .booking_repo
            .taken_seats(&movie.id, input.show_date, &input.show_time, &input.studio)
            .await?;
        let conflicts: Vec<String> = seats
            .iter()
            .filter(|s| taken.contains(s))
            .cloned()
            .collect();
        if !conflicts.is_empty() {
            return Err(AppError::SeatsTaken(conflicts));
        }

        let price = self.booking_config.price_per_seat;
        let total = price * seats.len() as i64;
        let now = Utc::now();

        let booking_id = self.code_gen.generate_id();
        let booking_code = self
            .code_gen
            .generate_booking_code(&self.booking_config.code_prefix);

        let booking_model = booking::ActiveModel {
            id: Set(booking_id.clone()),
            user_id: Set(customer.id.clone()),
            movie_id: Set(movie.id.clone()),
            show_date: Set(input.show_date),
            show_time: Set(input.show_time.clone()),
            studio: Set(input.studio.clone()),
            seats: Set(serde_json::json!(
                seats
                    .iter()
                    .map(|s| serde_json::json!({"seat_number": s, "price": price}))
                    .collect::<Vec<_>>()
            )),
            total_price: Set(total),
            booking_code: Set(booking_code),
            status: Set(booking::BookingStatus::Pending),
            payment_status: Set(booking::PaymentStatus::Unpaid),
            payment_method: Set(input.payment_method.clone()),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let seat_models = seats
            .iter()
            .map(|seat| booking_seat::ActiveModel {
                id: Set(self.code_gen.generate_id()),
                booking_id: Set(booking_id.clone()),
                movie_id: Set(movie.id.clone()),
                show_date: Set(input.show_date),
                show_time: Set(input.show_time.clone()),
                studio: Set(input.studio.clone()),
                seat_number: Set(seat.clone()),
                price: Set(price),
            })
            .collect();

        let transaction_model = transaction::ActiveModel {
            id: Set(self.code_gen.generate_id()),
            transaction_code: Set(self.code_gen.generate_transaction_code()),
            booking_id: Set(booking_id),
            user_id: Set(customer.id.clone()),
            amount: Set(total),
            payment_method: Set(input.payment_method),
            status: Set(transaction::TransactionStatus::Pending),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let (stored, payment) = self
            .booking_repo
            .create_with_payment(booking_model, seat_models, transaction_model)
            .await?;

        let receipt = BookingReceipt {
            booking_code: stored.booking_code.clone(),
            movie_title: movie.title.clone(),
            show_date: stored.show_date.to_string(),
            show_time: stored.show_time.clone(),
            studio: stored.studio.clone(),
            seats: stored.seat_numbers(),
            total_price: stored.total_price,
            transaction_code: payment.transaction_code.clone(),
        };
        if let Err(e) = self
            .email_service
            .send_booking_receipt(&customer.email, &customer.first_name, &receipt)
            .await
        {
            tracing::warn!(booking_id = %stored.id, error = %e, "Failed to send booking receipt");
        }

        tracing::info!(
            booking_id = %stored.id,
            booking_code = %stored.booking_code,
            "Created booking"
        );
        Ok((stored, payment, movie))
    }

    /// The caller's bookings with their movies, newest first.
    pub async fn my_bookings(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<(booking::Model, Option<movie::Model>)>> {
        let bookings = self.booking_repo.find_by_user(user_id).await?;

        let mut movie_ids: Vec<String> = bookings.iter().map(|b| b.movie_id.clone()).collect();
        movie_ids.sort();
        movie_ids.dedup();
        let movies = self.movie_repo.find_by_ids(&movie_ids).await?;

        Ok(bookings
            .into_iter()
            .map(|b| {
                let movie = movies.iter().find(|m| m.id == b.movie_id).cloned();
                (b, movie)
            })
            .collect())
    }

    /// The full seat grid for a screening with per-seat booking state.
    ///
    /// A seat is booked iff a claim exists for the showtime tuple; claims
    /// exist only for non-cancelled bookings.
    pub async fn available_seats(
        &self,
        movie_id: &str,
        show_date: NaiveDate,
        show_time: &str,
        studio: &str,
    ) -> AppResult<Vec<SeatAvailability>> {
        self.movie_repo.get_by_id(movie_id).await?;

        let taken = self
            .booking_repo
            .taken_seats(movie_id, show_date, show_time, studio)
            .await?;

        Ok(self
            .seat_grid()
            .into_iter()
            .map(|seat_number| {
                let is_booked = taken.contains(&seat_number);
                SeatAvailability {
                    seat_number,
                    is_booked,
                }
            })
            .collect())
    }

    /// A single booking, visible to its owner and to admins.
    pub async fn get_for_user(
        &self,
        booking_id: &str,
        caller: &user::Model,
    ) -> AppResult<booking::Model> {
        let booking = self.booking_repo.get_by_id(booking_id).await?;
        if booking.user_id != caller.id && !caller.role.is_admin() {
            return Err(AppError::Forbidden(
                "You do not have access to this booking".to_string(),
            ));
        }
        Ok(booking)
    }

    /// Cancel a booking: releases its seat claims and marks the paired
    /// payment transaction failed.
    pub async fn cancel(&self, booking_id: &str, caller: &user::Model) -> AppResult<booking::Model> {
        let booking = self.booking_repo.get_by_id(booking_id).await?;

        if booking.user_id != caller.id {
            return Err(AppError::Forbidden(
                "You can only cancel your own bookings".to_string(),
            ));
        }
        if booking.status == booking::BookingStatus::Cancelled {
            return Err(AppError::BadRequest(
                "Booking is already cancelled".to_string(),
            ));
        }
        if booking.status == booking::BookingStatus::Completed {
            return Err(AppError::BadRequest(
                "Completed bookings cannot be cancelled".to_string(),
            ));
        }

        let payment = self
            .transaction_repo
            .find_by_booking(&booking.id)
            .await?
            .map(|payment| transaction::ActiveModel {
                id: Unchanged(payment.id),
                status: Set(transaction::TransactionStatus::Failed),
                updated_at: Set(Some(Utc::now().into())),
                ..Default::default()
            });

        let updated = self
            .booking_repo
            .update_with_payment(
                &booking.id,
                booking::ActiveModel {
                    id: Unchanged(booking.id.clone()),
                    status: Set(booking::BookingStatus::Cancelled),
                    updated_at: Set(Some(Utc::now().into())),
                    ..Default::default()
                },
                payment,
                true,
            )
            .await?;

        tracing::info!(booking_id = %updated.id, "Cancelled booking");
        Ok(updated)
    }
}

fn seat_grid(config: &BookingConfig) -> Vec<String> {
    let mut grid = Vec::with_capacity(config.seat_rows.len() * config.seats_per_row as usize);
    for row in &config.seat_rows {
        for n in 1..=config.seats_per_row {
            grid.push(format!("{row}{n}"));
        }
    }
    grid
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_is_five_rows_of_ten() {
        let grid = seat_grid(&BookingConfig::default());
        assert_eq!(grid.len(), 50);
        assert_eq!(grid.first().map(String::as_str), Some("A1"));
        assert_eq!(grid.last().map(String::as_str), Some("E10"));
        assert!(grid.contains(&"C7".to_string()));
        assert!(!grid.contains(&"F1".to_string()));
    }

    #[test]
    fn total_price_is_seats_times_unit_price() {
        let config = BookingConfig::default();
        let seats = 3_i64;
        assert_eq!(config.price_per_seat * seats, 150_000);
    }

    #[test]
    fn booking_input_rejects_empty_seat_list() {
        let input = CreateBookingInput {
            movie_id: "m1".to_string(),
            show_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            show_time: "19:00".to_string(),
            studio: "Studio 1".to_string(),
            seats: vec![],
            payment_method: "credit_card".to_string(),
        };
        assert!(input.validate().is_err());
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> BookingService {
        use cinewix_common::config::{AuthConfig, DatabaseConfig, ServerConfig, UploadConfig};
        use std::sync::Arc;

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                url: "http://localhost:3000".to_string(),
            },
            database: DatabaseConfig {
                url: "postgres://localhost/cinewix".to_string(),
                max_connections: 5,
                min_connections: 1,
            },
            auth: AuthConfig {
                jwt_secret: "unit-test-secret".to_string(),
                token_days: 7,
                verification_minutes: 5,
                otp_minutes: 10,
                reset_minutes: 60,
            },
            email: None,
            booking: BookingConfig::default(),
            uploads: UploadConfig::default(),
        };

        let db = Arc::new(db);
        BookingService::new(
            BookingRepository::new(db.clone()),
            MovieRepository::new(db.clone()),
            TransactionRepository::new(db),
            EmailService::new(&config),
            &config,
        )
    }

    #[tokio::test]
    async fn available_seats_marks_claimed_seats_booked() {
        use cinewix_db::test_utils::mock_movie;
        use sea_orm::{DatabaseBackend, MockDatabase};

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![mock_movie("m1", "Dune")]])
            .append_query_results([[
                maplit::btreemap! { "seat_number" => sea_orm::Value::from("A1") },
                maplit::btreemap! { "seat_number" => sea_orm::Value::from("B3") },
            ]])
            .into_connection();

        let seats = service_with(db)
            .available_seats(
                "m1",
                NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
                "19:00",
                "Studio 1",
            )
            .await
            .unwrap();

        assert_eq!(seats.len(), 50);
        let booked: Vec<&str> = seats
            .iter()
            .filter(|s| s.is_booked)
            .map(|s| s.seat_number.as_str())
            .collect();
        assert_eq!(booked, vec!["A1", "B3"]);
    }

    #[tokio::test]
    async fn create_rejects_unscheduled_slot() {
        use cinewix_db::test_utils::{mock_movie, mock_user};
        use sea_orm::{DatabaseBackend, MockDatabase};

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![mock_movie("m1", "Dune")]])
            .into_connection();

        let customer = mock_user("u1", "ada@example.com");
        let input = CreateBookingInput {
            movie_id: "m1".to_string(),
            show_date: NaiveDate::from_ymd_opt(2025, 7, 2).unwrap(),
            show_time: "19:00".to_string(),
            studio: "Studio 1".to_string(),
            seats: vec!["A1".to_string()],
            payment_method: "credit_card".to_string(),
        };
        let err = service_with(db).create(&customer, input).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn cancel_rejects_already_cancelled_booking() {
        use cinewix_db::test_utils::{mock_booking, mock_user};
        use sea_orm::{DatabaseBackend, MockDatabase};

        let mut cancelled = mock_booking("b1", "u1", "m1");
        cancelled.status = booking::BookingStatus::Cancelled;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![cancelled]])
            .into_connection();

        let caller = mock_user("u1", "ada@example.com");
        let err = service_with(db).cancel("b1", &caller).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn cancel_rejects_completed_booking() {
        use cinewix_db::test_utils::{mock_booking, mock_user};
        use sea_orm::{DatabaseBackend, MockDatabase};

        let mut completed = mock_booking("b1", "u1", "m1");
        completed.status = booking::BookingStatus::Completed;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![completed]])
            .into_connection();

        let caller = mock_user("u1", "ada@example.com");
        let err = service_with(db).cancel("b1", &caller).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
