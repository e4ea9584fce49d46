//! Test utilities for database operations.
//!
//! Provides helpers for setting up and tearing down test databases, and
//! fixture builders for in-memory mock tests.

use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use tracing::info;

use crate::entities::{booking, movie, transaction, user};

/// Test database configuration.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database username.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Database name.
    pub database: String,
}

impl Default for TestDbConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("TEST_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("TEST_DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5433),
            username: std::env::var("TEST_DB_USER").unwrap_or_else(|_| "cinewix_test".to_string()),
            password: std::env::var("TEST_DB_PASSWORD")
                .unwrap_or_else(|_| "cinewix_test".to_string()),
            database: std::env::var("TEST_DB_NAME").unwrap_or_else(|_| "cinewix_test".to_string()),
        }
    }
}

impl TestDbConfig {
    /// Get the database URL.
    #[must_use]
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }

    /// Get URL for connecting to postgres database (for creating test DB).
    #[must_use]
    pub fn postgres_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/postgres",
            self.username, self.password, self.host, self.port
        )
    }
}

/// A test database context that manages the lifecycle of a test database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: DatabaseConnection,
    /// Database configuration.
    pub config: TestDbConfig,
    #[allow(dead_code)]
    cleanup_on_drop: bool,
}

impl TestDatabase {
    /// Create a new test database with a unique name.
    pub async fn new() -> Result<Self, DbErr> {
        let config = TestDbConfig::default();
        Self::with_config(config).await
    }

    /// Create a new test database with custom configuration.
    pub async fn with_config(config: TestDbConfig) -> Result<Self, DbErr> {
        let conn = Database::connect(&config.database_url()).await?;

        info!(database = %config.database, "Connected to test database");

        Ok(Self {
            conn,
            config,
            cleanup_on_drop: false,
        })
    }

    /// Create a unique test database (for parallel tests).
    pub async fn create_unique() -> Result<Self, DbErr> {
        let mut config = TestDbConfig::default();
        let unique_suffix = uuid::Uuid::new_v4().to_string().replace('-', "_");
        config.database = format!("cinewix_test_{}", &unique_suffix[..8]);

        let postgres_conn = Database::connect(&config.postgres_url()).await?;

        let create_db = format!("CREATE DATABASE \"{}\"", config.database);
        postgres_conn
            .execute(Statement::from_string(DatabaseBackend::Postgres, create_db))
            .await?;

        postgres_conn.close().await?;

        let conn = Database::connect(&config.database_url()).await?;

        info!(database = %config.database, "Created unique test database");

        Ok(Self {
            conn,
            config,
            cleanup_on_drop: true,
        })
    }

    /// Get the database connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Clean up all data in the test database (truncate all tables).
    pub async fn cleanup(&self) -> Result<(), DbErr> {
        let tables = self
            .conn
            .query_all(Statement::from_string(
                DatabaseBackend::Postgres,
                "SELECT tablename FROM pg_tables WHERE schemaname = 'public'".to_string(),
            ))
            .await?;

        for row in tables {
            if let Ok(table_name) = row.try_get::<String>("", "tablename") {
                if table_name == "seaql_migrations" {
                    continue;
                }

                let truncate = format!("TRUNCATE TABLE \"{table_name}\" CASCADE");
                self.conn
                    .execute(Statement::from_string(DatabaseBackend::Postgres, truncate))
                    .await?;
            }
        }

        info!("Cleaned up test database");
        Ok(())
    }

    /// Drop the test database (for unique databases).
    pub async fn drop_database(self) -> Result<(), DbErr> {
        self.conn.close().await?;

        let postgres_conn = Database::connect(&self.config.postgres_url()).await?;

        let terminate = format!(
            "SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}'",
            self.config.database
        );
        postgres_conn
            .execute(Statement::from_string(DatabaseBackend::Postgres, terminate))
            .await
            .ok();

        let drop_db = format!("DROP DATABASE IF EXISTS \"{}\"", self.config.database);
        postgres_conn
            .execute(Statement::from_string(DatabaseBackend::Postgres, drop_db))
            .await?;

        postgres_conn.close().await?;

        info!(database = %self.config.database, "Dropped test database");
        Ok(())
    }

    /// Run a test with automatic cleanup.
    pub async fn run_test<F, Fut, T>(f: F) -> Result<T, DbErr>
    where
        F: for<'a> FnOnce(&'a Self) -> Fut,
        Fut: std::future::Future<Output = Result<T, DbErr>>,
    {
        let db = Self::new().await?;
        let result = f(&db).await;
        db.cleanup().await?;
        result
    }
}

/// A verified user fixture.
#[must_use]
pub fn mock_user(id: &str, email: &str) -> user::Model {
    user::Model {
        id: id.to_owned(),
        first_name: "Test".to_owned(),
        last_name: "User".to_owned(),
        email: email.to_owned(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".to_owned(),
        phone: None,
        profile_photo_url: None,
        role: user::Role::User,
        is_verified: true,
        is_permanent: false,
        verification_code: None,
        verification_expires_at: None,
        login_otp_code: None,
        login_otp_expires_at: None,
        reset_token: None,
        reset_expires_at: None,
        created_at: chrono::Utc::now().into(),
        updated_at: None,
    }
}

/// An active movie fixture with one screening slot.
#[must_use]
pub fn mock_movie(id: &str, title: &str) -> movie::Model {
    movie::Model {
        id: id.to_owned(),
        title: title.to_owned(),
        description: "A test movie.".to_owned(),
        genres: serde_json::json!(["Drama"]),
        duration_minutes: 120,
        rating: 8.0,
        director: Some("Jane Doe".to_owned()),
        cast: serde_json::json!(["Actor One"]),
        poster_url: None,
        trailer_url: None,
        release_date: chrono::NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap_or_default(),
        language: "Indonesian".to_owned(),
        age_rating: movie::AgeRating::Plus13,
        show_times: serde_json::json!([
            {"date": "2025-07-01", "time": "19:00", "studio": "Studio 1"}
        ]),
        average_user_rating: 0.0,
        review_count: 0,
        is_active: true,
        created_at: chrono::Utc::now().into(),
        updated_at: None,
    }
}

/// A pending booking fixture with two seats.
#[must_use]
pub fn mock_booking(id: &str, user_id: &str, movie_id: &str) -> booking::Model {
    booking::Model {
        id: id.to_owned(),
        user_id: user_id.to_owned(),
        movie_id: movie_id.to_owned(),
        show_date: chrono::NaiveDate::from_ymd_opt(2025, 7, 1).unwrap_or_default(),
        show_time: "19:00".to_owned(),
        studio: "Studio 1".to_owned(),
        seats: serde_json::json!([
            {"seat_number": "A1", "price": 50_000},
            {"seat_number": "A2", "price": 50_000}
        ]),
        total_price: 100_000,
        booking_code: "CWTEST001".to_owned(),
        status: booking::BookingStatus::Pending,
        payment_status: booking::PaymentStatus::Unpaid,
        payment_method: "credit_card".to_owned(),
        created_at: chrono::Utc::now().into(),
        updated_at: None,
    }
}

/// A pending payment transaction fixture.
#[must_use]
pub fn mock_transaction(id: &str, booking_id: &str, user_id: &str) -> transaction::Model {
    transaction::Model {
        id: id.to_owned(),
        transaction_code: "TRX17000000000042".to_owned(),
        booking_id: booking_id.to_owned(),
        user_id: user_id.to_owned(),
        amount: 100_000,
        payment_method: "credit_card".to_owned(),
        status: transaction::TransactionStatus::Pending,
        created_at: chrono::Utc::now().into(),
        updated_at: None,
    }
}
