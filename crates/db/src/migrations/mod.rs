//! Database migrations.

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_user_table;
mod m20250101_000002_create_movie_table;
mod m20250101_000003_create_review_table;
mod m20250101_000004_create_booking_table;
mod m20250101_000005_create_booking_seat_table;
mod m20250101_000006_create_transaction_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_user_table::Migration),
            Box::new(m20250101_000002_create_movie_table::Migration),
            Box::new(m20250101_000003_create_review_table::Migration),
            Box::new(m20250101_000004_create_booking_table::Migration),
            Box::new(m20250101_000005_create_booking_seat_table::Migration),
            Box::new(m20250101_000006_create_transaction_table::Migration),
        ]
    }
}
