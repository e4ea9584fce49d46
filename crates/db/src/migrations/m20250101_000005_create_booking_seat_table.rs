//! Create booking_seat table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BookingSeat::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BookingSeat::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(BookingSeat::BookingId).string_len(32).not_null())
                    .col(ColumnDef::new(BookingSeat::MovieId).string_len(32).not_null())
                    .col(ColumnDef::new(BookingSeat::ShowDate).date().not_null())
                    .col(ColumnDef::new(BookingSeat::ShowTime).string_len(8).not_null())
                    .col(ColumnDef::new(BookingSeat::Studio).string_len(64).not_null())
                    .col(ColumnDef::new(BookingSeat::SeatNumber).string_len(8).not_null())
                    .col(ColumnDef::new(BookingSeat::Price).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Unique index: one claim per seat per screening
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_seat_screening_seat")
                    .table(BookingSeat::Table)
                    .col(BookingSeat::MovieId)
                    .col(BookingSeat::ShowDate)
                    .col(BookingSeat::ShowTime)
                    .col(BookingSeat::Studio)
                    .col(BookingSeat::SeatNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: booking_id (release on cancellation)
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_seat_booking_id")
                    .table(BookingSeat::Table)
                    .col(BookingSeat::BookingId)
                    .to_owned(),
            )
            .await?;

        // Foreign key: booking_id -> booking.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_booking_seat_booking_id")
                    .from(BookingSeat::Table, BookingSeat::BookingId)
                    .to(Booking::Table, Booking::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BookingSeat::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum BookingSeat {
    Table,
    Id,
    BookingId,
    MovieId,
    ShowDate,
    ShowTime,
    Studio,
    SeatNumber,
    Price,
}

#[derive(Iden)]
enum Booking {
    Table,
    Id,
}
