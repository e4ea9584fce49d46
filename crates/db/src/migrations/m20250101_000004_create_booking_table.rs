//! Create booking table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Booking::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Booking::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Booking::MovieId).string_len(32).not_null())
                    .col(ColumnDef::new(Booking::ShowDate).date().not_null())
                    .col(ColumnDef::new(Booking::ShowTime).string_len(8).not_null())
                    .col(ColumnDef::new(Booking::Studio).string_len(64).not_null())
                    .col(ColumnDef::new(Booking::Seats).json_binary().not_null().default("[]"))
                    .col(ColumnDef::new(Booking::TotalPrice).big_integer().not_null())
                    .col(ColumnDef::new(Booking::BookingCode).string_len(16).not_null())
                    .col(ColumnDef::new(Booking::Status).string_len(16).not_null().default("pending"))
                    .col(
                        ColumnDef::new(Booking::PaymentStatus)
                            .string_len(16)
                            .not_null()
                            .default("unpaid"),
                    )
                    .col(ColumnDef::new(Booking::PaymentMethod).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Booking::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Booking::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Unique index: booking_code (receipt lookup)
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_booking_code")
                    .table(Booking::Table)
                    .col(Booking::BookingCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Composite index: (user_id, created_at) for booking history
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_user_id_created_at")
                    .table(Booking::Table)
                    .col(Booking::UserId)
                    .col(Booking::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: movie_id
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_movie_id")
                    .table(Booking::Table)
                    .col(Booking::MovieId)
                    .to_owned(),
            )
            .await?;

        // Foreign key: user_id -> user.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_booking_user_id")
                    .from(Booking::Table, Booking::UserId)
                    .to(User::Table, User::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        // Foreign key: movie_id -> movie.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_booking_movie_id")
                    .from(Booking::Table, Booking::MovieId)
                    .to(Movie::Table, Movie::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Booking {
    Table,
    Id,
    UserId,
    MovieId,
    ShowDate,
    ShowTime,
    Studio,
    Seats,
    TotalPrice,
    BookingCode,
    Status,
    PaymentStatus,
    PaymentMethod,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Movie {
    Table,
    Id,
}
