//! Create payment_transaction table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PaymentTransaction::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentTransaction::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PaymentTransaction::TransactionCode)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PaymentTransaction::BookingId).string_len(32).not_null())
                    .col(ColumnDef::new(PaymentTransaction::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(PaymentTransaction::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(PaymentTransaction::PaymentMethod)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentTransaction::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(PaymentTransaction::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(PaymentTransaction::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Unique index: transaction_code
        manager
            .create_index(
                Index::create()
                    .name("idx_payment_transaction_code")
                    .table(PaymentTransaction::Table)
                    .col(PaymentTransaction::TransactionCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Unique index: one transaction per booking
        manager
            .create_index(
                Index::create()
                    .name("idx_payment_transaction_booking_id")
                    .table(PaymentTransaction::Table)
                    .col(PaymentTransaction::BookingId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: user_id
        manager
            .create_index(
                Index::create()
                    .name("idx_payment_transaction_user_id")
                    .table(PaymentTransaction::Table)
                    .col(PaymentTransaction::UserId)
                    .to_owned(),
            )
            .await?;

        // Foreign key: booking_id -> booking.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_payment_transaction_booking_id")
                    .from(PaymentTransaction::Table, PaymentTransaction::BookingId)
                    .to(Booking::Table, Booking::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        // Foreign key: user_id -> user.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_payment_transaction_user_id")
                    .from(PaymentTransaction::Table, PaymentTransaction::UserId)
                    .to(User::Table, User::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PaymentTransaction::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PaymentTransaction {
    Table,
    Id,
    TransactionCode,
    BookingId,
    UserId,
    Amount,
    PaymentMethod,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Booking {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
