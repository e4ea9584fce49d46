//! Create user table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(User::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(User::FirstName).string_len(128).not_null())
                    .col(ColumnDef::new(User::LastName).string_len(128).not_null())
                    .col(ColumnDef::new(User::Email).string_len(320).not_null())
                    .col(ColumnDef::new(User::PasswordHash).string_len(256).not_null())
                    .col(ColumnDef::new(User::Phone).string_len(32))
                    .col(ColumnDef::new(User::ProfilePhotoUrl).string_len(1024))
                    .col(ColumnDef::new(User::Role).string_len(16).not_null().default("user"))
                    .col(ColumnDef::new(User::IsVerified).boolean().not_null().default(false))
                    .col(ColumnDef::new(User::IsPermanent).boolean().not_null().default(false))
                    .col(ColumnDef::new(User::VerificationCode).string_len(16))
                    .col(ColumnDef::new(User::VerificationExpiresAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(User::LoginOtpCode).string_len(16))
                    .col(ColumnDef::new(User::LoginOtpExpiresAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(User::ResetToken).string_len(32))
                    .col(ColumnDef::new(User::ResetExpiresAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(User::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Unique index: email (login lookup)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_email")
                    .table(User::Table)
                    .col(User::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: reset_token (password reset lookup)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_reset_token")
                    .table(User::Table)
                    .col(User::ResetToken)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum User {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    PasswordHash,
    Phone,
    ProfilePhotoUrl,
    Role,
    IsVerified,
    IsPermanent,
    VerificationCode,
    VerificationExpiresAt,
    LoginOtpCode,
    LoginOtpExpiresAt,
    ResetToken,
    ResetExpiresAt,
    CreatedAt,
    UpdatedAt,
}
