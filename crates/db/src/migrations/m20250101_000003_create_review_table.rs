//! Create review table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Review::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Review::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Review::MovieId).string_len(32).not_null())
                    .col(ColumnDef::new(Review::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Review::UserName).string_len(256).not_null())
                    .col(ColumnDef::new(Review::Rating).small_integer().not_null())
                    .col(ColumnDef::new(Review::Comment).text().not_null())
                    .col(
                        ColumnDef::new(Review::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Review::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Unique index: one review per user per movie
        manager
            .create_index(
                Index::create()
                    .name("idx_review_movie_id_user_id")
                    .table(Review::Table)
                    .col(Review::MovieId)
                    .col(Review::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Foreign key: movie_id -> movie.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_review_movie_id")
                    .from(Review::Table, Review::MovieId)
                    .to(Movie::Table, Movie::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        // Foreign key: user_id -> user.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_review_user_id")
                    .from(Review::Table, Review::UserId)
                    .to(User::Table, User::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Review::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Review {
    Table,
    Id,
    MovieId,
    UserId,
    UserName,
    Rating,
    Comment,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Movie {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
