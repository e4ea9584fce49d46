//! Create movie table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Movie::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Movie::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Movie::Description).text().not_null())
                    .col(ColumnDef::new(Movie::Genres).json_binary().not_null().default("[]"))
                    .col(ColumnDef::new(Movie::DurationMinutes).integer().not_null())
                    .col(ColumnDef::new(Movie::Rating).double().not_null().default(0.0))
                    .col(ColumnDef::new(Movie::Director).string_len(256))
                    .col(ColumnDef::new(Movie::Cast).json_binary().not_null().default("[]"))
                    .col(ColumnDef::new(Movie::PosterUrl).string_len(1024))
                    .col(ColumnDef::new(Movie::TrailerUrl).string_len(1024))
                    .col(ColumnDef::new(Movie::ReleaseDate).date().not_null())
                    .col(
                        ColumnDef::new(Movie::Language)
                            .string_len(64)
                            .not_null()
                            .default("Indonesian"),
                    )
                    .col(ColumnDef::new(Movie::AgeRating).string_len(8).not_null().default("SU"))
                    .col(ColumnDef::new(Movie::ShowTimes).json_binary().not_null().default("[]"))
                    .col(
                        ColumnDef::new(Movie::AverageUserRating)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Movie::ReviewCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Movie::IsActive).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Movie::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Movie::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Index: is_active + release_date (public listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_movie_is_active_release_date")
                    .table(Movie::Table)
                    .col(Movie::IsActive)
                    .col(Movie::ReleaseDate)
                    .to_owned(),
            )
            .await?;

        // Index: title (search)
        manager
            .create_index(
                Index::create()
                    .name("idx_movie_title")
                    .table(Movie::Table)
                    .col(Movie::Title)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Movie::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Movie {
    Table,
    Id,
    Title,
    Description,
    Genres,
    DurationMinutes,
    Rating,
    Director,
    Cast,
    PosterUrl,
    TrailerUrl,
    ReleaseDate,
    Language,
    AgeRating,
    ShowTimes,
    AverageUserRating,
    ReviewCount,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
