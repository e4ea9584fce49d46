//! Movie entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Indonesian film classification rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum AgeRating {
    /// Suitable for all ages ("Semua Umur").
    #[sea_orm(string_value = "SU")]
    #[serde(rename = "SU")]
    AllAges,
    /// Viewers 13 and older.
    #[sea_orm(string_value = "13+")]
    #[serde(rename = "13+")]
    Plus13,
    /// Viewers 17 and older.
    #[sea_orm(string_value = "17+")]
    #[serde(rename = "17+")]
    Plus17,
    /// Viewers 21 and older.
    #[sea_orm(string_value = "21+")]
    #[serde(rename = "21+")]
    Plus21,
}

/// A scheduled screening slot for a movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowTime {
    /// Calendar date of the screening (`YYYY-MM-DD`).
    pub date: String,
    /// Start time (`HH:MM`, 24-hour).
    pub time: String,
    /// Studio name, e.g. `"Studio 1"`.
    pub studio: String,
}

/// A movie in the catalog.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movie")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Genre names (JSON array of strings).
    #[sea_orm(column_type = "JsonBinary")]
    pub genres: Json,

    /// Running time in minutes.
    pub duration_minutes: i32,

    /// Editorial rating, 0.0 to 10.0.
    pub rating: f64,

    #[sea_orm(nullable)]
    pub director: Option<String>,

    /// Cast member names (JSON array of strings).
    #[sea_orm(column_type = "JsonBinary")]
    pub cast: Json,

    #[sea_orm(nullable)]
    pub poster_url: Option<String>,

    #[sea_orm(nullable)]
    pub trailer_url: Option<String>,

    pub release_date: Date,

    #[sea_orm(default_value = "Indonesian")]
    pub language: String,

    pub age_rating: AgeRating,

    /// Screening schedule (JSON array of [`ShowTime`]).
    #[sea_orm(column_type = "JsonBinary")]
    pub show_times: Json,

    /// Mean of review ratings, rounded to one decimal. Zero when unreviewed.
    #[sea_orm(default_value = 0.0)]
    pub average_user_rating: f64,

    #[sea_orm(default_value = 0)]
    pub review_count: i32,

    /// Inactive movies are hidden from public listings.
    #[sea_orm(default_value = true)]
    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::booking::Entity")]
    Booking,
    #[sea_orm(has_many = "super::review::Entity")]
    Review,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Deserialize the screening schedule.
    #[must_use]
    pub fn show_time_list(&self) -> Vec<ShowTime> {
        serde_json::from_value(self.show_times.clone()).unwrap_or_default()
    }

    /// Whether the movie is scheduled for the given slot.
    #[must_use]
    pub fn has_show_time(&self, date: &str, time: &str, studio: &str) -> bool {
        self.show_time_list()
            .iter()
            .any(|s| s.date == date && s.time == time && s.studio == studio)
    }
}
