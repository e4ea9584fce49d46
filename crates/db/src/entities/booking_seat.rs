//! Seat claim entity.
//!
//! One row per seat per booking. A unique index over
//! (movie, date, time, studio, seat) makes double-booking a constraint
//! violation instead of a read-then-write race.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A claim on a single seat for one screening.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking_seat")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub booking_id: String,

    pub movie_id: String,

    pub show_date: Date,

    pub show_time: String,

    pub studio: String,

    /// Seat label, e.g. `"C7"`.
    pub seat_number: String,

    /// Price paid for this seat in rupiah.
    pub price: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::booking::Entity",
        from = "Column::BookingId",
        to = "super::booking::Column::Id",
        on_delete = "Cascade"
    )]
    Booking,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
