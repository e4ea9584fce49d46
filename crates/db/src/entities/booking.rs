//! Booking entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Created, awaiting confirmation or payment.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Confirmed by staff or payment.
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    /// Cancelled by the customer or staff.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// Screening took place; terminal state.
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Payment state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

/// A seat line item on a booking, stored denormalized on the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedSeat {
    /// Seat label, e.g. `"A1"`.
    pub seat_number: String,
    /// Price for this seat in rupiah.
    pub price: i64,
}

/// A seat reservation for a screening.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub user_id: String,

    #[sea_orm(indexed)]
    pub movie_id: String,

    pub show_date: Date,

    /// Start time (`HH:MM`, 24-hour).
    pub show_time: String,

    pub studio: String,

    /// Booked seats (JSON array of [`BookedSeat`]).
    #[sea_orm(column_type = "JsonBinary")]
    pub seats: Json,

    /// Total price in rupiah.
    pub total_price: i64,

    /// Human-facing receipt code, e.g. `"CW7G2K9QXA"`.
    #[sea_orm(unique)]
    pub booking_code: String,

    pub status: BookingStatus,

    pub payment_status: PaymentStatus,

    pub payment_method: String,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::movie::Entity",
        from = "Column::MovieId",
        to = "super::movie::Column::Id",
        on_delete = "Cascade"
    )]
    Movie,
    #[sea_orm(has_many = "super::booking_seat::Entity")]
    BookingSeat,
    #[sea_orm(has_one = "super::transaction::Entity")]
    Transaction,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::movie::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movie.def()
    }
}

impl Related<super::booking_seat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookingSeat.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Deserialize the booked seat list.
    #[must_use]
    pub fn seat_list(&self) -> Vec<BookedSeat> {
        serde_json::from_value(self.seats.clone()).unwrap_or_default()
    }

    /// Seat labels only, e.g. `["A1", "A2"]`.
    #[must_use]
    pub fn seat_numbers(&self) -> Vec<String> {
        self.seat_list().into_iter().map(|s| s.seat_number).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::test_utils::mock_booking;

    #[test]
    fn seat_numbers_come_from_the_seats_json() {
        let booking = mock_booking("b1", "u1", "m1");
        assert_eq!(booking.seat_numbers(), vec!["A1", "A2"]);
    }

    #[test]
    fn seat_list_tolerates_malformed_json() {
        let mut booking = mock_booking("b1", "u1", "m1");
        booking.seats = serde_json::json!("not-a-list");
        assert!(booking.seat_list().is_empty());
    }
}
