//! Database entities.

pub mod booking;
pub mod booking_seat;
pub mod movie;
pub mod review;
pub mod transaction;
pub mod user;

pub use booking::Entity as Booking;
pub use booking_seat::Entity as BookingSeat;
pub use movie::Entity as Movie;
pub use review::Entity as Review;
pub use transaction::Entity as Transaction;
pub use user::Entity as User;
