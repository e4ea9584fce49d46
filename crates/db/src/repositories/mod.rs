//! Repository layer over the entities.

pub mod booking;
pub mod movie;
pub mod review;
pub mod transaction;
pub mod user;

pub use booking::BookingRepository;
pub use movie::MovieRepository;
pub use review::ReviewRepository;
pub use transaction::TransactionRepository;
pub use user::UserRepository;
