//! Business logic services.

pub mod admin;
pub mod auth;
pub mod booking;
pub mod email;
pub mod movie;
pub mod user;

pub use admin::{AdminService, DashboardStats, UpdateBookingStatusInput, UpdateUserRoleInput};
pub use auth::{
    AuthService, Claims, LoginInput, LoginOutcome, RegisterInput, ResendLoginOtpInput,
    ResetPasswordInput, VerifyEmailInput, VerifyLoginOtpInput,
};
pub use booking::{BookingService, CreateBookingInput, SeatAvailability};
pub use email::{BookingReceipt, EmailMessage, EmailService};
pub use movie::{CreateMovieInput, CreateReviewInput, MovieService, ShowTimeInput, UpdateMovieInput};
pub use user::{UpdateProfileInput, UserService};
