//! Core business logic for cinewix.

pub mod services;

pub use services::*;
