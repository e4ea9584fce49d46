//! Common utilities and shared types for cinewix.
//!
//! This crate provides foundational components used across all cinewix crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Code generation**: Entity IDs, booking codes and OTP codes via [`CodeGenerator`]
//! - **Barcodes**: Code 39 rendering for booking receipts
//! - **Storage**: Local file storage for profile photo uploads
//!
//! # Example
//!
//! ```no_run
//! use cinewix_common::{AppResult, CodeGenerator, Config};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let code_gen = CodeGenerator::new();
//!     let booking_code = code_gen.generate_booking_code(&config.booking.code_prefix);
//!     println!("Booking code: {booking_code}");
//!     Ok(())
//! }
//! ```

pub mod barcode;
pub mod codes;
pub mod config;
pub mod error;
pub mod storage;

pub use barcode::{render_code39_data_uri, render_code39_png};
pub use codes::CodeGenerator;
pub use config::{
    AuthConfig, BookingConfig, Config, DatabaseConfig, EmailConfig, EmailProviderConfig,
    ServerConfig, UploadConfig,
};
pub use error::{AppError, AppResult};
pub use storage::{generate_storage_key, LocalStorage, StorageBackend, UploadedFile};
