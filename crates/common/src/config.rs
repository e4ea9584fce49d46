//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Email configuration (absent = email sending disabled).
    #[serde(default)]
    pub email: Option<EmailConfig>,
    /// Booking configuration.
    #[serde(default)]
    pub booking: BookingConfig,
    /// Upload storage configuration.
    #[serde(default)]
    pub uploads: UploadConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this deployment (used in email links).
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing session tokens.
    pub jwt_secret: String,
    /// Session token validity in days.
    #[serde(default = "default_token_days")]
    pub token_days: i64,
    /// Email verification code validity in minutes.
    #[serde(default = "default_verification_minutes")]
    pub verification_minutes: i64,
    /// Login OTP validity in minutes.
    #[serde(default = "default_otp_minutes")]
    pub otp_minutes: i64,
    /// Password reset token validity in minutes.
    #[serde(default = "default_reset_minutes")]
    pub reset_minutes: i64,
}

/// Email provider selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase", tag = "provider")]
pub enum EmailProviderConfig {
    /// SMTP relay.
    Smtp {
        /// SMTP host.
        host: String,
        /// SMTP port.
        #[serde(default = "default_smtp_port")]
        port: u16,
        /// Username.
        #[serde(default)]
        username: Option<String>,
        /// Password.
        #[serde(default)]
        password: Option<String>,
    },
    /// SendGrid HTTP API.
    Sendgrid {
        /// API key.
        api_key: String,
    },
    /// Mailgun HTTP API.
    Mailgun {
        /// API key.
        api_key: String,
        /// Sending domain.
        domain: String,
        /// Use the EU region endpoint.
        #[serde(default)]
        eu_region: bool,
    },
}

/// Email configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Provider settings.
    #[serde(flatten)]
    pub provider: EmailProviderConfig,
    /// From address.
    pub from_address: String,
    /// From display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

/// Booking configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfig {
    /// Fixed price per seat (Rupiah).
    #[serde(default = "default_price_per_seat")]
    pub price_per_seat: i64,
    /// Seat row labels for every studio.
    #[serde(default = "default_seat_rows")]
    pub seat_rows: Vec<String>,
    /// Seats per row.
    #[serde(default = "default_seats_per_row")]
    pub seats_per_row: u32,
    /// Prefix for generated booking codes.
    #[serde(default = "default_booking_prefix")]
    pub code_prefix: String,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            price_per_seat: default_price_per_seat(),
            seat_rows: default_seat_rows(),
            seats_per_row: default_seats_per_row(),
            code_prefix: default_booking_prefix(),
        }
    }
}

/// Upload storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Filesystem directory for uploaded profile photos.
    #[serde(default = "default_upload_path")]
    pub base_path: String,
    /// URL path prefix the files are served under.
    #[serde(default = "default_upload_url")]
    pub base_url: String,
    /// Maximum upload size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            base_path: default_upload_path(),
            base_url: default_upload_url(),
            max_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_token_days() -> i64 {
    7
}

const fn default_verification_minutes() -> i64 {
    5
}

const fn default_otp_minutes() -> i64 {
    10
}

const fn default_reset_minutes() -> i64 {
    60
}

const fn default_smtp_port() -> u16 {
    587
}

fn default_from_name() -> String {
    "Cinewix".to_string()
}

const fn default_price_per_seat() -> i64 {
    50_000
}

fn default_seat_rows() -> Vec<String> {
    ["A", "B", "C", "D", "E"].map(String::from).to_vec()
}

const fn default_seats_per_row() -> u32 {
    10
}

fn default_booking_prefix() -> String {
    "CW".to_string()
}

fn default_upload_path() -> String {
    "./uploads".to_string()
}

fn default_upload_url() -> String {
    "/uploads".to_string()
}

const fn default_max_upload_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `CINEWIX_ENV`)
    /// 3. Environment variables with `CINEWIX` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("CINEWIX_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CINEWIX")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("CINEWIX")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_defaults() {
        let booking = BookingConfig::default();
        assert_eq!(booking.price_per_seat, 50_000);
        assert_eq!(booking.seat_rows.len(), 5);
        assert_eq!(booking.seats_per_row, 10);
        assert_eq!(booking.code_prefix, "CW");
    }

    #[test]
    fn test_server_bind_defaults() {
        let toml = r#"
            url = "http://localhost:3000"
        "#;
        let server: ServerConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .and_then(config::Config::try_deserialize)
            .unwrap();

        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 3000);

        let toml = r#"
            host = "127.0.0.1"
            port = 8080
            url = "http://localhost:8080"
        "#;
        let server: ServerConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .and_then(config::Config::try_deserialize)
            .unwrap();

        assert_eq!(server.host, "127.0.0.1");
        assert_eq!(server.port, 8080);
    }

    #[test]
    fn test_email_provider_deserialize() {
        let toml = r#"
            provider = "smtp"
            host = "smtp.example.com"
            from_address = "noreply@example.com"
        "#;
        let email: EmailConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .and_then(config::Config::try_deserialize)
            .unwrap();

        assert_eq!(email.from_name, "Cinewix");
        match email.provider {
            EmailProviderConfig::Smtp { host, port, .. } => {
                assert_eq!(host, "smtp.example.com");
                assert_eq!(port, 587);
            }
            _ => panic!("Expected SMTP provider"),
        }
    }
}
