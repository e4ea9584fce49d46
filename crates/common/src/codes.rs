//! Identifier and code generation.
//!
//! Entity IDs are lowercase ULIDs. Customer-facing codes keep the formats
//! the booking desk and emails are built around: booking codes are a fixed
//! prefix plus eight characters from `A-Z0-9`, transaction codes are
//! `TRX` + millisecond timestamp + random suffix, and email verification /
//! login OTP codes are six decimal digits.

use rand::Rng;
use ulid::Ulid;

/// Alphabet for booking codes.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of the random part of a booking code.
const BOOKING_CODE_LEN: usize = 8;

/// Code generator for entities and customer-facing codes.
#[derive(Debug, Clone, Default)]
pub struct CodeGenerator {
    _private: (),
}

impl CodeGenerator {
    /// Create a new code generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based entity ID.
    #[must_use]
    pub fn generate_id(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate a booking code: `prefix` + 8 characters from `A-Z0-9`.
    #[must_use]
    pub fn generate_booking_code(&self, prefix: &str) -> String {
        let mut rng = rand::thread_rng();
        let mut code = String::with_capacity(prefix.len() + BOOKING_CODE_LEN);
        code.push_str(prefix);
        for _ in 0..BOOKING_CODE_LEN {
            let idx = rng.gen_range(0..CODE_ALPHABET.len());
            code.push(char::from(CODE_ALPHABET[idx]));
        }
        code
    }

    /// Generate a transaction code: `TRX` + millisecond timestamp + random suffix.
    #[must_use]
    pub fn generate_transaction_code(&self) -> String {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
        format!("TRX{timestamp}{suffix}")
    }

    /// Generate a six-digit numeric code for email verification and login OTP.
    #[must_use]
    pub fn generate_numeric_code(&self) -> String {
        let n: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
        n.to_string()
    }

    /// Generate a single-use password reset token.
    ///
    /// Six digits plus a millisecond timestamp, matching the format customers
    /// receive in reset links.
    #[must_use]
    pub fn generate_reset_token(&self) -> String {
        format!(
            "{}{}",
            self.generate_numeric_code(),
            chrono::Utc::now().timestamp_millis()
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id() {
        let code_gen = CodeGenerator::new();
        let id1 = code_gen.generate_id();
        let id2 = code_gen.generate_id();

        assert_eq!(id1.len(), 26);
        assert_ne!(id1, id2);
        assert_eq!(id1, id1.to_lowercase());
    }

    #[test]
    fn test_booking_code_format() {
        let code_gen = CodeGenerator::new();
        let code = code_gen.generate_booking_code("CW");

        assert_eq!(code.len(), 10);
        assert!(code.starts_with("CW"));
        assert!(code[2..]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_booking_codes_differ() {
        let code_gen = CodeGenerator::new();
        let a = code_gen.generate_booking_code("CW");
        let b = code_gen.generate_booking_code("CW");
        assert_ne!(a, b);
    }

    #[test]
    fn test_transaction_code_format() {
        let code_gen = CodeGenerator::new();
        let code = code_gen.generate_transaction_code();

        assert!(code.starts_with("TRX"));
        assert!(code[3..].chars().all(|c| c.is_ascii_digit()));
        assert!(code.len() > 10);
    }

    #[test]
    fn test_numeric_code_is_six_digits() {
        let code_gen = CodeGenerator::new();
        for _ in 0..100 {
            let code = code_gen.generate_numeric_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(code.chars().next(), Some('0'));
        }
    }

    #[test]
    fn test_reset_token_format() {
        let code_gen = CodeGenerator::new();
        let token = code_gen.generate_reset_token();
        assert!(token.len() > 6);
        assert!(token.chars().all(|c| c.is_ascii_digit()));
    }
}
