//! Authentication service.
//!
//! Registration with emailed verification codes, the two-step OTP login,
//! password resets and JWT session tokens.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use validator::Validate;

use cinewix_common::{AppError, AppResult, CodeGenerator, Config};
use cinewix_db::{entities::user, repositories::UserRepository};
use sea_orm::{Set, Unchanged};

use crate::EmailService;

/// JWT session claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    /// Email address at issue time.
    pub email: String,
    /// Role at issue time.
    pub role: String,
    /// Expiry as a Unix timestamp.
    pub exp: i64,
}

/// Input for registering a new account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 128))]
    pub first_name: String,

    #[validate(length(min = 1, max = 128))]
    pub last_name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,

    #[validate(length(min = 6, max = 32))]
    pub phone: String,
}

/// Input for verifying a registration email.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailInput {
    #[validate(length(min = 1))]
    pub user_id: String,

    #[validate(length(equal = 6))]
    pub code: String,
}

/// Input for the first login step.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Input for the second login step.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyLoginOtpInput {
    pub user_id: Option<String>,

    #[validate(length(equal = 6))]
    pub otp_code: String,
}

/// Input for requesting a fresh login OTP.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendLoginOtpInput {
    pub user_id: Option<String>,
    pub email: Option<String>,
}

/// Input for completing a password reset.
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordInput {
    #[validate(length(min = 1))]
    pub token: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

/// Result of the first login step.
#[derive(Debug)]
pub enum LoginOutcome {
    /// The account's email is not verified yet; no OTP was sent.
    NeedsVerification {
        /// Pending user ID, for the resend-verification flow.
        user_id: String,
    },
    /// Credentials matched; an OTP was emailed.
    OtpSent {
        /// User ID for the verify-login-otp step.
        user_id: String,
    },
}

/// Authentication service for business logic.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    email_service: EmailService,
    code_gen: CodeGenerator,
    jwt_secret: String,
    token_days: i64,
    verification_minutes: i64,
    otp_minutes: i64,
    reset_minutes: i64,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(user_repo: UserRepository, email_service: EmailService, config: &Config) -> Self {
        Self {
            user_repo,
            email_service,
            code_gen: CodeGenerator::new(),
            jwt_secret: config.auth.jwt_secret.clone(),
            token_days: config.auth.token_days,
            verification_minutes: config.auth.verification_minutes,
            otp_minutes: config.auth.otp_minutes,
            reset_minutes: config.auth.reset_minutes,
        }
    }

    /// Session token lifetime in days.
    #[must_use]
    pub const fn token_days(&self) -> i64 {
        self.token_days
    }

    /// Register a new account and email the verification code.
    ///
    /// The verification email is best-effort: delivery failure is logged
    /// and the registration still succeeds.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::BadRequest(
                "An account with this email already exists".to_string(),
            ));
        }

        let code = self.code_gen.generate_numeric_code();
        let now = Utc::now();
        let expires = now + Duration::minutes(self.verification_minutes);

        let model = user::ActiveModel {
            id: Set(self.code_gen.generate_id()),
            first_name: Set(input.first_name.trim().to_string()),
            last_name: Set(input.last_name.trim().to_string()),
            email: Set(email.clone()),
            password_hash: Set(hash_password(&input.password)?),
            phone: Set(Some(input.phone)),
            profile_photo_url: Set(None),
            role: Set(user::Role::User),
            is_verified: Set(false),
            is_permanent: Set(false),
            verification_code: Set(Some(code.clone())),
            verification_expires_at: Set(Some(expires.into())),
            login_otp_code: Set(None),
            login_otp_expires_at: Set(None),
            reset_token: Set(None),
            reset_expires_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let created = self.user_repo.create(model).await?;

        if let Err(e) = self
            .email_service
            .send_verification_email(&created.email, &created.first_name, &code)
            .await
        {
            tracing::warn!(user_id = %created.id, error = %e, "Failed to send verification email");
        }

        tracing::info!(user_id = %created.id, "Registered new account");
        Ok(created)
    }

    /// Verify a registration code and issue a session token.
    pub async fn verify_email(&self, input: VerifyEmailInput) -> AppResult<(user::Model, String)> {
        input.validate()?;

        let user = self.user_repo.get_by_id(&input.user_id).await?;

        if user.is_verified {
            return Err(AppError::BadRequest("Email is already verified".to_string()));
        }

        let stored = user
            .verification_code
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("No verification code pending".to_string()))?;

        if stored != input.code {
            return Err(AppError::BadRequest("Invalid verification code".to_string()));
        }

        if is_expired(user.verification_expires_at) {
            return Err(AppError::BadRequest(
                "Verification code has expired".to_string(),
            ));
        }

        let updated = self
            .user_repo
            .update(user::ActiveModel {
                id: Unchanged(user.id),
                is_verified: Set(true),
                verification_code: Set(None),
                verification_expires_at: Set(None),
                updated_at: Set(Some(Utc::now().into())),
                ..Default::default()
            })
            .await?;

        let token = self.sign_token(&updated)?;
        tracing::info!(user_id = %updated.id, "Email verified");
        Ok((updated, token))
    }

    /// Regenerate and email a verification code.
    pub async fn resend_verification(&self, user_id: &str) -> AppResult<()> {
        let user = self.user_repo.get_by_id(user_id).await?;

        if user.is_verified {
            return Err(AppError::BadRequest("Email is already verified".to_string()));
        }

        let code = self.code_gen.generate_numeric_code();
        let expires = Utc::now() + Duration::minutes(self.verification_minutes);

        let updated = self
            .user_repo
            .update(user::ActiveModel {
                id: Unchanged(user.id),
                verification_code: Set(Some(code.clone())),
                verification_expires_at: Set(Some(expires.into())),
                ..Default::default()
            })
            .await?;

        self.email_service
            .send_verification_email(&updated.email, &updated.first_name, &code)
            .await
    }

    /// First login step: check credentials and email an OTP.
    ///
    /// Unknown emails and wrong passwords are indistinguishable to the
    /// caller. No session token is issued until the OTP is verified.
    pub async fn login(&self, input: LoginInput) -> AppResult<LoginOutcome> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        if !user.is_verified {
            return Ok(LoginOutcome::NeedsVerification { user_id: user.id });
        }

        let code = self.code_gen.generate_numeric_code();
        let expires = Utc::now() + Duration::minutes(self.otp_minutes);

        let updated = self
            .user_repo
            .update(user::ActiveModel {
                id: Unchanged(user.id),
                login_otp_code: Set(Some(code.clone())),
                login_otp_expires_at: Set(Some(expires.into())),
                ..Default::default()
            })
            .await?;

        self.email_service
            .send_login_otp_email(&updated.email, &updated.first_name, &code)
            .await?;

        tracing::debug!(user_id = %updated.id, "Login OTP issued");
        Ok(LoginOutcome::OtpSent { user_id: updated.id })
    }

    /// Second login step: verify the OTP and issue a session token.
    pub async fn verify_login_otp(
        &self,
        input: VerifyLoginOtpInput,
    ) -> AppResult<(user::Model, String)> {
        input.validate()?;

        let user = match &input.user_id {
            Some(id) => Some(self.user_repo.get_by_id(id).await?),
            None => self.user_repo.find_by_login_otp(&input.otp_code).await?,
        }
        .ok_or_else(|| AppError::UserNotFound("unknown".to_string()))?;

        let stored = user
            .login_otp_code
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("No login code pending".to_string()))?;

        if stored != input.otp_code {
            return Err(AppError::BadRequest("Invalid login code".to_string()));
        }

        if is_expired(user.login_otp_expires_at) {
            return Err(AppError::BadRequest("Login code has expired".to_string()));
        }

        let updated = self
            .user_repo
            .update(user::ActiveModel {
                id: Unchanged(user.id),
                login_otp_code: Set(None),
                login_otp_expires_at: Set(None),
                ..Default::default()
            })
            .await?;

        let token = self.sign_token(&updated)?;
        tracing::info!(user_id = %updated.id, "Login completed");
        Ok((updated, token))
    }

    /// Regenerate and email a login OTP.
    pub async fn resend_login_otp(&self, input: ResendLoginOtpInput) -> AppResult<()> {
        let user = match (&input.user_id, &input.email) {
            (Some(id), _) => self.user_repo.get_by_id(id).await?,
            (None, Some(email)) => self
                .user_repo
                .find_by_email(&email.trim().to_lowercase())
                .await?
                .ok_or_else(|| AppError::UserNotFound(email.clone()))?,
            (None, None) => {
                return Err(AppError::BadRequest(
                    "userId or email is required".to_string(),
                ));
            }
        };

        if !user.is_verified {
            return Err(AppError::BadRequest("Email is not verified".to_string()));
        }

        let code = self.code_gen.generate_numeric_code();
        let expires = Utc::now() + Duration::minutes(self.otp_minutes);

        let updated = self
            .user_repo
            .update(user::ActiveModel {
                id: Unchanged(user.id),
                login_otp_code: Set(Some(code.clone())),
                login_otp_expires_at: Set(Some(expires.into())),
                ..Default::default()
            })
            .await?;

        self.email_service
            .send_login_otp_email(&updated.email, &updated.first_name, &code)
            .await
    }

    /// Store a single-use reset token and email the reset link.
    pub async fn forgot_password(&self, email: &str) -> AppResult<()> {
        let normalized = email.trim().to_lowercase();
        let user = self
            .user_repo
            .find_by_email(&normalized)
            .await?
            .ok_or_else(|| AppError::UserNotFound(normalized))?;

        let token = self.code_gen.generate_reset_token();
        let expires = Utc::now() + Duration::minutes(self.reset_minutes);

        let updated = self
            .user_repo
            .update(user::ActiveModel {
                id: Unchanged(user.id),
                reset_token: Set(Some(token.clone())),
                reset_expires_at: Set(Some(expires.into())),
                ..Default::default()
            })
            .await?;

        self.email_service
            .send_password_reset_email(&updated.email, &updated.first_name, &token)
            .await
    }

    /// Consume a reset token and overwrite the password.
    pub async fn reset_password(&self, input: ResetPasswordInput) -> AppResult<()> {
        input.validate()?;

        let user = self
            .user_repo
            .find_by_reset_token(&input.token)
            .await?
            .ok_or_else(|| AppError::NotFound("Invalid reset token".to_string()))?;

        if is_expired(user.reset_expires_at) {
            return Err(AppError::BadRequest("Reset token has expired".to_string()));
        }

        self.user_repo
            .update(user::ActiveModel {
                id: Unchanged(user.id.clone()),
                password_hash: Set(hash_password(&input.password)?),
                reset_token: Set(None),
                reset_expires_at: Set(None),
                updated_at: Set(Some(Utc::now().into())),
                ..Default::default()
            })
            .await?;

        tracing::info!(user_id = %user.id, "Password reset");
        Ok(())
    }

    /// Resolve a session token to its user.
    pub async fn authenticate(&self, token: &str) -> AppResult<user::Model> {
        let claims = self.verify_token(token)?;
        self.user_repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Sign a session token for a user.
    pub fn sign_token(&self, user: &user::Model) -> AppResult<String> {
        let exp = Utc::now() + Duration::days(self.token_days);
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: role_name(user.role).to_string(),
            exp: exp.timestamp(),
        };

        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify a session token.
    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)
    }
}

/// Stable lowercase name for a role.
const fn role_name(role: user::Role) -> &'static str {
    match role {
        user::Role::User => "user",
        user::Role::Admin => "admin",
        user::Role::Superadmin => "superadmin",
    }
}

fn is_expired(expires_at: Option<chrono::DateTime<chrono::FixedOffset>>) -> bool {
    expires_at.map_or(true, |at| at < Utc::now())
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn register_input_rejects_bad_email_and_short_password() {
        let input = RegisterInput {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "not-an-email".to_string(),
            password: "secret123".to_string(),
            phone: "08123456789".to_string(),
        };
        assert!(input.validate().is_err());

        let input = RegisterInput {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "short".to_string(),
            phone: "08123456789".to_string(),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn expiry_check_treats_missing_timestamp_as_expired() {
        assert!(is_expired(None));
        assert!(is_expired(Some((Utc::now() - Duration::minutes(1)).into())));
        assert!(!is_expired(Some((Utc::now() + Duration::minutes(1)).into())));
    }

    #[tokio::test]
    async fn login_with_good_credentials_issues_otp_not_a_session() {
        use cinewix_db::test_utils::mock_user;
        use sea_orm::{DatabaseBackend, MockDatabase};

        let mut stored = mock_user("u1", "ada@example.com");
        stored.password_hash = hash_password("secret123").unwrap();
        let mut with_otp = stored.clone();
        with_otp.login_otp_code = Some("123456".to_string());
        with_otp.login_otp_expires_at = Some((Utc::now() + Duration::minutes(10)).into());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored]])
            .append_query_results([vec![with_otp]])
            .into_connection();

        let outcome = service_with(db)
            .login(LoginInput {
                email: "ada@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        // No session token until the OTP step completes.
        assert!(matches!(outcome, LoginOutcome::OtpSent { user_id } if user_id == "u1"));
    }

    #[tokio::test]
    async fn login_unverified_account_requires_verification_first() {
        use cinewix_db::test_utils::mock_user;
        use sea_orm::{DatabaseBackend, MockDatabase};

        let mut stored = mock_user("u1", "ada@example.com");
        stored.password_hash = hash_password("secret123").unwrap();
        stored.is_verified = false;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored]])
            .into_connection();

        let outcome = service_with(db)
            .login(LoginInput {
                email: "ada@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        assert!(matches!(outcome, LoginOutcome::NeedsVerification { user_id } if user_id == "u1"));
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthorized() {
        use cinewix_db::test_utils::mock_user;
        use sea_orm::{DatabaseBackend, MockDatabase};

        let mut stored = mock_user("u1", "ada@example.com");
        stored.password_hash = hash_password("secret123").unwrap();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored]])
            .into_connection();

        let err = service_with(db)
            .login(LoginInput {
                email: "ada@example.com".to_string(),
                password: "not-the-password".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unauthorized));
    }

    fn test_config() -> Config {
        use cinewix_common::config::{
            AuthConfig, BookingConfig, DatabaseConfig, ServerConfig, UploadConfig,
        };

        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                url: "http://localhost:3000".to_string(),
            },
            database: DatabaseConfig {
                url: "postgres://localhost/cinewix".to_string(),
                max_connections: 5,
                min_connections: 1,
            },
            auth: AuthConfig {
                jwt_secret: "unit-test-secret".to_string(),
                token_days: 7,
                verification_minutes: 5,
                otp_minutes: 10,
                reset_minutes: 60,
            },
            email: None,
            booking: BookingConfig::default(),
            uploads: UploadConfig::default(),
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> AuthService {
        let config = test_config();
        AuthService::new(
            UserRepository::new(std::sync::Arc::new(db)),
            EmailService::new(&config),
            &config,
        )
    }

    fn jwt_service() -> AuthService {
        use sea_orm::{DatabaseBackend, MockDatabase};

        service_with(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    #[test]
    fn jwt_round_trip_preserves_claims() {
        let service = jwt_service();
        let user = cinewix_db::test_utils::mock_user("u42", "ada@example.com");

        let token = service.sign_token(&user).unwrap();
        let claims = service.verify_token(&token).unwrap();

        assert_eq!(claims.sub, "u42");
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.role, "user");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = jwt_service();
        let user = cinewix_db::test_utils::mock_user("u42", "ada@example.com");

        let mut token = service.sign_token(&user).unwrap();
        token.push('x');
        assert!(matches!(
            service.verify_token(&token),
            Err(AppError::Unauthorized)
        ));
    }
}
