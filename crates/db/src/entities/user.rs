//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular customer account.
    #[sea_orm(string_value = "user")]
    User,
    /// Administrator with catalog and booking management access.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Administrator that can manage other admins.
    #[sea_orm(string_value = "superadmin")]
    Superadmin,
}

impl Role {
    /// Whether this role grants access to the admin surface.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::Superadmin)
    }
}

/// A registered account.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub first_name: String,

    pub last_name: String,

    /// Lowercased email address, unique across accounts.
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 password hash (PHC string).
    #[serde(skip_serializing)]
    pub password_hash: String,

    #[sea_orm(nullable)]
    pub phone: Option<String>,

    /// Public URL of the profile photo, if uploaded.
    #[sea_orm(nullable)]
    pub profile_photo_url: Option<String>,

    pub role: Role,

    /// Whether the email address has been verified.
    #[sea_orm(default_value = false)]
    pub is_verified: bool,

    /// Permanent accounts cannot be deleted or demoted.
    #[sea_orm(default_value = false)]
    pub is_permanent: bool,

    /// Pending email verification code (6 digits).
    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    pub verification_code: Option<String>,

    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    pub verification_expires_at: Option<DateTimeWithTimeZone>,

    /// Pending login OTP code (6 digits).
    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    pub login_otp_code: Option<String>,

    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    pub login_otp_expires_at: Option<DateTimeWithTimeZone>,

    /// Pending password reset token.
    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    pub reset_token: Option<String>,

    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    pub reset_expires_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::booking::Entity")]
    Booking,
    #[sea_orm(has_many = "super::review::Entity")]
    Review,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Full display name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
