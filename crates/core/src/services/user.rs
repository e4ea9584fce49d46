//! User profile service.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use cinewix_common::{
    AppError, AppResult, Config, LocalStorage, StorageBackend, generate_storage_key,
};
use cinewix_db::{entities::user, repositories::UserRepository};
use sea_orm::{Set, Unchanged};

/// Input for updating the caller's profile. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 128))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub last_name: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(min = 6, max = 32))]
    pub phone: Option<String>,
}

/// User profile service.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    storage: Arc<LocalStorage>,
    max_upload_bytes: u64,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(user_repo: UserRepository, config: &Config) -> Self {
        Self {
            user_repo,
            storage: Arc::new(LocalStorage::new(
                config.uploads.base_path.clone().into(),
                config.uploads.base_url.clone(),
            )),
            max_upload_bytes: config.uploads.max_bytes,
        }
    }

    /// The caller's profile.
    pub async fn get_profile(&self, user_id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(user_id).await
    }

    /// Update name, phone or email. An email change to an address another
    /// account holds is rejected with a conflict.
    pub async fn update_profile(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let current = self.user_repo.get_by_id(user_id).await?;

        let mut model = user::ActiveModel {
            id: Unchanged(current.id.clone()),
            updated_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };

        if let Some(first_name) = input.first_name {
            model.first_name = Set(first_name.trim().to_string());
        }
        if let Some(last_name) = input.last_name {
            model.last_name = Set(last_name.trim().to_string());
        }
        if let Some(phone) = input.phone {
            model.phone = Set(Some(phone));
        }
        if let Some(email) = input.email {
            let email = email.trim().to_lowercase();
            if email != current.email {
                if self.user_repo.find_by_email(&email).await?.is_some() {
                    return Err(AppError::Conflict("Email already in use".to_string()));
                }
                model.email = Set(email);
            }
        }

        self.user_repo.update(model).await
    }

    /// Store an uploaded profile photo and record its URL.
    pub async fn update_photo(
        &self,
        user_id: &str,
        file_name: &str,
        content_type: &str,
        data: &[u8],
    ) -> AppResult<user::Model> {
        if data.is_empty() {
            return Err(AppError::BadRequest("Empty upload".to_string()));
        }
        if data.len() as u64 > self.max_upload_bytes {
            return Err(AppError::BadRequest(format!(
                "Photo exceeds the {} byte limit",
                self.max_upload_bytes
            )));
        }
        if !content_type.starts_with("image/") {
            return Err(AppError::BadRequest(
                "Profile photo must be an image".to_string(),
            ));
        }

        let current = self.user_repo.get_by_id(user_id).await?;

        let key = generate_storage_key(&current.id, file_name);
        let uploaded = self.storage.upload(&key, data, content_type).await?;

        let updated = self
            .user_repo
            .update(user::ActiveModel {
                id: Unchanged(current.id),
                profile_photo_url: Set(Some(uploaded.url)),
                updated_at: Set(Some(Utc::now().into())),
                ..Default::default()
            })
            .await?;

        tracing::info!(user_id = %updated.id, key = %key, "Updated profile photo");
        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn profile_input_rejects_invalid_email() {
        let input = UpdateProfileInput {
            first_name: None,
            last_name: None,
            email: Some("nope".to_string()),
            phone: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn profile_input_accepts_partial_updates() {
        let input = UpdateProfileInput {
            first_name: Some("Ada".to_string()),
            last_name: None,
            email: None,
            phone: None,
        };
        assert!(input.validate().is_ok());
    }
}
