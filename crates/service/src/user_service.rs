use std::sync::Arc;

use tracing::{info, instrument};

use models::user::NewUser;

use crate::domain::{AvatarUpdate, NewProfile, User};
use crate::errors::{parse_id, ServiceError};
use crate::repository::UserRepository;

/// Profile management and user directory reads
pub struct UserService<R: UserRepository + ?Sized> {
    repo: Arc<R>,
}

fn present(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl<R: UserRepository + ?Sized> UserService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Create a profile on first submission after identity-provider signup.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::{UserService, domain::NewProfile, repository::memory::MemoryRepository};
    /// let svc = UserService::new(Arc::new(MemoryRepository::new()));
    /// let input = NewProfile {
    ///     external_id: Some("user_2abc".into()),
    ///     email: Some("ana@example.com".into()),
    ///     name: Some("Ana".into()),
    ///     ..Default::default()
    /// };
    /// let user = tokio_test::block_on(svc.create(input)).unwrap();
    /// assert!(user.dogs_listed.is_empty());
    /// ```
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: NewProfile) -> Result<User, ServiceError> {
        let missing: Vec<&str> = [
            ("externalId", present(&input.external_id)),
            ("email", present(&input.email)),
            ("name", present(&input.name)),
        ]
        .into_iter()
        .filter_map(|(field, v)| v.is_none().then_some(field))
        .collect();
        if !missing.is_empty() {
            return Err(ServiceError::Validation(format!("missing required fields: {}", missing.join(", "))));
        }

        let new_user = NewUser {
            external_id: input.external_id.unwrap_or_default(),
            email: input.email.unwrap_or_default(),
            name: input.name.unwrap_or_default(),
            avatar_url: input.avatar_url.unwrap_or_default(),
            phone: input.phone,
            profile_complete: input.profile_complete.unwrap_or(true),
        };
        let created = self.repo.create_user(&new_user).await?;
        info!(user_id = %created.id, external_id = %created.external_id, "user_created");
        Ok(created.into())
    }

    #[instrument(skip(self))]
    pub async fn get_by_external_id(&self, external_id: &str) -> Result<User, ServiceError> {
        self.repo
            .find_user_by_external_id(external_id.trim())
            .await?
            .map(User::from)
            .ok_or_else(|| ServiceError::not_found("user", external_id))
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, raw_id: &str) -> Result<User, ServiceError> {
        let id = parse_id(raw_id)?;
        self.repo
            .find_user(id)
            .await?
            .map(User::from)
            .ok_or_else(|| ServiceError::not_found("user", id))
    }

    pub async fn list(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.repo.list_users().await?.into_iter().map(User::from).collect())
    }

    /// Replace the avatar URL. The listing collection is left untouched.
    #[instrument(skip(self, update))]
    pub async fn set_avatar(&self, raw_id: &str, update: AvatarUpdate) -> Result<User, ServiceError> {
        let id = parse_id(raw_id)?;
        let Some(url) = present(&update.avatar_url).map(str::to_string) else {
            return Err(ServiceError::Validation("avatarUrl is required".into()));
        };
        let updated = self
            .repo
            .set_avatar(id, &url)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", id))?;
        info!(user_id = %id, "avatar_updated");
        Ok(updated.into())
    }
}
