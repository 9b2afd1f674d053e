use async_trait::async_trait;
use uuid::Uuid;

use models::dog::{self, DogFields};
use models::geo::{BoundingBox, GeoPoint};
use models::user::{self, NewUser};

use crate::errors::ServiceError;

/// Persistence for user profiles.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, input: &NewUser) -> Result<user::Model, ServiceError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<user::Model>, ServiceError>;
    async fn find_user_by_external_id(&self, external_id: &str) -> Result<Option<user::Model>, ServiceError>;
    async fn list_users(&self) -> Result<Vec<user::Model>, ServiceError>;
    async fn set_avatar(&self, id: Uuid, avatar_url: &str) -> Result<Option<user::Model>, ServiceError>;
    /// Pull a dog id out of the owner's collection; `None` if the owner is gone.
    async fn remove_listed_dog(&self, user_id: Uuid, dog_id: Uuid) -> Result<Option<user::Model>, ServiceError>;
}

/// Persistence for dog listings.
#[async_trait]
pub trait DogRepository: Send + Sync {
    /// Insert the dog and append its id to the owner's `dogs_listed` as one
    /// unit of work. Either both writes are visible afterwards or neither is.
    async fn create_for_owner(
        &self,
        fields: &DogFields,
        location: GeoPoint,
        owner_id: Uuid,
    ) -> Result<(dog::Model, user::Model), ServiceError>;
    async fn find_dog(&self, id: Uuid) -> Result<Option<dog::Model>, ServiceError>;
    async fn list_with_lister(&self) -> Result<Vec<(dog::Model, Option<user::Model>)>, ServiceError>;
    async fn find_dogs_by_ids(&self, ids: &[Uuid]) -> Result<Vec<dog::Model>, ServiceError>;
    async fn find_dogs_by_lister(&self, lister_id: Uuid) -> Result<Vec<dog::Model>, ServiceError>;
    async fn find_dogs_in_box(&self, bbox: &BoundingBox) -> Result<Vec<dog::Model>, ServiceError>;
    /// `None` when the dog was already adopted or no longer exists.
    async fn mark_adopted(&self, dog_id: Uuid, adopter_id: Uuid) -> Result<Option<dog::Model>, ServiceError>;
    async fn delete_dog(&self, id: Uuid) -> Result<Option<dog::Model>, ServiceError>;
}

/// In-memory repository for tests and doc examples. One lock guards both
/// tables, which gives `create_for_owner` the same all-or-nothing outcome as
/// the database transaction.
pub mod memory {
    use super::*;
    use std::collections::HashMap;

    use chrono::Utc;
    use models::dog::validate_fields;
    use models::user::{push_dog, pull_dog, validate_new};
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct Tables {
        users: HashMap<Uuid, user::Model>,
        dogs: HashMap<Uuid, dog::Model>,
    }

    #[derive(Default)]
    pub struct MemoryRepository {
        tables: Mutex<Tables>,
    }

    impl MemoryRepository {
        pub fn new() -> Self { Self::default() }
    }

    fn newest_first(mut dogs: Vec<dog::Model>) -> Vec<dog::Model> {
        dogs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        dogs
    }

    #[async_trait]
    impl UserRepository for MemoryRepository {
        async fn create_user(&self, input: &NewUser) -> Result<user::Model, ServiceError> {
            let input = validate_new(input)?;
            let mut t = self.tables.lock().await;
            if t.users.values().any(|u| u.external_id == input.external_id) {
                return Err(ServiceError::Conflict(format!("externalId {} already registered", input.external_id)));
            }
            if t.users.values().any(|u| u.email == input.email) {
                return Err(ServiceError::Conflict(format!("email {} already registered", input.email)));
            }
            let now = Utc::now().into();
            let created = user::Model {
                id: Uuid::new_v4(),
                external_id: input.external_id,
                email: input.email,
                name: input.name,
                avatar_url: input.avatar_url,
                phone: input.phone,
                profile_complete: input.profile_complete,
                dogs_listed: Vec::new(),
                created_at: now,
                updated_at: now,
            };
            t.users.insert(created.id, created.clone());
            Ok(created)
        }

        async fn find_user(&self, id: Uuid) -> Result<Option<user::Model>, ServiceError> {
            Ok(self.tables.lock().await.users.get(&id).cloned())
        }

        async fn find_user_by_external_id(&self, external_id: &str) -> Result<Option<user::Model>, ServiceError> {
            let t = self.tables.lock().await;
            Ok(t.users.values().find(|u| u.external_id == external_id).cloned())
        }

        async fn list_users(&self) -> Result<Vec<user::Model>, ServiceError> {
            let t = self.tables.lock().await;
            let mut users: Vec<_> = t.users.values().cloned().collect();
            users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            Ok(users)
        }

        async fn set_avatar(&self, id: Uuid, avatar_url: &str) -> Result<Option<user::Model>, ServiceError> {
            let mut t = self.tables.lock().await;
            Ok(t.users.get_mut(&id).map(|u| {
                u.avatar_url = avatar_url.trim().to_string();
                u.updated_at = Utc::now().into();
                u.clone()
            }))
        }

        async fn remove_listed_dog(&self, user_id: Uuid, dog_id: Uuid) -> Result<Option<user::Model>, ServiceError> {
            let mut t = self.tables.lock().await;
            Ok(t.users.get_mut(&user_id).map(|u| {
                if pull_dog(&mut u.dogs_listed, dog_id) {
                    u.updated_at = Utc::now().into();
                }
                u.clone()
            }))
        }
    }

    #[async_trait]
    impl DogRepository for MemoryRepository {
        async fn create_for_owner(
            &self,
            fields: &DogFields,
            location: GeoPoint,
            owner_id: Uuid,
        ) -> Result<(dog::Model, user::Model), ServiceError> {
            let mut t = self.tables.lock().await;
            if !t.users.contains_key(&owner_id) {
                return Err(ServiceError::not_found("user", owner_id));
            }
            let valid = validate_fields(fields)?;
            let location = GeoPoint::new(location.longitude, location.latitude)?;
            let now = Utc::now().into();
            let created = dog::Model {
                id: Uuid::new_v4(),
                image_url: valid.image_url,
                dog_type: valid.dog_type.as_str().to_string(),
                age: valid.age.as_str().to_string(),
                gender: valid.gender.as_str().to_string(),
                longitude: location.longitude,
                latitude: location.latitude,
                lister_id: owner_id,
                adopted: false,
                adopted_by: None,
                created_at: now,
                updated_at: now,
            };
            let owner = match t.users.get_mut(&owner_id) {
                Some(owner) => {
                    push_dog(&mut owner.dogs_listed, created.id);
                    owner.updated_at = now;
                    owner.clone()
                }
                None => return Err(ServiceError::not_found("user", owner_id)),
            };
            t.dogs.insert(created.id, created.clone());
            Ok((created, owner))
        }

        async fn find_dog(&self, id: Uuid) -> Result<Option<dog::Model>, ServiceError> {
            Ok(self.tables.lock().await.dogs.get(&id).cloned())
        }

        async fn list_with_lister(&self) -> Result<Vec<(dog::Model, Option<user::Model>)>, ServiceError> {
            let t = self.tables.lock().await;
            let dogs = newest_first(t.dogs.values().cloned().collect());
            Ok(dogs
                .into_iter()
                .map(|d| {
                    let lister = t.users.get(&d.lister_id).cloned();
                    (d, lister)
                })
                .collect())
        }

        async fn find_dogs_by_ids(&self, ids: &[Uuid]) -> Result<Vec<dog::Model>, ServiceError> {
            let t = self.tables.lock().await;
            Ok(newest_first(ids.iter().filter_map(|id| t.dogs.get(id).cloned()).collect()))
        }

        async fn find_dogs_by_lister(&self, lister_id: Uuid) -> Result<Vec<dog::Model>, ServiceError> {
            let t = self.tables.lock().await;
            Ok(newest_first(t.dogs.values().filter(|d| d.lister_id == lister_id).cloned().collect()))
        }

        async fn find_dogs_in_box(&self, bbox: &BoundingBox) -> Result<Vec<dog::Model>, ServiceError> {
            let t = self.tables.lock().await;
            Ok(t.dogs.values().filter(|d| bbox.contains(&d.location())).cloned().collect())
        }

        async fn mark_adopted(&self, dog_id: Uuid, adopter_id: Uuid) -> Result<Option<dog::Model>, ServiceError> {
            let mut t = self.tables.lock().await;
            Ok(match t.dogs.get_mut(&dog_id) {
                Some(d) if !d.adopted => {
                    d.adopted = true;
                    d.adopted_by = Some(adopter_id);
                    d.updated_at = Utc::now().into();
                    Some(d.clone())
                }
                _ => None,
            })
        }

        async fn delete_dog(&self, id: Uuid) -> Result<Option<dog::Model>, ServiceError> {
            Ok(self.tables.lock().await.dogs.remove(&id))
        }
    }
}
