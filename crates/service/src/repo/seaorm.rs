use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, TransactionTrait};
use uuid::Uuid;

use models::dog::{self, DogFields};
use models::geo::{BoundingBox, GeoPoint};
use models::user::{self, NewUser};

use crate::errors::ServiceError;
use crate::repository::{DogRepository, UserRepository};

/// PostgreSQL-backed repository over the `models` entities.
#[derive(Clone)]
pub struct SeaOrmRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait::async_trait]
impl UserRepository for SeaOrmRepository {
    async fn create_user(&self, input: &NewUser) -> Result<user::Model, ServiceError> {
        Ok(user::create(&self.db, input).await?)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<user::Model>, ServiceError> {
        Ok(user::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_user_by_external_id(&self, external_id: &str) -> Result<Option<user::Model>, ServiceError> {
        Ok(user::find_by_external_id(&self.db, external_id).await?)
    }

    async fn list_users(&self) -> Result<Vec<user::Model>, ServiceError> {
        Ok(user::Entity::find().order_by_asc(user::Column::CreatedAt).all(&self.db).await?)
    }

    async fn set_avatar(&self, id: Uuid, avatar_url: &str) -> Result<Option<user::Model>, ServiceError> {
        Ok(user::set_avatar(&self.db, id, avatar_url).await?)
    }

    async fn remove_listed_dog(&self, user_id: Uuid, dog_id: Uuid) -> Result<Option<user::Model>, ServiceError> {
        let txn = self.db.begin().await?;
        let updated = user::remove_dog(&txn, user_id, dog_id).await?;
        txn.commit().await?;
        Ok(updated)
    }
}

#[async_trait::async_trait]
impl DogRepository for SeaOrmRepository {
    async fn create_for_owner(
        &self,
        fields: &DogFields,
        location: GeoPoint,
        owner_id: Uuid,
    ) -> Result<(dog::Model, user::Model), ServiceError> {
        // dropping `txn` on any early return rolls the unit back
        let txn = self.db.begin().await?;
        let owner = user::find_for_update(&txn, owner_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", owner_id))?;
        let created = dog::create(&txn, fields, location, owner_id).await?;
        let owner = user::append_dog(&txn, owner, created.id).await?;
        txn.commit().await?;
        Ok((created, owner))
    }

    async fn find_dog(&self, id: Uuid) -> Result<Option<dog::Model>, ServiceError> {
        Ok(dog::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn list_with_lister(&self) -> Result<Vec<(dog::Model, Option<user::Model>)>, ServiceError> {
        Ok(dog::list_with_lister(&self.db).await?)
    }

    async fn find_dogs_by_ids(&self, ids: &[Uuid]) -> Result<Vec<dog::Model>, ServiceError> {
        Ok(dog::find_by_ids(&self.db, ids).await?)
    }

    async fn find_dogs_by_lister(&self, lister_id: Uuid) -> Result<Vec<dog::Model>, ServiceError> {
        Ok(dog::find_by_lister(&self.db, lister_id).await?)
    }

    async fn find_dogs_in_box(&self, bbox: &BoundingBox) -> Result<Vec<dog::Model>, ServiceError> {
        Ok(dog::find_in_box(&self.db, bbox).await?)
    }

    async fn mark_adopted(&self, dog_id: Uuid, adopter_id: Uuid) -> Result<Option<dog::Model>, ServiceError> {
        Ok(dog::mark_adopted(&self.db, dog_id, adopter_id).await?)
    }

    async fn delete_dog(&self, id: Uuid) -> Result<Option<dog::Model>, ServiceError> {
        Ok(dog::delete(&self.db, id).await?)
    }
}
