use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use models::dog::DogFields;
use models::geo::GeoPoint;

use crate::domain::{
    AdoptRequest, Dog, DogWithLister, ImageCleanup, ListingCreated, ListingDeleted, NearbyDog, NewListing,
};
use crate::errors::{parse_id, parse_id_list, ServiceError};
use crate::repository::{DogRepository, UserRepository};
use crate::storage::{ObjectStore, UploadKind};

pub const DEFAULT_RADIUS_KM: f64 = 10.0;
pub const MAX_RADIUS_KM: f64 = 20_000.0;

/// Listing lifecycle and dog directory reads.
pub struct ListingService {
    dogs: Arc<dyn DogRepository>,
    users: Arc<dyn UserRepository>,
    store: Arc<dyn ObjectStore>,
}

impl ListingService {
    pub fn new(dogs: Arc<dyn DogRepository>, users: Arc<dyn UserRepository>, store: Arc<dyn ObjectStore>) -> Self {
        Self { dogs, users, store }
    }

    /// Create a listing and append it to the owner's collection in one unit.
    ///
    /// Coordinates and the owner id are checked before any write happens.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::{ListingService, UserService};
    /// use service::domain::{Location, NewListing, NewProfile};
    /// use service::repository::memory::MemoryRepository;
    /// use service::storage::MemoryObjectStore;
    ///
    /// let repo = Arc::new(MemoryRepository::new());
    /// let users = UserService::new(repo.clone());
    /// let listings = ListingService::new(repo.clone(), repo.clone(), Arc::new(MemoryObjectStore::new()));
    /// let owner = tokio_test::block_on(users.create(NewProfile {
    ///     external_id: Some("user_1".into()),
    ///     email: Some("owner@example.com".into()),
    ///     name: Some("Owner".into()),
    ///     ..Default::default()
    /// })).unwrap();
    /// let created = tokio_test::block_on(listings.create(NewListing {
    ///     lister_id: Some(owner.id.to_string()),
    ///     location: Some(Location { kind: "Point".into(), coordinates: vec![77.5, 12.9] }),
    ///     image_url: Some("x.jpg".into()),
    ///     dog_type: Some("Brown".into()),
    ///     age: Some("0-6 months".into()),
    ///     gender: Some("Male".into()),
    /// })).unwrap();
    /// assert_eq!(created.dog.lister_id, owner.id);
    /// assert_eq!(created.user.dogs_listed, vec![created.dog.id]);
    /// ```
    #[instrument(skip(self, input), fields(lister_id = ?input.lister_id))]
    pub async fn create(&self, input: NewListing) -> Result<ListingCreated, ServiceError> {
        let location = match &input.location {
            Some(loc) if !loc.kind.eq_ignore_ascii_case("Point") => {
                return Err(ServiceError::Validation(format!("location type must be Point, got {}", loc.kind)));
            }
            Some(loc) => GeoPoint::from_coordinates(&loc.coordinates)?,
            None => return Err(ServiceError::Validation("location is required".into())),
        };
        let owner_id = match input.lister_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => parse_id(raw)?,
            None => return Err(ServiceError::Validation("listerId is required".into())),
        };

        let fields = DogFields {
            image_url: input.image_url,
            dog_type: input.dog_type,
            age: input.age,
            gender: input.gender,
        };
        let (dog, owner) = self.dogs.create_for_owner(&fields, location, owner_id).await?;
        info!(dog_id = %dog.id, lister_id = %owner.id, listed = owner.dogs_listed.len(), "listing_created");
        Ok(ListingCreated { dog: dog.into(), user: owner.into() })
    }

    /// Prune a listing from the owner's collection, delete it, then try to
    /// remove the stored image. The two database writes are sequential and
    /// pruning goes first, so a failure leaves the dog in place and a retry
    /// repeats both steps. An image removal failure is reported in the result
    /// but never an error.
    #[instrument(skip(self))]
    pub async fn delete(&self, raw_id: &str) -> Result<ListingDeleted, ServiceError> {
        let id = parse_id(raw_id)?;
        let dog = self.dogs.find_dog(id).await?.ok_or_else(|| ServiceError::not_found("dog", id))?;

        match self.users.remove_listed_dog(dog.lister_id, id).await? {
            Some(_) => debug!(dog_id = %id, lister_id = %dog.lister_id, "pruned from owner"),
            None => warn!(dog_id = %id, lister_id = %dog.lister_id, "owner missing while pruning listing"),
        }
        let dog = self.dogs.delete_dog(id).await?.ok_or_else(|| ServiceError::not_found("dog", id))?;

        let image = self.remove_image(&dog.image_url).await;
        info!(dog_id = %id, image = ?image, "listing_deleted");
        Ok(ListingDeleted { dog: dog.into(), image })
    }

    /// Only objects under the dog image folder are removed; anything else the
    /// listing points at is left alone.
    async fn remove_image(&self, image_url: &str) -> ImageCleanup {
        let key = match self.store.key_for_url(image_url) {
            Some(key) if UploadKind::DogImage.owns_key(&key) => key,
            _ => {
                debug!(image_url, "image outside dog folder, not removed");
                return ImageCleanup::Skipped;
            }
        };
        match self.store.remove(&key).await {
            Ok(()) => ImageCleanup::Removed,
            Err(e) => {
                warn!(key = %key, error = %e, "image removal failed");
                ImageCleanup::Failed
            }
        }
    }

    pub async fn list_all(&self) -> Result<Vec<DogWithLister>, ServiceError> {
        let rows = self.dogs.list_with_lister().await?;
        Ok(rows
            .into_iter()
            .map(|(dog, lister)| DogWithLister { dog: dog.into(), lister: lister.map(Into::into) })
            .collect())
    }

    /// Fetch dogs by a comma-separated id list; unknown ids are skipped.
    #[instrument(skip(self))]
    pub async fn by_ids(&self, raw_ids: &str) -> Result<Vec<Dog>, ServiceError> {
        let ids = parse_id_list(raw_ids)?;
        if ids.is_empty() {
            return Err(ServiceError::Validation("ids is required".into()));
        }
        Ok(self.dogs.find_dogs_by_ids(&ids).await?.into_iter().map(Dog::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn by_lister(&self, raw_user_id: &str) -> Result<Vec<Dog>, ServiceError> {
        let user_id = parse_id(raw_user_id)?;
        if self.users.find_user(user_id).await?.is_none() {
            return Err(ServiceError::not_found("user", user_id));
        }
        Ok(self.dogs.find_dogs_by_lister(user_id).await?.into_iter().map(Dog::from).collect())
    }

    /// Dogs within `radius_km` of a point, nearest first.
    #[instrument(skip(self))]
    pub async fn near(&self, longitude: f64, latitude: f64, radius_km: Option<f64>) -> Result<Vec<NearbyDog>, ServiceError> {
        let center = GeoPoint::new(longitude, latitude)?;
        let radius = radius_km.unwrap_or(DEFAULT_RADIUS_KM);
        if !radius.is_finite() || radius <= 0.0 || radius > MAX_RADIUS_KM {
            return Err(ServiceError::Validation(format!("radiusKm must be within (0, {MAX_RADIUS_KM}]")));
        }
        let candidates = self.dogs.find_dogs_in_box(&center.bounding_box(radius)).await?;
        let mut hits: Vec<NearbyDog> = candidates
            .into_iter()
            .filter_map(|d| {
                let distance_km = center.haversine_km(&d.location());
                (distance_km <= radius).then(|| NearbyDog { dog: d.into(), distance_km })
            })
            .collect();
        hits.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        Ok(hits)
    }

    /// Mark a dog adopted by another user.
    #[instrument(skip(self, req))]
    pub async fn adopt(&self, raw_dog_id: &str, req: AdoptRequest) -> Result<Dog, ServiceError> {
        let dog_id = parse_id(raw_dog_id)?;
        let adopter_id = match req.adopted_by.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => parse_id(raw)?,
            None => return Err(ServiceError::Validation("adoptedBy is required".into())),
        };
        let dog = self.dogs.find_dog(dog_id).await?.ok_or_else(|| ServiceError::not_found("dog", dog_id))?;
        if self.users.find_user(adopter_id).await?.is_none() {
            return Err(ServiceError::not_found("user", adopter_id));
        }
        if dog.lister_id == adopter_id {
            return Err(ServiceError::Conflict("a lister cannot adopt their own dog".into()));
        }
        if dog.adopted {
            return Err(already_adopted(dog_id));
        }
        let adopted = self.dogs.mark_adopted(dog_id, adopter_id).await?.ok_or_else(|| already_adopted(dog_id))?;
        info!(dog_id = %dog_id, adopter_id = %adopter_id, "dog_adopted");
        Ok(adopted.into())
    }
}

fn already_adopted(id: Uuid) -> ServiceError {
    ServiceError::Conflict(format!("dog {id} is already adopted"))
}
