use std::sync::Arc;

use service::errors::ServiceError;
use service::repository::{DogRepository, UserRepository};
use service::storage::ObjectStore;
use service::{ListingService, MediaRelay, UserService};

use crate::errors::JsonApiError;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

/// Shared router state; every client is built once at startup.
#[derive(Clone)]
pub struct ServerState {
    pub listings: Arc<ListingService>,
    pub users: Arc<UserService<dyn UserRepository>>,
    pub media: Arc<MediaRelay>,
    pub auth: Option<ServerAuthConfig>,
    pub expose_error_details: bool,
}

impl ServerState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        dogs: Arc<dyn DogRepository>,
        store: Arc<dyn ObjectStore>,
        jwt_secret: Option<String>,
        expose_error_details: bool,
    ) -> Self {
        Self {
            listings: Arc::new(ListingService::new(dogs, users.clone(), store.clone())),
            users: Arc::new(UserService::new(users)),
            media: Arc::new(MediaRelay::new(store)),
            auth: jwt_secret.map(|jwt_secret| ServerAuthConfig { jwt_secret }),
            expose_error_details,
        }
    }

    pub fn fail(&self, e: ServiceError) -> JsonApiError {
        JsonApiError::from_service(e, self.expose_error_details)
    }
}
