use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use service::domain::{AdoptRequest, Dog, DogWithLister, ImageCleanup, NearbyDog, NewListing, User};

use crate::errors::JsonApiError;
use crate::observability::{IMAGE_CLEANUP_FAILURES_TOTAL, LISTINGS_CREATED_TOTAL, LISTINGS_DELETED_TOTAL};
use crate::state::ServerState;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateListingResponse {
    pub message: String,
    pub dog: Dog,
    pub user: User,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IdsQuery {
    /// Comma-separated dog ids
    pub ids: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NearQuery {
    pub lng: f64,
    pub lat: f64,
    pub radius_km: Option<f64>,
}

#[utoipa::path(
    post, path = "/api/dogs", tag = "dogs",
    request_body = crate::openapi::NewListingDoc,
    responses(
        (status = 201, description = "Listing created"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Lister Not Found"),
        (status = 409, description = "Conflict"),
        (status = 500, description = "Create Failed")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<NewListing>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateListingResponse>), JsonApiError> {
    let Json(input) = payload?;
    let created = state.listings.create(input).await.map_err(|e| state.fail(e))?;
    LISTINGS_CREATED_TOTAL.inc();
    info!(dog_id = %created.dog.id, lister_id = %created.user.id, "dog listed");
    Ok((
        StatusCode::CREATED,
        Json(CreateListingResponse { message: "Dog listed successfully".into(), dog: created.dog, user: created.user }),
    ))
}

#[utoipa::path(get, path = "/api/dogs", tag = "dogs", responses((status = 200, description = "All listings with lister")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<DogWithLister>>, JsonApiError> {
    let dogs = state.listings.list_all().await.map_err(|e| state.fail(e))?;
    Ok(Json(dogs))
}

#[utoipa::path(
    get, path = "/api/dogs/by-ids", tag = "dogs",
    params(IdsQuery),
    responses((status = 200, description = "OK"), (status = 400, description = "Invalid ids"))
)]
pub async fn by_ids(
    State(state): State<ServerState>,
    query: Result<Query<IdsQuery>, QueryRejection>,
) -> Result<Json<Vec<Dog>>, JsonApiError> {
    let Query(q) = query?;
    let raw = q.ids.ok_or_else(|| JsonApiError::bad_request("ids query parameter is required"))?;
    let dogs = state.listings.by_ids(&raw).await.map_err(|e| state.fail(e))?;
    Ok(Json(dogs))
}

#[utoipa::path(
    get, path = "/api/dogs/near", tag = "dogs",
    params(NearQuery),
    responses((status = 200, description = "Nearest first"), (status = 400, description = "Invalid coordinates or radius"))
)]
pub async fn near(
    State(state): State<ServerState>,
    query: Result<Query<NearQuery>, QueryRejection>,
) -> Result<Json<Vec<NearbyDog>>, JsonApiError> {
    let Query(q) = query?;
    let dogs = state.listings.near(q.lng, q.lat, q.radius_km).await.map_err(|e| state.fail(e))?;
    Ok(Json(dogs))
}

#[utoipa::path(
    get, path = "/api/dogs/lister/{userId}", tag = "dogs",
    params(("userId" = String, Path, description = "Internal user id")),
    responses((status = 200, description = "OK"), (status = 400, description = "Invalid id"), (status = 404, description = "User Not Found"))
)]
pub async fn by_lister(State(state): State<ServerState>, Path(user_id): Path<String>) -> Result<Json<Vec<Dog>>, JsonApiError> {
    let dogs = state.listings.by_lister(&user_id).await.map_err(|e| state.fail(e))?;
    Ok(Json(dogs))
}

#[utoipa::path(
    patch, path = "/api/dogs/{dogId}/adopt", tag = "dogs",
    params(("dogId" = String, Path, description = "Dog id")),
    request_body = crate::openapi::AdoptRequestDoc,
    responses(
        (status = 200, description = "Adopted"),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Already adopted")
    )
)]
pub async fn adopt(
    State(state): State<ServerState>,
    Path(dog_id): Path<String>,
    payload: Result<Json<AdoptRequest>, JsonRejection>,
) -> Result<Json<Dog>, JsonApiError> {
    let Json(req) = payload?;
    let dog = state.listings.adopt(&dog_id, req).await.map_err(|e| state.fail(e))?;
    Ok(Json(dog))
}

#[utoipa::path(
    delete, path = "/api/dogs/{dogId}", tag = "dogs",
    params(("dogId" = String, Path, description = "Dog id")),
    responses(
        (status = 200, description = "Deleted listing"),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(dog_id): Path<String>) -> Result<Json<Dog>, JsonApiError> {
    let deleted = state.listings.delete(&dog_id).await.map_err(|e| state.fail(e))?;
    LISTINGS_DELETED_TOTAL.inc();
    if deleted.image == ImageCleanup::Failed {
        IMAGE_CLEANUP_FAILURES_TOTAL.inc();
    }
    Ok(Json(deleted.dog))
}
