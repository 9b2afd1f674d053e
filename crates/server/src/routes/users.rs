use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};

use service::domain::{AvatarUpdate, NewProfile, User};

use crate::errors::JsonApiError;
use crate::routes::auth::IdentitySubject;
use crate::state::ServerState;

#[utoipa::path(
    post, path = "/api/users", tag = "users",
    request_body = crate::openapi::NewProfileDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Missing fields"),
        (status = 403, description = "externalId differs from the token subject"),
        (status = 409, description = "Duplicate user")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    subject: Option<Extension<IdentitySubject>>,
    payload: Result<Json<NewProfile>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), JsonApiError> {
    let Json(mut input) = payload?;
    // a verified subject fills in or must match the submitted externalId
    if let Some(Extension(IdentitySubject(sub))) = subject {
        let submitted = input.external_id.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        match submitted {
            Some(ext) if ext != sub => {
                return Err(JsonApiError::forbidden("externalId does not match the authenticated subject"));
            }
            Some(_) => {}
            None => input.external_id = Some(sub),
        }
    }
    let user = state.users.create(input).await.map_err(|e| state.fail(e))?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(get, path = "/api/users", tag = "users", responses((status = 200, description = "All users")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<User>>, JsonApiError> {
    let users = state.users.list().await.map_err(|e| state.fail(e))?;
    Ok(Json(users))
}

#[utoipa::path(
    get, path = "/api/users/{id}", tag = "users",
    params(("id" = String, Path, description = "External identity reference")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get_by_external_id(State(state): State<ServerState>, Path(external_id): Path<String>) -> Result<Json<User>, JsonApiError> {
    let user = state.users.get_by_external_id(&external_id).await.map_err(|e| state.fail(e))?;
    Ok(Json(user))
}

#[utoipa::path(
    get, path = "/api/users/mongo/{internalId}", tag = "users",
    params(("internalId" = String, Path, description = "Internal user id")),
    responses((status = 200, description = "OK"), (status = 400, description = "Invalid id"), (status = 404, description = "Not Found"))
)]
pub async fn get_by_internal_id(State(state): State<ServerState>, Path(internal_id): Path<String>) -> Result<Json<User>, JsonApiError> {
    let user = state.users.get_by_id(&internal_id).await.map_err(|e| state.fail(e))?;
    Ok(Json(user))
}

#[utoipa::path(
    patch, path = "/api/users/{id}", tag = "users",
    params(("id" = String, Path, description = "Internal user id")),
    request_body = crate::openapi::AvatarUpdateDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Invalid input"), (status = 404, description = "Not Found"))
)]
pub async fn update_avatar(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<AvatarUpdate>, JsonRejection>,
) -> Result<Json<User>, JsonApiError> {
    let Json(update) = payload?;
    let user = state.users.set_avatar(&id, update).await.map_err(|e| state.fail(e))?;
    Ok(Json(user))
}
