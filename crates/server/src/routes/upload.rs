use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use service::storage::UploadKind;

use crate::errors::JsonApiError;
use crate::observability::UPLOADS_TOTAL;
use crate::state::ServerState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub download_url: String,
}

async fn relay(
    state: &ServerState,
    kind: UploadKind,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, JsonApiError> {
    let mut multipart = multipart?;
    // first part carrying a file name wins; plain form fields are skipped
    while let Some(field) = multipart.next_field().await? {
        let Some(file_name) = field.file_name().map(str::to_string) else { continue };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        let download_url = state
            .media
            .upload(kind, Some(&file_name), content_type.as_deref(), bytes.to_vec())
            .await
            .map_err(|e| state.fail(e))?;
        UPLOADS_TOTAL.with_label_values(&[kind.prefix()]).inc();
        info!(kind = kind.prefix(), file_name = %file_name, "file relayed");
        return Ok(Json(UploadResponse { download_url }));
    }
    Err(JsonApiError::bad_request("no file uploaded"))
}

#[utoipa::path(
    post, path = "/upload", tag = "media",
    request_body(content = crate::openapi::UploadFormDoc, content_type = "multipart/form-data"),
    responses((status = 200, description = "Stored", body = crate::openapi::UploadResponseDoc), (status = 400, description = "No file"), (status = 413, description = "Too large"))
)]
pub async fn upload_dog_image(
    State(state): State<ServerState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, JsonApiError> {
    relay(&state, UploadKind::DogImage, multipart).await
}

#[utoipa::path(
    post, path = "/upload-avatar", tag = "media",
    request_body(content = crate::openapi::UploadFormDoc, content_type = "multipart/form-data"),
    responses((status = 200, description = "Stored", body = crate::openapi::UploadResponseDoc), (status = 400, description = "No file"), (status = 413, description = "Too large"))
)]
pub async fn upload_avatar(
    State(state): State<ServerState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, JsonApiError> {
    relay(&state, UploadKind::Avatar, multipart).await
}
