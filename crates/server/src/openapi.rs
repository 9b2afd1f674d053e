use utoipa::OpenApi;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(Serialize, ToSchema)]
pub struct LocationDoc {
    /// Always "Point"
    #[serde(rename = "type")]
    #[schema(example = "Point")]
    pub kind: String,
    /// `[longitude, latitude]`
    #[schema(example = json!([77.5, 12.9]))]
    pub coordinates: Vec<f64>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewListingDoc {
    pub lister_id: String,
    pub location: LocationDoc,
    pub image_url: String,
    #[serde(rename = "type")]
    #[schema(example = "Brown")]
    pub dog_type: String,
    #[schema(example = "0-6 months")]
    pub age: String,
    #[schema(example = "Male")]
    pub gender: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProfileDoc {
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub profile_complete: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvatarUpdateDoc { pub avatar_url: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdoptRequestDoc { pub adopted_by: String }

#[derive(Serialize, ToSchema)]
pub struct UploadFormDoc {
    #[schema(format = Binary)]
    pub file: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponseDoc { pub download_url: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::dogs::create,
        crate::routes::dogs::list,
        crate::routes::dogs::by_ids,
        crate::routes::dogs::near,
        crate::routes::dogs::by_lister,
        crate::routes::dogs::adopt,
        crate::routes::dogs::delete,
        crate::routes::users::create,
        crate::routes::users::list,
        crate::routes::users::get_by_external_id,
        crate::routes::users::get_by_internal_id,
        crate::routes::users::update_avatar,
        crate::routes::upload::upload_dog_image,
        crate::routes::upload::upload_avatar,
    ),
    components(
        schemas(
            HealthResponse,
            LocationDoc,
            NewListingDoc,
            NewProfileDoc,
            AvatarUpdateDoc,
            AdoptRequestDoc,
            UploadFormDoc,
            UploadResponseDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "dogs"),
        (name = "users"),
        (name = "media")
    )
)]
pub struct ApiDoc;
