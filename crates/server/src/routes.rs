use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::media::MAX_UPLOAD_BYTES;

use crate::observability;
use crate::openapi::ApiDoc;
use crate::state::ServerState;

pub mod auth;
pub mod dogs;
pub mod upload;
pub mod users;

// multipart framing on top of the file itself
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 64 * 1024;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (axum::http::StatusCode, String) {
    observability::encode_metrics()
}

/// Build the full application router
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    observability::register_all();

    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics));

    let dog_routes = Router::new()
        .route("/api/dogs", get(dogs::list).post(dogs::create))
        .route("/api/dogs/by-ids", get(dogs::by_ids))
        .route("/api/dogs/near", get(dogs::near))
        .route("/api/dogs/lister/:userId", get(dogs::by_lister))
        .route("/api/dogs/:dogId", axum::routing::delete(dogs::delete))
        .route("/api/dogs/:dogId/adopt", axum::routing::patch(dogs::adopt));

    let user_routes = Router::new()
        .route("/api/users", get(users::list).post(users::create))
        .route("/api/users/mongo/:internalId", get(users::get_by_internal_id))
        .route("/api/users/:id", get(users::get_by_external_id).patch(users::update_avatar));

    let upload_routes = Router::new()
        .route("/upload", post(upload::upload_dog_image))
        .route("/upload-avatar", post(upload::upload_avatar))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT));

    let mut api = dog_routes.merge(user_routes).merge(upload_routes);
    if let Some(auth_cfg) = state.auth.clone() {
        api = api.route_layer(middleware::from_fn_with_state(auth_cfg, auth::require_bearer_token));
    }

    public
        .merge(api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
