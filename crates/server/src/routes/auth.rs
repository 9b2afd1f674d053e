use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::warn;

use crate::errors::JsonApiError;
use crate::state::ServerAuthConfig;

/// Verified identity-provider subject, available to handlers via extensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentitySubject(pub String);

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Require `Authorization: Bearer <jwt>` on mutating requests. Reads and CORS
/// preflights pass through; missing or invalid tokens get 401.
pub async fn require_bearer_token(
    State(auth): State<ServerAuthConfig>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    if matches!(*req.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
        return Ok(next.run(req).await);
    }
    let path = req.uri().path().to_string();

    let Some(token) = bearer_token(&req) else {
        warn!(path = %path, "missing bearer token");
        return Err(JsonApiError::unauthorized("missing bearer token"));
    };

    let key = DecodingKey::from_secret(auth.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    match decode::<Claims>(token, &key, &validation) {
        Ok(data) => {
            req.extensions_mut().insert(IdentitySubject(data.claims.sub));
            Ok(next.run(req).await)
        }
        Err(e) => {
            warn!(path = %path, err = %e, "token validation failed");
            Err(JsonApiError::unauthorized("invalid or expired token"))
        }
    }
}
