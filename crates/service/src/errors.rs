use models::errors::ModelError;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("invalid id: {}", .0.join(", "))]
    InvalidId(Vec<String>),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} {} not found", entity, id))
    }

    /// Stable numeric code for logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 1001,
            ServiceError::InvalidId(_) => 1002,
            ServiceError::NotFound(_) => 1003,
            ServiceError::Conflict(_) => 1004,
            ServiceError::Db(_) => 1200,
            ServiceError::Storage(_) => 1300,
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(m) => ServiceError::Validation(m),
            ModelError::Conflict(m) => ServiceError::Conflict(m),
            ModelError::Db(m) => ServiceError::Db(m),
        }
    }
}

impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self {
        ModelError::from(e).into()
    }
}

/// Parse a single identifier, reporting it verbatim when malformed.
pub fn parse_id(raw: &str) -> Result<Uuid, ServiceError> {
    let trimmed = raw.trim();
    Uuid::parse_str(trimmed).map_err(|_| ServiceError::InvalidId(vec![trimmed.to_string()]))
}

/// Parse a comma-separated id list. Every malformed entry is reported.
pub fn parse_id_list(raw: &str) -> Result<Vec<Uuid>, ServiceError> {
    let mut ids = Vec::new();
    let mut invalid = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match Uuid::parse_str(part) {
            Ok(id) => {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            Err(_) => invalid.push(part.to_string()),
        }
    }
    if !invalid.is_empty() {
        return Err(ServiceError::InvalidId(invalid));
    }
    Ok(ids)
}
