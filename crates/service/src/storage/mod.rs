//! Object storage for uploaded images.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::ServiceError;

pub mod http;
pub mod memory;

pub use http::HttpObjectStore;
pub use memory::MemoryObjectStore;

/// Binary object store addressed by slash-separated keys.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), ServiceError>;
    async fn remove(&self, key: &str) -> Result<(), ServiceError>;
    /// Public retrieval URL for a stored key.
    fn public_url(&self, key: &str) -> String;
    /// Inverse of `public_url`. Bare keys map to themselves; URLs that point
    /// elsewhere yield `None`.
    fn key_for_url(&self, url: &str) -> Option<String>;
}

/// Folder an upload lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    DogImage,
    Avatar,
}

impl UploadKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            UploadKind::DogImage => "dogs",
            UploadKind::Avatar => "avatars",
        }
    }

    /// Whether `key` names an object inside this kind's folder.
    pub fn owns_key(&self, key: &str) -> bool {
        key.strip_prefix(self.prefix())
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some_and(|rest| !rest.is_empty() && rest.split('/').all(|seg| !seg.is_empty() && seg != "." && seg != ".."))
    }
}

const MAX_NAME_LEN: usize = 100;

/// Keep ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .take(MAX_NAME_LEN)
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() { "file".to_string() } else { cleaned }
}

/// `<prefix>/<uuid>-<sanitised name>`
pub fn object_key(kind: UploadKind, file_name: &str) -> String {
    format!("{}/{}-{}", kind.prefix(), Uuid::new_v4(), sanitize_file_name(file_name))
}

/// Bare keys have no scheme.
pub(crate) fn looks_like_key(s: &str) -> bool {
    !s.is_empty() && !s.contains("://")
}
