use std::sync::Arc;

use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::storage::{object_key, ObjectStore, UploadKind};

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Forwards uploaded files to the object store and hands back a public URL.
pub struct MediaRelay {
    store: Arc<dyn ObjectStore>,
}

impl MediaRelay {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self { Self { store } }

    /// Store one file and return its retrieval URL.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::{MediaRelay, storage::{MemoryObjectStore, UploadKind}};
    /// let relay = MediaRelay::new(Arc::new(MemoryObjectStore::new()));
    /// let url = tokio_test::block_on(relay.upload(UploadKind::DogImage, Some("rex.jpg"), Some("image/jpeg"), vec![1, 2, 3])).unwrap();
    /// assert!(url.starts_with("memory://bucket/dogs/"));
    /// ```
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(
        &self,
        kind: UploadKind,
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<String, ServiceError> {
        if bytes.is_empty() {
            return Err(ServiceError::Validation("uploaded file is empty".into()));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ServiceError::Validation(format!("file exceeds {} bytes", MAX_UPLOAD_BYTES)));
        }
        let key = object_key(kind, file_name.unwrap_or("file"));
        let content_type = content_type.filter(|c| !c.trim().is_empty()).unwrap_or("application/octet-stream");
        self.store.put(&key, bytes, content_type).await?;
        let url = self.store.public_url(&key);
        info!(key = %key, "upload stored");
        Ok(url)
    }
}
