use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{looks_like_key, ObjectStore};
use crate::errors::ServiceError;

const BASE_URL: &str = "memory://bucket/";

/// In-process object store for tests and local runs without a bucket.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    fail_removals: AtomicBool,
}

impl MemoryObjectStore {
    pub fn new() -> Self { Self::default() }

    /// Make every subsequent `remove` fail.
    pub fn fail_removals(&self, fail: bool) {
        self.fail_removals.store(fail, Ordering::SeqCst);
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.lock().await.contains_key(key)
    }

    pub async fn content_type(&self, key: &str) -> Option<String> {
        self.objects.lock().await.get(key).map(|(_, ct)| ct.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), ServiceError> {
        self.objects.lock().await.insert(key.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), ServiceError> {
        if self.fail_removals.load(Ordering::SeqCst) {
            return Err(ServiceError::Storage(format!("delete {key}: unavailable")));
        }
        match self.objects.lock().await.remove(key) {
            Some(_) => Ok(()),
            None => Err(ServiceError::Storage(format!("delete {key}: 404 Not Found"))),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{BASE_URL}{key}")
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        if let Some(key) = url.strip_prefix(BASE_URL) {
            return Some(key.to_string());
        }
        looks_like_key(url).then(|| url.to_string())
    }
}
