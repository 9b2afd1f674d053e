use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use tracing::{debug, warn};

use configs::StorageConfig;

use super::{looks_like_key, ObjectStore};
use crate::errors::ServiceError;

/// Client for a Firebase-Storage-compatible REST bucket.
#[derive(Clone)]
pub struct HttpObjectStore {
    client: Client,
    endpoint: String,
    bucket: String,
    token: Option<String>,
}

impl HttpObjectStore {
    pub fn new(cfg: &StorageConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| ServiceError::Storage(format!("build http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: cfg.endpoint.trim_end_matches('/').to_string(),
            bucket: cfg.bucket.clone(),
            token: cfg.token.clone(),
        })
    }

    fn objects_base(&self) -> String {
        format!("{}/v0/b/{}/o", self.endpoint, self.bucket)
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.objects_base(), urlencoding::encode(key))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn check(resp: Response, op: &str, key: &str) -> Result<Response, ServiceError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        warn!(%status, key, op, "object store request failed");
        Err(ServiceError::Storage(format!("{op} {key}: {status} {body}")))
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), ServiceError> {
        let size = bytes.len();
        let req = self
            .client
            .post(self.objects_base())
            .query(&[("uploadType", "media"), ("name", key)])
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes);
        let resp = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| ServiceError::Storage(format!("upload {key}: {e}")))?;
        Self::check(resp, "upload", key).await?;
        debug!(key, size, "object stored");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), ServiceError> {
        let req = self.client.delete(self.object_url(key));
        let resp = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| ServiceError::Storage(format!("delete {key}: {e}")))?;
        Self::check(resp, "delete", key).await?;
        debug!(key, "object removed");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}?alt=media", self.object_url(key))
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        if looks_like_key(url) {
            return Some(url.trim_start_matches('/').to_string());
        }
        let prefix = format!("{}/", self.objects_base());
        let encoded = url.strip_prefix(&prefix)?;
        let encoded = encoded.split(['?', '#']).next().unwrap_or(encoded);
        urlencoding::decode(encoded).ok().map(|k| k.into_owned()).filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> HttpObjectStore {
        let cfg = StorageConfig {
            endpoint: "https://storage.example.com/".into(),
            bucket: "pets".into(),
            token: None,
            timeout_secs: 5,
        };
        HttpObjectStore::new(&cfg).unwrap()
    }

    #[test]
    fn public_url_encodes_key() {
        let url = store().public_url("dogs/abc-rex.jpg");
        assert_eq!(url, "https://storage.example.com/v0/b/pets/o/dogs%2Fabc-rex.jpg?alt=media");
    }

    #[test]
    fn key_for_url_inverts_public_url() {
        let s = store();
        let key = "avatars/1234-me.png";
        assert_eq!(s.key_for_url(&s.public_url(key)).as_deref(), Some(key));
        assert_eq!(s.key_for_url("dogs/x.jpg").as_deref(), Some("dogs/x.jpg"));
        assert_eq!(s.key_for_url("https://cdn.elsewhere.com/x.jpg"), None);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_storage_error() {
        let cfg = StorageConfig {
            endpoint: "http://127.0.0.1:9".into(),
            bucket: "pets".into(),
            token: Some("t".into()),
            timeout_secs: 2,
        };
        let s = HttpObjectStore::new(&cfg).unwrap();
        let err = s.put("dogs/a.jpg", vec![1, 2, 3], "image/jpeg").await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
    }
}
