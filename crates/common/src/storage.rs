//! Object storage abstraction for evidence files.
//!
//! Supports the BaaS storage REST API and the local filesystem.

use std::{path::PathBuf, sync::Arc};

use reqwest::{StatusCode, header};
use url::Url;
use uuid::Uuid;

use crate::{
    AppError, AppResult,
    config::{IdentityConfig, StorageKind, StorageSettings},
};

/// Storage configuration.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Local filesystem storage.
    Local {
        /// Base path for stored files.
        base_path: PathBuf,
        /// Base URL for serving files.
        base_url: String,
        /// Bucket directory under the base path.
        bucket: String,
    },
    /// BaaS object storage.
    Baas {
        /// Project base URL (the storage API lives under `/storage/v1`).
        url: String,
        /// Bucket name.
        bucket: String,
        /// Key sent as both bearer token and `apikey`.
        api_key: String,
        /// `Cache-Control` max-age for uploaded objects.
        cache_control: String,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Local {
            base_path: PathBuf::from("./files"),
            base_url: "/files".to_string(),
            bucket: "evidence-files".to_string(),
        }
    }
}

impl StorageConfig {
    /// Resolve the storage configuration from the application settings.
    ///
    /// The BaaS backend prefers the service role key and falls back to the
    /// anon key.
    #[must_use]
    pub fn from_settings(settings: &StorageSettings, identity: &IdentityConfig) -> Self {
        match settings.backend {
            StorageKind::Local => Self::Local {
                base_path: settings.base_path.clone(),
                base_url: settings.base_url.clone(),
                bucket: settings.bucket.clone(),
            },
            StorageKind::Baas => Self::Baas {
                url: identity.url.clone(),
                bucket: settings.bucket.clone(),
                api_key: identity
                    .service_role_key
                    .clone()
                    .unwrap_or_else(|| identity.anon_key.clone()),
                cache_control: settings.cache_control.clone(),
            },
        }
    }

    /// Build the configured backend.
    pub fn build(self, http: reqwest::Client) -> AppResult<Arc<dyn StorageBackend>> {
        Ok(match self {
            Self::Local {
                base_path,
                base_url,
                bucket,
            } => Arc::new(LocalStorage::new(base_path, base_url, bucket)),
            Self::Baas {
                url,
                bucket,
                api_key,
                cache_control,
            } => Arc::new(BaasStorage::new(http, &url, bucket, api_key, cache_control)?),
        })
    }
}

/// Uploaded file metadata.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Object key inside the bucket.
    pub key: String,
    /// Bucket-qualified path (`{bucket}/{key}`).
    pub full_path: String,
    /// Public URL to access the file.
    pub url: String,
    /// File size in bytes.
    pub size: u64,
    /// MIME content type.
    pub content_type: String,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Upload a file.
    async fn upload(&self, key: &str, data: &[u8], content_type: &str)
    -> AppResult<UploadedFile>;

    /// Delete a set of files. Missing keys are ignored.
    async fn delete(&self, keys: &[String]) -> AppResult<()>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;

    /// Check if a file exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    bucket: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String, bucket: String) -> Self {
        Self {
            base_path,
            base_url,
            bucket,
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_path.join(&self.bucket).join(key)
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        let path = self.path_for(key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write file: {e}")))?;

        Ok(UploadedFile {
            key: key.to_string(),
            full_path: format!("{}/{key}", self.bucket),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
        })
    }

    async fn delete(&self, keys: &[String]) -> AppResult<()> {
        for key in keys {
            let path = self.path_for(key);
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                tokio::fs::remove_file(&path)
                    .await
                    .map_err(|e| AppError::Storage(format!("Failed to delete file: {e}")))?;
            }
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{key}",
            self.base_url.trim_end_matches('/'),
            self.bucket
        )
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        tokio::fs::try_exists(self.path_for(key))
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }
}

/// BaaS object storage backend, spoken over its REST API.
pub struct BaasStorage {
    client: reqwest::Client,
    url: Url,
    bucket: String,
    api_key: String,
    cache_control: String,
}

impl BaasStorage {
    /// Create a new BaaS storage backend.
    pub fn new(
        client: reqwest::Client,
        url: &str,
        bucket: String,
        api_key: String,
        cache_control: String,
    ) -> AppResult<Self> {
        let url = Url::parse(url)
            .map_err(|e| AppError::Config(format!("Invalid storage URL {url}: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(AppError::Config(format!("Invalid storage URL {url}")));
        }

        Ok(Self {
            client,
            url,
            bucket,
            api_key,
            cache_control,
        })
    }

    /// `{base}/storage/v1/object/{prefix..}/{bucket}/{key}`, one encoded
    /// path segment per key component.
    fn endpoint(&self, prefix: &[&str], key: Option<&str>) -> Url {
        let mut url = self.url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["storage", "v1", "object"])
                .extend(prefix)
                .push(&self.bucket);
            if let Some(key) = key {
                segments.extend(key.split('/'));
            }
        }
        url
    }

    fn object_url(&self, key: &str) -> Url {
        self.endpoint(&[], Some(key))
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.bearer_auth(&self.api_key).header("apikey", &self.api_key)
    }
}

#[async_trait::async_trait]
impl StorageBackend for BaasStorage {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        let response = self
            .authorized(self.client.post(self.object_url(key)))
            .header(header::CONTENT_TYPE, content_type)
            .header(
                header::CACHE_CONTROL,
                format!("max-age={}", self.cache_control),
            )
            .header("x-upsert", "false")
            .body(data.to_vec())
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Upload request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "Upload rejected with {status}: {body}"
            )));
        }

        Ok(UploadedFile {
            key: key.to_string(),
            full_path: format!("{}/{key}", self.bucket),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
        })
    }

    async fn delete(&self, keys: &[String]) -> AppResult<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let response = self
            .authorized(
                self.client.delete(self.endpoint(&[], None)),
            )
            .json(&serde_json::json!({ "prefixes": keys }))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Delete request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Storage(format!(
                "Delete rejected with {}",
                response.status()
            )));
        }

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        self.endpoint(&["public"], Some(key)).into()
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let response = self
            .authorized(self.client.head(self.object_url(key)))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Head request failed: {e}")))?;

        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => Ok(false),
            s => Err(AppError::Storage(format!("Head rejected with {s}"))),
        }
    }
}

/// Object key for a file sent to the generic upload endpoint:
/// `{user_id}/{file_id}-{original_name}`.
#[must_use]
pub fn evidence_key(user_id: Uuid, file_id: Uuid, original_name: &str) -> String {
    format!("{user_id}/{file_id}-{}", sanitize_name(original_name))
}

/// Object key for a file attached to a report:
/// `{user_id}/{kind}/{report_id}/{timestamp_ms}-{index}.{ext}`.
#[must_use]
pub fn report_evidence_key(
    user_id: Uuid,
    kind: &str,
    report_id: Uuid,
    timestamp_ms: i64,
    index: usize,
    original_name: &str,
) -> String {
    format!(
        "{user_id}/{kind}/{report_id}/{timestamp_ms}-{index}.{}",
        extension(original_name)
    )
}

fn sanitize_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    if base.is_empty() {
        "file".to_string()
    } else {
        base.to_string()
    }
}

fn extension(name: &str) -> &str {
    name.rfind('.')
        .filter(|&pos| pos > 0 && pos < name.len() - 1)
        .map(|pos| &name[pos + 1..])
        .filter(|ext| ext.len() <= 10 && ext.chars().all(char::is_alphanumeric))
        .unwrap_or("bin")
}
