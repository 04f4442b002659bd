//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Identity provider configuration.
    pub identity: IdentityConfig,
    /// Evidence storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Upload limits.
    #[serde(default)]
    pub upload: UploadConfig,
    /// AI assistant configuration.
    #[serde(default)]
    pub assistant: AssistantConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The single origin allowed by CORS.
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
    /// Service name reported by the health endpoint.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            service_name: default_service_name(),
        }
    }
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Hosted identity provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Base URL of the BaaS project (e.g. `https://xyz.supabase.co`).
    pub url: String,
    /// Public (anon) API key.
    pub anon_key: String,
    /// Service role key, used for storage writes when present.
    #[serde(default)]
    pub service_role_key: Option<String>,
    /// Where confirmation and magic-link emails redirect to.
    #[serde(default)]
    pub redirect_url: Option<String>,
}

/// Which storage backend holds evidence files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// BaaS object storage bucket.
    #[default]
    Baas,
    /// Local filesystem (development).
    Local,
}

/// Evidence storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Backend selection.
    #[serde(default)]
    pub backend: StorageKind,
    /// Bucket name.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Base path for the local backend.
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,
    /// Base URL for files served by the local backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// `Cache-Control` max-age sent with uploads, in seconds.
    #[serde(default = "default_cache_control")]
    pub cache_control: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageKind::default(),
            bucket: default_bucket(),
            base_path: default_base_path(),
            base_url: default_base_url(),
            cache_control: default_cache_control(),
        }
    }
}

/// Upload limits.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UploadConfig {
    /// Maximum number of files per upload request.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Maximum size of a single file in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            max_file_size: default_max_file_size(),
        }
    }
}

impl UploadConfig {
    /// Upper bound for a whole multipart body.
    #[must_use]
    pub const fn body_limit(&self) -> usize {
        // 64 KiB of headroom for boundaries and part headers
        self.max_files
            .saturating_mul(self.max_file_size)
            .saturating_add(64 * 1024)
    }
}

/// AI assistant configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    /// Program to spawn. When unset the canned assistant answers instead.
    #[serde(default)]
    pub program: Option<String>,
    /// Arguments placed before the question.
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory of the spawned process.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Hard limit on how long one answer may take.
    #[serde(default = "default_assistant_timeout")]
    pub timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            program: None,
            args: Vec::new(),
            working_dir: None,
            timeout_secs: default_assistant_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    5001
}

fn default_cors_origin() -> String {
    "http://localhost:5173".to_string()
}

fn default_service_name() -> String {
    "cybersecurity-backend".to_string()
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_bucket() -> String {
    "evidence-files".to_string()
}

fn default_base_path() -> PathBuf {
    PathBuf::from("./files")
}

fn default_base_url() -> String {
    "/files".to_string()
}

fn default_cache_control() -> String {
    "3600".to_string()
}

const fn default_max_files() -> usize {
    5
}

const fn default_max_file_size() -> usize {
    10 * 1024 * 1024
}

const fn default_assistant_timeout() -> u64 {
    120
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, into the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `CYBERSECURE_ENV`)
    /// 4. Environment variables with `CYBERSECURE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("CYBERSECURE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CYBERSECURE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("assistant.args")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("CYBERSECURE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_defaults_match_portal_limits() {
        let upload = UploadConfig::default();
        assert_eq!(upload.max_files, 5);
        assert_eq!(upload.max_file_size, 10 * 1024 * 1024);
        assert!(upload.body_limit() > upload.max_files * upload.max_file_size);
    }

    #[test]
    fn test_body_limit_saturates() {
        let upload = UploadConfig {
            max_files: usize::MAX,
            max_file_size: 2,
        };
        assert_eq!(upload.body_limit(), usize::MAX);
    }

    #[test]
    fn test_storage_kind_deserializes_lowercase() {
        let kind: StorageKind = serde_json::from_str("\"local\"").unwrap();
        assert_eq!(kind, StorageKind::Local);
        let settings = StorageSettings::default();
        assert_eq!(settings.bucket, "evidence-files");
        assert_eq!(settings.backend, StorageKind::Baas);
    }

    #[test]
    fn test_server_defaults() {
        let server = ServerConfig::default();
        assert_eq!(server.port, 5001);
        assert_eq!(server.cors_origin, "http://localhost:5173");
    }
}
