use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// "development" exposes internal error details in 500 responses.
    /// Defaults to "production".
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_json_logs")]
    pub json_logs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            worker_threads: Some(4),
            environment: default_environment(),
            json_logs: default_json_logs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

/// Object storage bucket the media relay forwards uploads to.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub bucket: String,
    /// Bearer token sent with upload and delete calls; optional for public buckets.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_storage_timeout")]
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: default_storage_endpoint(),
            bucket: String::new(),
            token: None,
            timeout_secs: default_storage_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    /// HS256 secret shared with the identity provider. When unset, bearer
    /// tokens are assumed to be checked upstream.
    #[serde(default)]
    pub jwt_secret: Option<String>,
}

fn default_environment() -> String { "production".into() }
fn default_json_logs() -> bool { false }
fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_storage_endpoint() -> String { "https://firebasestorage.googleapis.com".into() }
fn default_storage_timeout() -> u64 { 30 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content).map_err(|e| anyhow!("invalid config file {path}: {e}"))?;
    Ok(cfg)
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Like `load_and_validate`, but a missing config file falls back to
    /// defaults filled from environment variables. A file that exists but
    /// fails to parse is still an error.
    pub fn load_or_env() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.storage.normalize_from_env();
        self.storage.validate()?;
        self.auth.normalize_from_env();
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            if !host.trim().is_empty() { self.host = host; }
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if let Ok(env) = std::env::var("APP_ENV") {
            self.environment = env;
        }
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        self.environment = self.environment.trim().to_ascii_lowercase();
        if self.environment != "development" && self.environment != "production" {
            return Err(anyhow!("server.environment must be \"development\" or \"production\""));
        }
        Ok(())
    }

    pub fn expose_error_details(&self) -> bool {
        self.environment == "development"
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
        if self.max_connections == 0 { self.max_connections = default_max_connections(); }
        if self.min_connections == 0 { self.min_connections = default_min_connections(); }
        if self.connect_timeout_secs == 0 { self.connect_timeout_secs = default_connect_timeout(); }
        if self.acquire_timeout_secs == 0 { self.acquire_timeout_secs = default_acquire_timeout(); }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(endpoint) = std::env::var("STORAGE_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if self.bucket.trim().is_empty() {
            if let Ok(bucket) = std::env::var("STORAGE_BUCKET") {
                self.bucket = bucket;
            }
        }
        if self.token.is_none() {
            self.token = std::env::var("STORAGE_TOKEN").ok().filter(|t| !t.trim().is_empty());
        }
        self.endpoint = self.endpoint.trim_end_matches('/').to_string();
        if self.timeout_secs == 0 { self.timeout_secs = default_storage_timeout(); }
    }

    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(anyhow!("storage.bucket is empty; set it in config.toml or STORAGE_BUCKET"));
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(anyhow!("storage.endpoint must start with http(s)"));
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn normalize_from_env(&mut self) {
        if self.jwt_secret.is_none() {
            self.jwt_secret = std::env::var("JWT_SECRET").ok();
        }
        if self.jwt_secret.as_deref().is_some_and(|s| s.trim().is_empty()) {
            self.jwt_secret = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> AppConfig {
        toml::from_str(src).expect("valid toml")
    }

    #[test]
    fn parses_full_config() {
        let mut cfg = parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            environment = "Production"

            [database]
            url = "postgres://u:p@localhost:5432/dogs"

            [storage]
            endpoint = "https://storage.example.com/"
            bucket = "dogs-bucket"

            [auth]
            jwt_secret = "s3cret"
            "#,
        );
        cfg.normalize_and_validate().expect("valid config");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.environment, "production");
        assert!(!cfg.server.expose_error_details());
        assert_eq!(cfg.storage.endpoint, "https://storage.example.com");
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.auth.jwt_secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn rejects_non_postgres_url() {
        let db = DatabaseConfig { url: "mysql://localhost/db".into(), max_connections: 5, min_connections: 1, ..Default::default() };
        assert!(db.validate().is_err());
    }

    #[test]
    fn rejects_inverted_pool_bounds() {
        let db = DatabaseConfig { url: "postgres://localhost/db".into(), max_connections: 1, min_connections: 4, ..Default::default() };
        assert!(db.validate().is_err());
    }

    #[test]
    fn storage_requires_http_endpoint() {
        let s = StorageConfig { endpoint: "ftp://bucket".into(), bucket: "b".into(), token: None, timeout_secs: 5 };
        assert!(s.validate().is_err());
    }

    #[test]
    fn defaults_hide_error_details() {
        assert_eq!(ServerConfig::default().environment, "production");
        assert!(!ServerConfig::default().expose_error_details());
        assert!(!parse("[server]\nhost = \"0.0.0.0\"\nport = 80\n").server.expose_error_details());
    }

    #[test]
    fn missing_file_is_distinguished_from_broken_file() {
        let dir = std::env::temp_dir().join(format!("configs-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");

        let missing = load_from_file(dir.join("absent.toml").to_str().expect("utf8 path")).unwrap_err();
        assert!(is_missing_file(&missing));

        let broken = dir.join("broken.toml");
        std::fs::write(&broken, "[server\nport = \"eighty\"").expect("write config");
        let err = load_from_file(broken.to_str().expect("utf8 path")).unwrap_err();
        assert!(!is_missing_file(&err));
        assert!(err.to_string().contains("invalid config file"), "{err}");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let mut server = ServerConfig { environment: "staging".into(), ..Default::default() };
        // APP_ENV may be set by the caller's shell; only assert when it is not.
        if std::env::var("APP_ENV").is_err() {
            assert!(server.normalize().is_err());
        }
    }
}
