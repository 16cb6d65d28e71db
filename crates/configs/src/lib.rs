use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

/// Environment variable holding the privileged Supabase key. This is the only name read.
pub const SERVICE_KEY_ENV: &str = "SUPABASE_SERVICE_ROLE_KEY";
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Supabase row-level REST API
    #[default]
    Rest,
    /// Direct PostgreSQL connection
    Postgres,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rest" | "supabase" => Ok(Self::Rest),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(anyhow!("unknown store backend `{other}` (expected rest or postgres)")),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub service_key: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            service_key: String::new(),
            table: default_table(),
            timeout_secs: default_request_timeout(),
        }
    }
}

fn default_table() -> String { "admin".into() }
fn default_request_timeout() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
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

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 10 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// bcrypt work factor; values below 10 are rejected
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    /// When set, successful logins also receive a signed session token
    #[serde(default)]
    pub jwt_secret: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { bcrypt_cost: default_bcrypt_cost(), jwt_secret: None }
    }
}

fn default_bcrypt_cost() -> u32 { 10 }

pub const MIN_BCRYPT_COST: u32 = 10;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Load from `CONFIG_PATH` (default `config.toml`). A missing file yields defaults.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    match std::fs::read_to_string(&path) {
        Ok(content) => parse(&content).with_context(|| format!("invalid config file {path}")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(e).with_context(|| format!("cannot read config file {path}")),
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        common::env::load_dotenv();
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.apply_env(common::env::var_non_empty)?;
        self.server.normalize()?;
        self.validate()
    }

    /// Overlay environment values on top of the file contents.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup("STORE_BACKEND") {
            self.store.backend = v.parse()?;
        }
        if let Some(v) = lookup(SUPABASE_URL_ENV) {
            self.supabase.url = v;
        }
        if let Some(v) = lookup(SERVICE_KEY_ENV) {
            self.supabase.service_key = v;
        }
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = Some(v);
        }
        if let Some(v) = lookup("BCRYPT_COST") {
            self.auth.bcrypt_cost = v.parse().map_err(|_| anyhow!("BCRYPT_COST must be an integer"))?;
        }
        if let Some(v) = lookup("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("SERVER_PORT") {
            self.server.port = v.parse().map_err(|_| anyhow!("SERVER_PORT must be a port number"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.auth.validate()?;
        match self.store.backend {
            StoreBackend::Rest => self.supabase.validate(),
            StoreBackend::Postgres => self.database.validate(),
        }
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl SupabaseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("supabase.url is empty; set it in config.toml or {SUPABASE_URL_ENV}"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("https://") || lower.starts_with("http://")) {
            return Err(anyhow!("supabase.url must start with http:// or https://"));
        }
        if self.service_key.trim().is_empty() {
            return Err(anyhow!("supabase.service_key is empty; set it in config.toml or {SERVICE_KEY_ENV}"));
        }
        if self.table.trim().is_empty() {
            return Err(anyhow!("supabase.table must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("supabase.timeout_secs must be a positive number of seconds"));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive numbers of seconds"));
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            return Err(anyhow!(
                "auth.bcrypt_cost must be in {MIN_BCRYPT_COST}..={MAX_BCRYPT_COST}, got {}",
                self.bcrypt_cost
            ));
        }
        if matches!(&self.jwt_secret, Some(s) if s.trim().is_empty()) {
            return Err(anyhow!("auth.jwt_secret must not be blank when present"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_sections_missing() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.store.backend, StoreBackend::Rest);
        assert_eq!(cfg.supabase.table, "admin");
        assert_eq!(cfg.auth.bcrypt_cost, 10);
        assert!(cfg.auth.jwt_secret.is_none());
    }

    #[test]
    fn parses_full_file() {
        let cfg = parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [store]
            backend = "postgres"

            [database]
            url = "postgres://u:p@localhost/kondan"

            [auth]
            bcrypt_cost = 12
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.store.backend, StoreBackend::Postgres);
        assert_eq!(cfg.auth.bcrypt_cost, 12);
        cfg.validate().unwrap();
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = parse("[supabase]\nurl = \"https://file.supabase.co\"\nservice_key = \"file-key\"").unwrap();
        cfg.apply_env(env_of(&[
            (SUPABASE_URL_ENV, "https://env.supabase.co"),
            (SERVICE_KEY_ENV, "env-key"),
        ]))
        .unwrap();
        assert_eq!(cfg.supabase.url, "https://env.supabase.co");
        assert_eq!(cfg.supabase.service_key, "env-key");
        cfg.validate().unwrap();
    }

    #[test]
    fn vite_prefixed_key_is_not_read() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env_of(&[
            (SUPABASE_URL_ENV, "https://x.supabase.co"),
            ("VITE_SUPABASE_SERVICE_ROLE_KEY", "leaked"),
        ]))
        .unwrap();
        assert!(cfg.supabase.service_key.is_empty());
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains(SERVICE_KEY_ENV), "{err}");
    }

    #[test]
    fn rejects_low_bcrypt_cost() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env_of(&[
            (SUPABASE_URL_ENV, "https://x.supabase.co"),
            (SERVICE_KEY_ENV, "k"),
            ("BCRYPT_COST", "4"),
        ]))
        .unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env_of(&[("STORE_BACKEND", "postgres")])).unwrap();
        assert!(cfg.validate().is_err());
        cfg.database.url = "mysql://nope".into();
        assert!(cfg.validate().is_err());
        cfg.database.url = "postgres://localhost/kondan".into();
        cfg.validate().unwrap();
    }

    #[test]
    fn unknown_backend_is_an_error() {
        let mut cfg = AppConfig::default();
        assert!(cfg.apply_env(env_of(&[("STORE_BACKEND", "sqlite")])).is_err());
    }
}
