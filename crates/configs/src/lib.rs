use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
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

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
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
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret; falls back to the JWT_SECRET env var.
    #[serde(default)]
    pub jwt_secret: String,
    /// Bearer token time-to-live in seconds.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: String::new(), token_ttl_secs: default_token_ttl() }
    }
}

fn default_max_connections() -> u32 {
    10
}
fn default_min_connections() -> u32 {
    2
}
fn default_connect_timeout() -> u64 {
    30
}
fn default_acquire_timeout() -> u64 {
    30
}
fn default_token_ttl() -> u64 {
    3600
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.auth.normalize_from_env();
        self.auth.validate()?;
        Ok(())
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
            if w == 0 {
                self.worker_threads = Some(4);
            }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        // Fill the URL from the environment when the TOML omits it
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or via DATABASE_URL"));
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
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn normalize_from_env(&mut self) {
        if self.jwt_secret.trim().is_empty() {
            if let Ok(secret) = std::env::var("JWT_SECRET") {
                self.jwt_secret = secret;
            }
        }
        if let Ok(ttl) = std::env::var("TOKEN_TTL_SECS") {
            if let Ok(ttl) = ttl.parse::<u64>() {
                self.token_ttl_secs = ttl;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.token_ttl_secs == 0 {
            return Err(anyhow!("auth.token_ttl_secs must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let mut cfg = AppConfig::default();
        cfg.database.url = "postgres://localhost/chat".into();
        assert!(cfg.normalize_and_validate().is_ok());
        assert_eq!(cfg.auth.token_ttl_secs, 3600);
        assert_eq!(cfg.server.worker_threads, Some(4));
    }

    #[test]
    fn rejects_non_postgres_url() {
        let mut cfg = AppConfig::default();
        cfg.database.url = "mysql://localhost/chat".into();
        assert!(cfg.normalize_and_validate().is_err());
    }
}
