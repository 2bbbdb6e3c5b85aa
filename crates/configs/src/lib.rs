use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4) }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 5000 }

/// What a store does when persisting a collection fails.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Propagate the error; the HTTP layer answers 500.
    #[default]
    Surface,
    /// Log the error and report the in-memory result as if it was stored.
    Log,
}

/// How `create` picks the id of a new record.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// `len(collection) + 1`. Ids may be reused after deletions.
    #[default]
    Length,
    /// `max(existing ids) + 1`.
    MaxPlusOne,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_users_file")]
    pub users_file: String,
    #[serde(default = "default_roles_file")]
    pub roles_file: String,
    #[serde(default = "default_permissions_file")]
    pub permissions_file: String,
    #[serde(default)]
    pub write_policy: WritePolicy,
    #[serde(default)]
    pub id_strategy: IdStrategy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            users_file: default_users_file(),
            roles_file: default_roles_file(),
            permissions_file: default_permissions_file(),
            write_policy: WritePolicy::default(),
            id_strategy: IdStrategy::default(),
        }
    }
}

fn default_data_dir() -> PathBuf { PathBuf::from("data") }
fn default_users_file() -> String { "users.json".into() }
fn default_roles_file() -> String { "roles.json".into() }
// singular, matching the file name the service has always written
fn default_permissions_file() -> String { "permission.json".into() }

impl StorageConfig {
    pub fn users_path(&self) -> PathBuf { self.data_dir.join(&self.users_file) }
    pub fn roles_path(&self) -> PathBuf { self.data_dir.join(&self.roles_file) }
    pub fn permissions_path(&self) -> PathBuf { self.data_dir.join(&self.permissions_file) }
}

pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load from `CONFIG_PATH` (or `config.toml`); fall back to defaults
    /// overlaid with `SERVER_HOST`, `SERVER_PORT`, `DATA_DIR`,
    /// `TOKIO_WORKER_THREADS` when the file does not exist.
    /// A config file that exists but does not parse is an error.
    pub fn load_and_validate() -> Result<Self> {
        let path = config_path();
        let mut cfg = if std::path::Path::new(&path).exists() {
            load_from_file(&path)?
        } else {
            Self::from_env_with(|k| std::env::var(k).ok())
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn from_env_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(host) = lookup("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        if let Some(w) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            cfg.server.worker_threads = Some(w);
        }
        if let Some(dir) = lookup("DATA_DIR") {
            cfg.storage.data_dir = PathBuf::from(dir);
        }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(anyhow!("storage.data_dir is empty"));
        }
        let files = [
            ("users_file", &self.users_file),
            ("roles_file", &self.roles_file),
            ("permissions_file", &self.permissions_file),
        ];
        for (key, name) in files {
            if name.trim().is_empty() {
                return Err(anyhow!("storage.{key} is empty"));
            }
        }
        if self.users_file == self.roles_file
            || self.users_file == self.permissions_file
            || self.roles_file == self.permissions_file
        {
            return Err(anyhow!("storage file names must be distinct"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_legacy_layout() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.storage.permissions_path(), PathBuf::from("data").join("permission.json"));
        assert_eq!(cfg.storage.write_policy, WritePolicy::Surface);
        assert_eq!(cfg.storage.id_strategy, IdStrategy::Length);
    }

    #[test]
    fn parses_partial_toml() -> Result<()> {
        let cfg = load_from_str(
            r#"
            [server]
            port = 8088

            [storage]
            data_dir = "/var/lib/rbac"
            write_policy = "log"
            id_strategy = "max_plus_one"
            "#,
        )?;
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8088);
        assert_eq!(cfg.storage.users_path(), PathBuf::from("/var/lib/rbac/users.json"));
        assert_eq!(cfg.storage.write_policy, WritePolicy::Log);
        assert_eq!(cfg.storage.id_strategy, IdStrategy::MaxPlusOne);
        Ok(())
    }

    #[test]
    fn rejects_unknown_policy() {
        let res = load_from_str("[storage]\nwrite_policy = \"ignore\"\n");
        assert!(res.is_err());
    }

    #[test]
    fn load_from_file_reads_toml() -> Result<()> {
        let path = std::env::temp_dir().join(format!("configs_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[server]\nhost = \"0.0.0.0\"\n")?;
        let cfg = load_from_file(path.to_str().unwrap())?;
        assert_eq!(cfg.server.bind_addr(), "0.0.0.0:5000");
        let _ = std::fs::remove_file(&path);
        Ok(())
    }

    #[test]
    fn env_overlay_and_normalize() -> Result<()> {
        let mut cfg = AppConfig::from_env_with(|k| match k {
            "SERVER_HOST" => Some("  ".into()),
            "SERVER_PORT" => Some("9001".into()),
            "TOKIO_WORKER_THREADS" => Some("0".into()),
            "DATA_DIR" => Some("/tmp/rbac".into()),
            _ => None,
        });
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 9001);
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.storage.data_dir, PathBuf::from("/tmp/rbac"));
        Ok(())
    }

    #[test]
    fn validation_errors() {
        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.storage.roles_file = " ".into();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.storage.roles_file = "users.json".into();
        assert!(cfg.normalize_and_validate().is_err());
    }
}
