use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub files: FilesConfig,

    pub security: SecurityConfig,

    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Emit logs as JSON lines instead of the human-readable format
    pub json_logs: bool,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    /// Use the first `X-Forwarded-For` hop as the caller IP.
    /// Enable when running behind a reverse proxy.
    pub trust_forwarded_for: bool,

    /// Whether to set the Secure flag on session cookies.
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            trust_forwarded_for: true,
            secure_cookies: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Overridden by `DATABASE_URL`
    pub url: String,

    pub max_connections: u32,

    pub min_connections: u32,

    /// Idle connections are recycled after this many seconds (default: 300)
    pub idle_timeout_seconds: u64,

    /// Validate a pooled connection before handing it out
    pub test_before_acquire: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:data/filewriter.db".to_string(),
            max_connections: 5,
            min_connections: 1,
            idle_timeout_seconds: 300,
            test_before_acquire: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Working directory every file operation is confined to.
    /// Overridden by `FILEWRITER_ROOT`.
    pub root: String,

    /// Label stored on tracked files created through the API
    pub writer_label: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            writer_label: "Amaru".to_string(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Shared bearer token for `/api/*`. Read from `API_SECRET_KEY`, never persisted.
    /// When unset every gated endpoint is denied.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Session cookie signing secret. Read from `SESSION_SECRET`, never persisted.
    #[serde(skip_serializing)]
    pub session_secret: Option<String>,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |set: bool| if set { "<set>" } else { "<unset>" };
        f.debug_struct("SecurityConfig")
            .field("api_key", &mask(self.api_key.is_some()))
            .field("session_secret", &mask(self.session_secret.is_some()))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session lifetime without "remember me", counted from the last request
    pub idle_minutes: i64,

    /// Session lifetime with "remember me"
    pub remember_days: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_minutes: 60,
            remember_days: 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            files: FilesConfig::default(),
            security: SecurityConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Config {
    /// Loads the config file (if any) and applies environment overrides.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::load_file()?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Applies process environment on top of file values.
    ///
    /// Takes a lookup function so tests can inject variables without touching
    /// the real environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(secret) = non_empty("SESSION_SECRET") {
            self.security.session_secret = Some(secret);
        }
        if let Some(key) = non_empty("API_SECRET_KEY") {
            self.security.api_key = Some(key);
        }
        if let Some(root) = non_empty("FILEWRITER_ROOT") {
            self.files.root = root;
        }
        if let Some(port) = non_empty("FILEWRITER_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("filewriter").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".filewriter").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.server.port == 0 {
            anyhow::bail!("Server port must be > 0");
        }

        if self.files.root.trim().is_empty() {
            anyhow::bail!("Files root cannot be empty");
        }

        if self.database.max_connections < self.database.min_connections {
            anyhow::bail!("database.max_connections must be >= database.min_connections");
        }

        Ok(())
    }

    #[must_use]
    pub fn files_root(&self) -> PathBuf {
        PathBuf::from(&self.files.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.idle_timeout_seconds, 300);
        assert!(config.database.test_before_acquire);
        assert_eq!(config.files.writer_label, "Amaru");
        assert!(config.security.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization_skips_secrets() {
        let mut config = Config::default();
        config.security.api_key = Some("top-secret".to_string());
        config.security.session_secret = Some("also-secret".to_string());

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[database]"));
        assert!(!toml_str.contains("top-secret"));
        assert!(!toml_str.contains("also-secret"));

        let debug = format!("{config:?}");
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("<set>"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [files]
            root = "/srv/agent"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.files.root, "/srv/agent");
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "sqlite:/tmp/x.db"),
            ("API_SECRET_KEY", "k"),
            ("SESSION_SECRET", ""),
            ("FILEWRITER_PORT", "8081"),
        ]);

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.database.url, "sqlite:/tmp/x.db");
        assert_eq!(config.security.api_key.as_deref(), Some("k"));
        assert!(config.security.session_secret.is_none());
        assert_eq!(config.server.port, 8081);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.database.url = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
