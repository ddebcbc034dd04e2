use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub erp: ErpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Подключение к ERP по JSON-RPC
#[derive(Debug, Deserialize, Clone)]
pub struct ErpConfig {
    pub url: String,
    pub database: String,
    pub login: String,
    pub password: String,
}

impl Default for ErpConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8069".to_string(),
            database: "erp".to_string(),
            login: "admin".to_string(),
            password: "admin".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/salesforce_connector.db"

[server]
host = "127.0.0.1"
port = 3000

[erp]
url = "http://localhost:8069"
database = "erp"
login = "admin"
password = "admin"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

fn parse_config(contents: &str) -> anyhow::Result<Config> {
    toml::from_str(contents).map_err(|e| anyhow::anyhow!("Invalid config.toml: {}", e))
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return Ok(exe_dir.join(db_path));
        }
    }

    Ok(PathBuf::from(db_path_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.database.path, "target/db/salesforce_connector.db");
        assert_eq!(config.server.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.erp.url, "http://localhost:8069");
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let config = parse_config("[database]\npath = \"/tmp/sf.db\"\n").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.erp.login, "admin");
        assert_eq!(
            get_database_path(&config).unwrap(),
            PathBuf::from("/tmp/sf.db")
        );
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(parse_config("[database]\n").is_err());
    }
}
