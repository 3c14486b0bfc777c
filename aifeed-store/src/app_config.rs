use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    #[default]
    Memory,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct RetentionConfig {
    /// Cap on offers shown per cancellation attempt; unset shows every match
    pub max_offers_displayed: Option<usize>,
    /// Capacity of the retention event broadcast channel
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_offers_displayed: None,
            event_buffer: default_event_buffer(),
        }
    }
}

fn default_event_buffer() -> usize { 100 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides are optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `AIFEED_DATABASE__URL=postgres://...` sets `database.url`
            .add_source(config::Environment::with_prefix("AIFEED").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn parse(toml: &str) -> Config {
        config::Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = parse("[server]\nport = 9000\n");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.database.max_connections, 5);
        assert!(config.database.url.is_none());
        assert_eq!(config.retention.max_offers_displayed, None);
        assert_eq!(config.retention.event_buffer, 100);
    }

    #[test]
    fn test_postgres_backend() {
        let config = parse(
            r#"
            [server]
            port = 8080

            [storage]
            backend = "postgres"

            [database]
            url = "postgres://localhost/aifeed"

            [retention]
            max_offers_displayed = 2
            "#,
        );
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(config.database.url.as_deref(), Some("postgres://localhost/aifeed"));
        assert_eq!(config.retention.max_offers_displayed, Some(2));
    }
}
