use common::MAX_IMAGES_PER_CUSTOMER;
use common::validation::MAX_FILE_SIZE_BYTES;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Room for file names, descriptions and JSON punctuation around the payloads.
const BODY_ENVELOPE_HEADROOM: usize = 8 * 1024 * 1024;

/// Smallest body that fits a full batch of maximum-size images as base64.
pub fn default_body_limit() -> usize {
    let encoded_image = 4 * MAX_FILE_SIZE_BYTES.div_ceil(3);
    MAX_IMAGES_PER_CUSTOMER as usize * encoded_image + BODY_ENVELOPE_HEADROOM
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
    /// Request body ceiling. Uploads carry base64 text, so this has to cover
    /// a full batch of maximum-size images after inflation.
    pub body_limit_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub sqlx_logging: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub seed: SeedConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("server.body_limit_bytes", default_body_limit() as i64)?
            .set_default("database.url", "sqlite://customers.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout_secs", 8)?
            .set_default("database.sqlx_logging", false)?
            .set_default("seed.enabled", true)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., CUSTOMER_IMAGES__DATABASE__URL)
            .add_source(
                Environment::with_prefix("CUSTOMER_IMAGES")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
