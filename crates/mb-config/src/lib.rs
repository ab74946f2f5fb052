//! Layered settings: built-in defaults → `media-board.toml` → `MEDIA_BOARD__*`
//! environment variables (a `.env` file is loaded into the environment first).

use std::path::PathBuf;

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::debug;

const CONFIG_BASENAME: &str = "media-board";
const ENV_PREFIX: &str = "MEDIA_BOARD";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DATABASE_URL: &str = "sqlite:media_board.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 4;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub log: LogSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    pub cors: CorsSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct LogSettings {
    /// Default directive when RUST_LOG is unset (trace|debug|info|warn|error)
    pub level: String,
    pub json: bool,
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    #[serde(deserialize_with = "secret_string")]
    pub pepper: SecretString,
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogSettings {
    /// JSON array of media titles imported at startup
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct CorsSettings {
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
}

fn secret_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

impl Settings {
    /// Loads `.env`, then the layered sources.
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::from_sources(Some(CONFIG_BASENAME), Environment::with_prefix(ENV_PREFIX))
    }

    fn from_sources(file: Option<&str>, env: Environment) -> Result<Self, SettingsError> {
        let mut builder = Config::builder()
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("database.url", DEFAULT_DATABASE_URL)?
            .set_default("database.max_connections", i64::from(DEFAULT_MAX_CONNECTIONS))?
            .set_default("log.level", DEFAULT_LOG_LEVEL)?
            .set_default("log.json", false)?
            .set_default("auth.pepper", "")?
            .set_default("cors.allowed_origins", Vec::<String>::new())?;

        if let Some(name) = file {
            builder = builder.add_source(File::with_name(name).required(false));
        }

        let settings: Settings = builder
            .add_source(
                env.separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins"),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        use secrecy::ExposeSecret;

        if self.server.port == 0 {
            return Err(SettingsError::Invalid("server.port must be non-zero".into()));
        }
        if self.database.url.trim().is_empty() {
            return Err(SettingsError::Invalid("database.url must be set".into()));
        }
        if self.auth.pepper.expose_secret().is_empty() {
            return Err(SettingsError::Invalid(format!(
                "auth.pepper must be set (e.g. {ENV_PREFIX}__AUTH__PEPPER)"
            )));
        }
        Ok(())
    }
}
