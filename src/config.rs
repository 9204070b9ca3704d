use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api_keys: Vec<ApiKeyConfig>,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite URL, e.g. "sqlite:./data/loghub.db"
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiKeyConfig {
    pub key: String,
    pub name: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CorsConfig {
    /// Browser origins allowed to call the API; empty disables CORS headers
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Load configuration from `config.{toml,yaml,...}` layered with
/// `LOGHUB__`-prefixed environment variables.
pub fn load_config(path: &str) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(config::Environment::with_prefix("LOGHUB").separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.database.url.is_empty() {
        anyhow::bail!("Database URL must be configured");
    }

    if cfg.database.max_connections == 0 {
        anyhow::bail!("Database pool needs at least one connection");
    }

    if cfg.api_keys.is_empty() {
        anyhow::bail!("At least one API key must be configured");
    }

    for key in &cfg.api_keys {
        if key.name.is_empty() {
            anyhow::bail!("API key name cannot be empty");
        }
        if key.key.is_empty() {
            anyhow::bail!("API key '{}' has an empty key value", key.name);
        }
    }

    Ok(())
}
