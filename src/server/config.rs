use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

#[derive(Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub listen_addr: String,
    pub log_dir: String,
    pub bcrypt_cost: u32,
    pub db_max_connections: u32,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug, PartialEq)]
pub struct PartialServerConfig {
    pub database_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub listen_addr: Option<String>,
    pub log_dir: Option<String>,
    pub bcrypt_cost: Option<u32>,
    pub db_max_connections: Option<u32>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

fn parse_number(key: &str, value: Option<String>) -> Result<Option<u32>, String> {
    value
        .map(|v| {
            v.trim()
                .parse::<u32>()
                .map_err(|e| format!("{key} must be a positive integer: {e}"))
        })
        .transpose()
}

impl PartialServerConfig {
    pub fn from_file(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
        toml::from_str(&contents).map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))
    }

    /// Reads the upper-case variable for each key through `lookup`.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        Ok(Self {
            database_url: lookup("DATABASE_URL"),
            jwt_secret: lookup("JWT_SECRET"),
            listen_addr: lookup("LISTEN_ADDR"),
            log_dir: lookup("LOG_DIR"),
            bcrypt_cost: parse_number("BCRYPT_COST", lookup("BCRYPT_COST"))?,
            db_max_connections: parse_number("DB_MAX_CONNECTIONS", lookup("DB_MAX_CONNECTIONS"))?,
        })
    }

    pub fn from_env() -> Result<Self, String> {
        Self::from_vars(|key| env::var(key).ok().filter(|v| !v.is_empty()))
    }
}

impl ServerConfig {
    /// File values first, environment overrides, then defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        let file_config = match config_path {
            Some(path) => PartialServerConfig::from_file(Path::new(path))?,
            None => PartialServerConfig::default(),
        };
        let env_config = PartialServerConfig::from_env()?;

        Self::merge(env_config, file_config)
    }

    /// Merge: `primary` overrides `fallback`.
    pub fn merge(primary: PartialServerConfig, fallback: PartialServerConfig) -> Result<Self, String> {
        let bcrypt_cost = primary
            .bcrypt_cost
            .or(fallback.bcrypt_cost)
            .unwrap_or(bcrypt::DEFAULT_COST);
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(format!("BCRYPT_COST must be between 4 and 31, got {bcrypt_cost}"));
        }

        let jwt_secret = primary
            .jwt_secret
            .or(fallback.jwt_secret)
            .ok_or("JWT_SECRET is required")?;
        if jwt_secret.len() < 16 {
            return Err("JWT_SECRET must be at least 16 characters long".to_string());
        }

        Ok(ServerConfig {
            database_url: primary
                .database_url
                .or(fallback.database_url)
                .ok_or("DATABASE_URL is required")?,
            jwt_secret,
            listen_addr: primary
                .listen_addr
                .or(fallback.listen_addr)
                .unwrap_or_else(default_listen_addr),
            log_dir: primary.log_dir.or(fallback.log_dir).unwrap_or_else(default_log_dir),
            bcrypt_cost,
            db_max_connections: primary
                .db_max_connections
                .or(fallback.db_max_connections)
                .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
        })
    }
}
