use std::env;
use std::path::{Path, PathBuf};

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::with_security_headers;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_PATH: &str = "/dev/null";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// File that receives one line per handled request.
    pub log_path: PathBuf,
    pub cors_allowed_origins: Option<String>,
    pub production: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            cors_allowed_origins: None,
            production: false,
        }
    }
}

impl Config {
    /// Load settings from the process environment, optionally seeded by a
    /// dotenv-style file and by `.env`. Variables already set win over both
    /// files, and `config_file` wins over `.env`.
    pub fn load(config_file: Option<&Path>) -> Self {
        if let Some(path) = config_file {
            match dotenvy::from_path(path) {
                Ok(()) => tracing::info!("Loaded config file {}", path.display()),
                Err(e) => tracing::warn!("Error loading config file {}: {}", path.display(), e),
            }
        }
        dotenvy::dotenv().ok();

        Self::from_env()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
                tracing::warn!("Invalid PORT '{}': {}, using {}", raw, e, defaults.port);
                defaults.port
            }),
            None => defaults.port,
        };

        Self {
            port,
            log_path: lookup("PATH_LOG")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.log_path),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS"),
            production: lookup("RUST_ENV")
                .map(|v| v.to_lowercase() == "production")
                .unwrap_or(false),
        }
    }
}
