use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. Without
/// `DATABASE_URL` the server runs on in-memory stores.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// PostgreSQL connection string. `None` selects the in-memory stores.
    pub database_url: Option<String>,
    /// Directory uploaded assets are written under.
    pub asset_root: PathBuf,
    /// Public URL prefix for uploaded assets.
    pub asset_public_base_url: String,
    /// Bucket wizard thumbnails are uploaded to.
    pub thumbnail_bucket: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                         |
    /// |-------------------------|---------------------------------|
    /// | `HOST`                  | `0.0.0.0`                       |
    /// | `PORT`                  | `3000`                          |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`         |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                            |
    /// | `DATABASE_URL`          | unset (in-memory stores)        |
    /// | `ASSET_ROOT`            | `./storage`                     |
    /// | `ASSET_PUBLIC_BASE_URL` | `http://localhost:3000/assets`  |
    /// | `THUMBNAIL_BUCKET`      | `training-thumbnails`           |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let asset_root = std::env::var("ASSET_ROOT")
            .unwrap_or_else(|_| "./storage".into())
            .into();

        let asset_public_base_url = std::env::var("ASSET_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000/assets".into());

        let thumbnail_bucket =
            std::env::var("THUMBNAIL_BUCKET").unwrap_or_else(|_| "training-thumbnails".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            asset_root,
            asset_public_base_url,
            thumbnail_bucket,
        }
    }
}
