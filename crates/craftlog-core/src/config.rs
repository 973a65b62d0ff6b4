//! Configuration module
//!
//! Environment-driven configuration for the media and storage layers.
//! A `.env` file in the working directory is loaded on first read.

use std::env;
use std::path::PathBuf;

const DEFAULT_STORAGE_ROOT: &str = "static/public";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000/public";

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Root directory for all media files. Image record paths are relative
    /// to this directory so an external HTTP layer can serve them statically.
    pub storage_root: PathBuf,
    /// Base URL under which `storage_root` is exposed.
    pub public_base_url: String,
    /// Environment name ("development", "production", ...).
    pub environment: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let storage_root = env::var("CRAFTLOG_STORAGE_ROOT")
            .unwrap_or_else(|_| DEFAULT_STORAGE_ROOT.to_string());
        let public_base_url = env::var("CRAFTLOG_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_PUBLIC_BASE_URL.to_string());
        let environment =
            env::var("CRAFTLOG_ENV").unwrap_or_else(|_| "development".to_string());

        AppConfig {
            storage_root: PathBuf::from(storage_root),
            public_base_url,
            environment,
        }
    }

    /// Public URL for a storage-relative path.
    pub fn public_url(&self, relative_path: &str) -> String {
        format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            relative_path.trim_start_matches('/')
        )
    }
}
