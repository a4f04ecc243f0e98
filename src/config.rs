//! Configuration management for Sortify.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory. Variables that have a sensible default
//! fall back to it; the two that identify the registered Spotify application
//! are required and surface a [`SyncError::Config`] when missing.
//!
//! Lookup order:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf, time::Duration};

use crate::error::SyncError;

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
const DEFAULT_SCOPE: &str = "user-library-read playlist-modify-private";
const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_THROTTLE_MS: u64 = 500;

/// Root of everything Sortify keeps on disk.
///
/// - Linux: `~/.local/share/sortify`
/// - macOS: `~/Library/Application Support/sortify`
/// - Windows: `%LOCALAPPDATA%/sortify`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sortify");
    path
}

/// Loads environment variables from `sortify/.env` in the local data directory.
///
/// Creates the directory if needed. A missing `.env` file is reported as an
/// error so the caller can warn, but variables already present in the
/// environment keep working.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    dotenv::from_path(&path)
        .map(|_| ())
        .map_err(|e| format!("{} ({})", e, path.display()))
}

fn required(key: &str) -> Result<String, SyncError> {
    env::var(key).map_err(|_| SyncError::Config(format!("{} must be set", key)))
}

fn or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Address the local OAuth callback server binds to.
pub fn server_addr() -> String {
    or_default("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Client id of the application registered on Spotify's developer dashboard.
pub fn spotify_client_id() -> Result<String, SyncError> {
    required("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Redirect URI registered for the application; must point at [`server_addr`].
pub fn spotify_redirect_uri() -> Result<String, SyncError> {
    required("SPOTIFY_API_REDIRECT_URI")
}

/// Permissions requested during authorization.
///
/// Reading the library and writing private playlists is all the sync needs.
pub fn spotify_scope() -> String {
    or_default("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE)
}

pub fn spotify_apiauth_url() -> String {
    or_default("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

pub fn spotify_apitoken_url() -> String {
    or_default("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

pub fn spotify_apiurl() -> String {
    or_default("SPOTIFY_API_URL", DEFAULT_API_URL)
}

/// Location of the library snapshot file.
pub fn library_path() -> PathBuf {
    env::var("SORTIFY_LIBRARY_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_dir().join("library.json"))
}

/// Pause between consecutive remote calls inside a stage.
pub fn throttle() -> Duration {
    let millis = env::var("SORTIFY_THROTTLE_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_THROTTLE_MS);
    Duration::from_millis(millis)
}

/// Knobs shared by every pipeline stage.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub throttle: Duration,
    /// Hide progress spinners, e.g. when output is not a terminal.
    pub quiet: bool,
}

impl SyncSettings {
    pub fn from_env() -> Self {
        Self {
            throttle: throttle(),
            quiet: false,
        }
    }
}
