//! # CLI Module
//!
//! User-facing commands of the `sortify` binary. Each command wires the
//! configuration, token cache and snapshot store to the [`Pipeline`] and
//! reports the outcome through the crate's output macros.
//!
//! ## Commands
//!
//! - [`auth`] - OAuth 2.0 PKCE login, caches the token
//! - [`download`] - saves the liked-songs library as a snapshot
//! - [`enrich`] - tags the saved snapshot with artist genres
//! - [`generate`] - publishes genre playlists from the tagged snapshot
//! - [`sync`] - all three stages in one go
//! - [`genres`] - genre sizes of the saved snapshot as a table
//!
//! ## Usage
//!
//! ```bash
//! sortify auth                  # once, opens the browser
//! sortify sync                  # download, enrich, generate
//! sortify genres --search rock  # inspect what would be published
//! sortify generate --dry-run
//! ```
//!
//! Fatal errors end the process with exit code 1.
//!
//! [`Pipeline`]: crate::pipeline::Pipeline

mod auth;
mod genres;
mod library;
mod playlist;

pub use auth::auth;
pub use genres::genres;
pub use library::download;
pub use library::enrich;
pub use library::sync;
pub use playlist::generate;

use crate::{
    error,
    error::SyncError,
    management::{LibraryManager, SnapshotStore, TokenManager},
    spotify::SpotifyClient,
    types::LibrarySnapshot,
};

/// Opens a Spotify session backed by the cached token.
async fn connect() -> SpotifyClient {
    match TokenManager::load().await {
        Ok(tokens) => SpotifyClient::from_env(tokens),
        Err(e) => error!(
            "Failed to load token. Please run sortify auth\n Error: {}",
            e
        ),
    }
}

async fn load_snapshot(store: &LibraryManager) -> LibrarySnapshot {
    match store.load().await {
        Ok(snapshot) => snapshot,
        Err(e) => error!("{}\n Run sortify download first.", e),
    }
}

fn fail(err: SyncError) -> ! {
    if err.is_auth() {
        error!("{}. Please run sortify auth", err);
    }
    error!("{}", err)
}
