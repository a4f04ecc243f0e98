//! Sortify library
//!
//! Sorts a Spotify liked-songs library into genre playlists. The saved tracks
//! are downloaded page by page, each track is tagged with the genres of its
//! first artist, and every genre with enough tracks becomes a private playlist.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints for the local callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error types shared by every stage
//! - `genres` - Genre assignment, grouping and playlist selection
//! - `management` - Token cache and library snapshot storage
//! - `pipeline` - The download, enrich and generate stages in order
//! - `progress` - Progress estimates and spinners for long stages
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod genres;
pub mod management;
pub mod pipeline;
pub mod progress;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Prints an informational line prefixed with a blue `o`.
///
/// ```ignore
/// info!("Resolving genres for {} artists", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a line prefixed with a green checkmark once a step completed.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red `!` line and exits the process with code 1.
///
/// Only for failures the command cannot continue from. Code after the call
/// does not run, so the macro can stand in for a value in a `match` arm.
///
/// ```ignore
/// let tokens = match TokenManager::load().await {
///     Ok(t) => t,
///     Err(e) => error!("Failed to load token: {}", e),
/// };
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a yellow `!` line for problems the run survives.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
