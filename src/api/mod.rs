//! # API Module
//!
//! HTTP endpoints of the short-lived local server used during `sortify auth`.
//!
//! - [`callback`] - receives Spotify's OAuth redirect and records the
//!   authorization code (or the refusal) for the waiting login flow.
//!
//! The handler is mounted by [`crate::server::router`].

mod callback;

pub use callback::callback;
