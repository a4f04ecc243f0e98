//! # Spotify Integration Module
//!
//! Everything that talks to the Spotify Web API lives here. The pipeline
//! stages depend on the [`SpotifyApi`] trait only, so they can be driven by the
//! real [`SpotifyClient`] or by a fake in tests.
//!
//! ```text
//! Pipeline (download → enrich → generate)
//!          ↓
//! Spotify Integration Layer
//!     ├── library   paginated saved-track download
//!     ├── artists   batched artist → genre lookups
//!     ├── playlist  playlist creation and chunked appends
//!     └── auth      OAuth 2.0 PKCE login (external collaborator)
//!          ↓
//! SpotifyClient (reqwest, one session per run)
//! ```
//!
//! ## API Coverage
//!
//! - `GET /me/tracks` - saved tracks, 50 per page
//! - `GET /artists` - up to 50 artists per call
//! - `GET /me` - the acting user
//! - `POST /users/{user_id}/playlists` - create a playlist
//! - `POST /playlists/{playlist_id}/tracks` - append up to 100 tracks
//!
//! Calls are not retried. Each stage pauses a fixed interval between calls
//! and hands failures to its caller.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;

use crate::{
    config,
    error::ApiError,
    types::{
        AddTracksRequest, AddTracksResponse, CreatePlaylistRequest, CreatePlaylistResponse,
        CurrentUser, SavedTracksPage, SeveralArtistsResponse,
    },
};

pub mod artists;
pub mod auth;
pub mod library;
pub mod playlist;

/// Authenticated access to the endpoints the sync pipeline needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    async fn saved_tracks(&self, limit: usize, offset: usize)
    -> Result<SavedTracksPage, ApiError>;

    async fn several_artists(&self, ids: &[String]) -> Result<SeveralArtistsResponse, ApiError>;

    async fn current_user(&self) -> Result<CurrentUser, ApiError>;

    async fn create_playlist(
        &self,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse, ApiError>;

    async fn add_tracks(
        &self,
        playlist_id: &str,
        request: &AddTracksRequest,
    ) -> Result<AddTracksResponse, ApiError>;
}

/// Supplies a bearer token that is valid right now.
#[async_trait]
pub trait TokenProvider: Send {
    async fn access_token(&mut self) -> Result<String, ApiError>;
}

/// [`SpotifyApi`] over HTTP.
///
/// Holds a single `reqwest::Client` so connections are reused across every
/// request of a run.
pub struct SpotifyClient {
    http: Client,
    base_url: String,
    tokens: Mutex<Box<dyn TokenProvider>>,
}

impl SpotifyClient {
    pub fn new(base_url: impl Into<String>, tokens: impl TokenProvider + 'static) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens: Mutex::new(Box::new(tokens)),
        }
    }

    pub fn from_env(tokens: impl TokenProvider + 'static) -> Self {
        Self::new(config::spotify_apiurl(), tokens)
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.tokens.lock().await.access_token().await?;
        Ok(request.bearer_auth(token))
    }

    async fn get<T: DeserializeOwned>(&self, url: String) -> Result<T, ApiError> {
        let request = self.authorized(self.http.get(&url)).await?;
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        decode_body(status, &body)
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: String,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.authorized(self.http.post(&url).json(body)).await?;
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        decode_body(status, &body)
    }
}

#[async_trait]
impl SpotifyApi for SpotifyClient {
    async fn saved_tracks(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<SavedTracksPage, ApiError> {
        self.get(format!(
            "{uri}/me/tracks?limit={limit}&offset={offset}",
            uri = self.base_url,
        ))
        .await
    }

    async fn several_artists(&self, ids: &[String]) -> Result<SeveralArtistsResponse, ApiError> {
        self.get(format!(
            "{uri}/artists?ids={ids}",
            uri = self.base_url,
            ids = ids.join(","),
        ))
        .await
    }

    async fn current_user(&self) -> Result<CurrentUser, ApiError> {
        self.get(format!("{uri}/me", uri = self.base_url)).await
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse, ApiError> {
        self.post(
            format!("{uri}/users/{user_id}/playlists", uri = self.base_url),
            request,
        )
        .await
    }

    async fn add_tracks(
        &self,
        playlist_id: &str,
        request: &AddTracksRequest,
    ) -> Result<AddTracksResponse, ApiError> {
        self.post(
            format!("{uri}/playlists/{playlist_id}/tracks", uri = self.base_url),
            request,
        )
        .await
    }
}

/// Turns a raw response into a typed record.
///
/// Non-2xx statuses keep the body as the message; a 2xx body that does not
/// match `T` is a [`ApiError::Decode`].
pub fn decode_body<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, ApiError> {
    if !(200..300).contains(&status) {
        return Err(ApiError::Status {
            status,
            message: String::from_utf8_lossy(body).into_owned(),
        });
    }

    serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
}
