use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Url};
use tokio::sync::Mutex;

use crate::{
    config,
    error::{ApiError, SyncError},
    management::TokenManager,
    server::{self, CallbackState},
    types::{Token, TokenResponse},
    utils, warning,
};

/// Whatever can walk the user through Spotify's consent page and hand back
/// the authorization code.
#[async_trait]
pub trait AuthorizationCodeSource: Send + Sync {
    async fn obtain_authorization_code(&self, authorize_url: &str) -> Result<String, SyncError>;
}

/// Opens the consent page in the default browser and catches the redirect
/// on the local callback server.
pub struct BrowserCallback {
    server_addr: String,
    max_wait: Duration,
}

impl BrowserCallback {
    pub fn new(server_addr: impl Into<String>, max_wait: Duration) -> Self {
        Self {
            server_addr: server_addr.into(),
            max_wait,
        }
    }

    pub fn from_env() -> Self {
        Self::new(config::server_addr(), Duration::from_secs(60))
    }
}

#[async_trait]
impl AuthorizationCodeSource for BrowserCallback {
    async fn obtain_authorization_code(&self, authorize_url: &str) -> Result<String, SyncError> {
        let state: CallbackState = Arc::new(Mutex::new(None));
        let listener = server::bind(&self.server_addr)
            .await
            .map_err(|e| SyncError::Auth(format!("cannot listen on {}: {}", self.server_addr, e)))?;
        let server = tokio::spawn(server::serve(listener, Arc::clone(&state)));

        if webbrowser::open(authorize_url).is_err() {
            warning!(
                "Failed to open browser. Please navigate to the following URL manually:\n{}",
                authorize_url
            )
        }

        let outcome = wait_for_code(state, self.max_wait).await;
        server.abort();

        match outcome {
            Some(Ok(code)) => Ok(code),
            Some(Err(reason)) => Err(SyncError::Auth(format!("Spotify refused access: {}", reason))),
            None => Err(SyncError::Auth(
                "timed out waiting for the authorization callback".to_string(),
            )),
        }
    }
}

/// Polls the callback state once a second until the redirect arrived.
async fn wait_for_code(
    state: CallbackState,
    max_wait: Duration,
) -> Option<Result<String, String>> {
    let start = tokio::time::Instant::now();

    while start.elapsed() < max_wait {
        if let Some(outcome) = state.lock().await.take() {
            return Some(outcome);
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Runs the OAuth 2.0 PKCE login and caches the resulting token.
///
/// 1. Generate a code verifier and derive its S256 challenge
/// 2. Let `source` obtain an authorization code for the consent URL
/// 3. Exchange code and verifier for a token
/// 4. Persist the token for later runs
pub async fn authorize(source: &dyn AuthorizationCodeSource) -> Result<Token, SyncError> {
    let client_id = config::spotify_client_id()?;
    let redirect_uri = config::spotify_redirect_uri()?;

    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let auth_url = authorize_url(
        &config::spotify_apiauth_url(),
        &client_id,
        &redirect_uri,
        &code_challenge,
        &config::spotify_scope(),
    )?;

    let code = source.obtain_authorization_code(auth_url.as_str()).await?;

    let token = exchange_code_pkce(&code, &code_verifier, &client_id, &redirect_uri)
        .await
        .map_err(|e| SyncError::Auth(format!("token exchange failed: {}", e)))?;

    TokenManager::new(token.clone())
        .persist()
        .await
        .map_err(|e| SyncError::Auth(format!("failed to save token: {}", e)))?;

    Ok(token)
}

pub fn authorize_url(
    base: &str,
    client_id: &str,
    redirect_uri: &str,
    code_challenge: &str,
    scope: &str,
) -> Result<Url, SyncError> {
    Url::parse_with_params(
        base,
        &[
            ("client_id", client_id),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("scope", scope),
        ],
    )
    .map_err(|e| SyncError::Config(format!("invalid authorization url {}: {}", base, e)))
}

pub async fn exchange_code_pkce(
    code: &str,
    verifier: &str,
    client_id: &str,
    redirect_uri: &str,
) -> Result<Token, ApiError> {
    let response = Client::new()
        .post(config::spotify_apitoken_url())
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", client_id),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", redirect_uri),
        ])
        .send()
        .await?;

    let status = response.status().as_u16();
    let body = response.bytes().await?;
    let json: TokenResponse = super::decode_body(status, &body)?;

    into_token(json, None)
}

/// Trades a refresh token for a fresh access token.
///
/// Spotify may omit the refresh token in the answer, in which case the old
/// one stays valid.
pub async fn refresh_token(refresh_token: &str, client_id: &str) -> Result<Token, ApiError> {
    let response = Client::new()
        .post(config::spotify_apitoken_url())
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
        ])
        .send()
        .await?;

    let status = response.status().as_u16();
    let body = response.bytes().await?;
    let json: TokenResponse = super::decode_body(status, &body)?;

    into_token(json, Some(refresh_token))
}

pub fn into_token(json: TokenResponse, previous_refresh: Option<&str>) -> Result<Token, ApiError> {
    let refresh_token = json
        .refresh_token
        .or_else(|| previous_refresh.map(str::to_string))
        .ok_or_else(|| ApiError::Decode("missing field `refresh_token`".to_string()))?;

    Ok(Token {
        access_token: json.access_token,
        refresh_token,
        scope: json.scope.unwrap_or_default(),
        expires_in: json.expires_in,
        obtained_at: Utc::now().timestamp() as u64,
    })
}
