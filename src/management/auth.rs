use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;

use crate::{config, error::ApiError, spotify, types::Token};

/// Seconds before expiry at which a token is refreshed anyway.
const EXPIRY_MARGIN_SECS: u64 = 240;

pub struct TokenManager {
    token: Token,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager { token }
    }

    pub async fn load() -> Result<Self, String> {
        let path = Self::token_path();
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|e| format!("{} ({})", e, path.display()))?;
        let token: Token = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self { token })
    }

    pub async fn persist(&self) -> Result<(), String> {
        let path = Self::token_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.token).map_err(|e| e.to_string())?;
        async_fs::write(&path, json)
            .await
            .map_err(|e| e.to_string())
    }

    pub fn is_expired_at(&self, now: u64) -> bool {
        let expires_at = self.token.obtained_at + self.token.expires_in;
        now >= expires_at.saturating_sub(EXPIRY_MARGIN_SECS)
    }

    fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp() as u64)
    }

    fn token_path() -> PathBuf {
        config::data_dir().join("cache/token.json")
    }
}

#[async_trait]
impl spotify::TokenProvider for TokenManager {
    /// Returns the cached access token, refreshing it first when it is about
    /// to expire. A failed refresh is an error; the stale token is not used.
    async fn access_token(&mut self) -> Result<String, ApiError> {
        if self.is_expired() {
            let client_id = config::spotify_client_id().map_err(|e| ApiError::Auth(e.to_string()))?;
            let token = spotify::auth::refresh_token(&self.token.refresh_token, &client_id)
                .await
                .map_err(|e| ApiError::Auth(format!("token refresh failed: {}", e)))?;
            self.token = token;
            self.persist()
                .await
                .map_err(|e| ApiError::Auth(format!("failed to save refreshed token: {}", e)))?;
        }

        Ok(self.token.access_token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(obtained_at: u64, expires_in: u64) -> Token {
        Token {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            scope: "user-library-read".to_string(),
            expires_in,
            obtained_at,
        }
    }

    #[test]
    fn token_is_refreshed_shortly_before_expiry() {
        let manager = TokenManager::new(token(1_000, 3_600));

        assert!(!manager.is_expired_at(1_000));
        assert!(!manager.is_expired_at(4_359));
        assert!(manager.is_expired_at(4_360));
        assert!(manager.is_expired_at(5_000));
    }

    #[test]
    fn short_lived_token_counts_as_expired() {
        let manager = TokenManager::new(token(1_000, 100));
        assert!(manager.is_expired_at(1_000));
    }

    #[tokio::test]
    async fn fresh_token_is_handed_out_unchanged() {
        use crate::spotify::TokenProvider;

        let now = Utc::now().timestamp() as u64;
        let mut manager = TokenManager::new(token(now, 3_600));

        assert_eq!(manager.access_token().await.unwrap(), "access");
        assert_eq!(manager.token.refresh_token, "refresh");
    }
}
