use std::fmt;

use thiserror::Error;

/// Failure of a single call against the Spotify Web API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    /// The body did not match the record we expect for this endpoint.
    #[error("unexpected response shape: {0}")]
    Decode(String),

    #[error("authorization failed: {0}")]
    Auth(String),
}

/// Pipeline stage a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Download,
    Enrich,
    Publish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Download => "download",
            Stage::Enrich => "enrich",
            Stage::Publish => "publish",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{stage} stage failed calling {call}: {source}")]
    Api {
        stage: Stage,
        call: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("authorization failed: {0}")]
    Auth(String),

    #[error("library snapshot error: {0}")]
    Snapshot(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl SyncError {
    pub fn api(stage: Stage, call: &'static str, source: ApiError) -> Self {
        SyncError::Api {
            stage,
            call,
            source,
        }
    }

    /// True when the run failed for lack of a usable token or login.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            SyncError::Auth(_)
                | SyncError::Api {
                    source: ApiError::Auth(_),
                    ..
                }
        )
    }
}
