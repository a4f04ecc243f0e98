use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{api, warning};

/// Outcome of the OAuth redirect: the authorization code, or the error
/// Spotify sent instead. `None` until the redirect arrived.
pub type CallbackState = Arc<Mutex<Option<Result<String, String>>>>;

pub async fn bind(addr: &str) -> std::io::Result<TcpListener> {
    TcpListener::bind(addr).await
}

pub fn router(state: CallbackState) -> Router {
    Router::new().route("/callback", get(api::callback).layer(Extension(state)))
}

pub async fn serve(listener: TcpListener, state: CallbackState) {
    if let Err(e) = axum::serve(listener, router(state)).await {
        warning!("Callback server stopped: {}", e);
    }
}
