use crate::{
    error, info,
    spotify::auth::{BrowserCallback, authorize},
    success,
};

pub async fn auth() {
    info!("Waiting for Spotify authorization in the browser...");

    match authorize(&BrowserCallback::from_env()).await {
        Ok(_) => success!("Authentication successful. Token saved."),
        Err(e) => error!("Authentication failed. Err: {}", e),
    }
}
