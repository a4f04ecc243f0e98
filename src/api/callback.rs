use std::collections::HashMap;

use axum::{Extension, extract::Query, response::Html};

use crate::server::CallbackState;

/// Receives Spotify's redirect after the user answered the consent page.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<CallbackState>,
) -> Html<&'static str> {
    let outcome = match (params.get("code"), params.get("error")) {
        (Some(code), _) => Ok(code.clone()),
        (None, Some(error)) => Err(error.clone()),
        (None, None) => return Html("<h4>Missing authorization code.</h4>"),
    };

    let granted = outcome.is_ok();
    *shared_state.lock().await = Some(outcome);

    if granted {
        Html("<h2>Authentication successful.</h2><p>Close browser window.</p>")
    } else {
        Html("<h4>Login failed.</h4>")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::Mutex;

    use super::*;

    fn query(pairs: &[(&str, &str)]) -> Query<HashMap<String, String>> {
        Query(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn stores_authorization_code() {
        let state: CallbackState = Arc::new(Mutex::new(None));

        let Html(body) = callback(
            query(&[("code", "AQA123")]),
            Extension(Arc::clone(&state)),
        )
        .await;

        assert!(body.contains("successful"));
        assert_eq!(*state.lock().await, Some(Ok("AQA123".to_string())));
    }

    #[tokio::test]
    async fn stores_refusal() {
        let state: CallbackState = Arc::new(Mutex::new(None));

        let Html(body) = callback(
            query(&[("error", "access_denied")]),
            Extension(Arc::clone(&state)),
        )
        .await;

        assert!(body.contains("failed"));
        assert_eq!(*state.lock().await, Some(Err("access_denied".to_string())));
    }

    #[tokio::test]
    async fn ignores_requests_without_code() {
        let state: CallbackState = Arc::new(Mutex::new(None));

        let Html(body) = callback(query(&[]), Extension(Arc::clone(&state))).await;

        assert!(body.contains("Missing"));
        assert!(state.lock().await.is_none());
    }
}
