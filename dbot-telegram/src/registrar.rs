//! Webhook registration with the Bot API.

use async_trait::async_trait;
use dbot_core::{DbotError, Result, User};
use tracing::{error, info, instrument};

use crate::secret::WebhookSecret;

/// Bot API calls needed at startup. Implemented by [`crate::TelegramBotAdapter`].
#[async_trait]
pub trait WebhookApi: Send + Sync {
    /// Sets the delivery URL, drops queued updates and attaches the secret.
    async fn set_webhook(&self, url: &str, secret: &WebhookSecret) -> Result<()>;
    /// The bot's own account.
    async fn get_me(&self) -> Result<User>;
}

/// Joins a public base URL and an endpoint path with exactly one `/`.
pub fn compute_webhook_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Registers `url` with the platform. Any failure is a [`DbotError::Webhook`]; the caller must not
/// serve traffic after one.
#[instrument(skip(api, secret))]
pub async fn register_webhook(api: &dyn WebhookApi, url: &str, secret: &WebhookSecret) -> Result<()> {
    info!(url = %url, "step: registering webhook");
    api.set_webhook(url, secret).await.map_err(|e| {
        error!(error = %e, url = %url, "Webhook registration failed");
        match e {
            DbotError::Webhook(_) => e,
            other => DbotError::Webhook(other.to_string()),
        }
    })?;
    info!(url = %url, "Webhook registered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingApi {
        calls: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl WebhookApi for RecordingApi {
        async fn set_webhook(&self, url: &str, secret: &WebhookSecret) -> Result<()> {
            if self.fail {
                return Err(DbotError::Bot("Unauthorized".to_string()));
            }
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), secret.expose().to_string()));
            Ok(())
        }

        async fn get_me(&self) -> Result<User> {
            Err(DbotError::Bot("unused".to_string()))
        }
    }

    #[test]
    fn test_compute_webhook_url() {
        assert_eq!(
            compute_webhook_url("https://example.com", "/tgupdates"),
            "https://example.com/tgupdates"
        );
        assert_eq!(
            compute_webhook_url("https://example.com/", "/tgupdates"),
            "https://example.com/tgupdates"
        );
        assert_eq!(
            compute_webhook_url("https://example.com/bot", "hook"),
            "https://example.com/bot/hook"
        );
    }

    #[tokio::test]
    async fn test_register_webhook_passes_url_and_secret() {
        let api = RecordingApi {
            calls: Mutex::new(Vec::new()),
            fail: false,
        };
        let secret = WebhookSecret::from("s3cret".to_string());

        register_webhook(&api, "https://example.com/tgupdates", &secret)
            .await
            .unwrap();

        assert_eq!(
            *api.calls.lock().unwrap(),
            vec![("https://example.com/tgupdates".to_string(), "s3cret".to_string())]
        );
    }

    #[tokio::test]
    async fn test_register_webhook_failure_is_webhook_error() {
        let api = RecordingApi {
            calls: Mutex::new(Vec::new()),
            fail: true,
        };
        let err = register_webhook(&api, "https://example.com/tgupdates", &WebhookSecret::generate())
            .await
            .unwrap_err();

        assert!(matches!(err, DbotError::Webhook(ref m) if m.contains("Unauthorized")));
    }
}
