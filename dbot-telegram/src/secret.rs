//! Webhook secret token: generated once at startup, echoed by Telegram on every delivery.

use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use subtle::ConstantTimeEq;

/// Header Telegram uses to echo the secret.
pub const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

const SECRET_BYTES: usize = 20;

/// Random URL-safe token. Never printed: `Debug` and `Display` are redacted.
#[derive(Clone)]
pub struct WebhookSecret(String);

impl WebhookSecret {
    /// 20 random bytes, URL-safe base64 without padding (27 chars, within Telegram's `A-Za-z0-9_-`).
    pub fn generate() -> Self {
        let mut bytes = [0u8; SECRET_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// The token, for `setWebhook` only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Constant-time comparison; a missing header never matches.
    pub fn verify(&self, candidate: Option<&str>) -> bool {
        match candidate {
            Some(c) => self.0.as_bytes().ct_eq(c.as_bytes()).into(),
            None => false,
        }
    }
}

impl From<String> for WebhookSecret {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WebhookSecret(***)")
    }
}

impl fmt::Display for WebhookSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}
