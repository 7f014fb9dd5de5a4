//! Signed delivery tokens for deferred draw-result disclosure.

use crate::error::AppError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha1 = Hmac<Sha1>;

#[derive(Serialize, Deserialize)]
struct Claims {
    from: String,
    to: String,
    exp: u64,
}

/// Mints and verifies HMAC-SHA1 signed `<payload>.<signature>` tokens
/// standing in for a draw match. A token names the giver and receiver ids
/// and expires after the configured TTL.
pub struct TokenService {
    secret: String,
    ttl: u64,
}

impl TokenService {
    pub fn new(secret: &str, ttl: u64) -> Self {
        Self {
            secret: secret.to_string(),
            ttl,
        }
    }

    pub fn issue(&self, from: &str, to: &str) -> String {
        let claims = Claims {
            from: from.to_string(),
            to: to.to_string(),
            exp: now() + self.ttl,
        };
        let payload = BASE64.encode(serde_json::to_vec(&claims).expect("claims serialize"));
        let signature = self.sign(&payload);
        format!("{payload}.{signature}")
    }

    /// Returns the `(from, to)` participant ids carried by a valid token.
    pub fn verify(&self, token: &str) -> Result<(String, String), AppError> {
        let (payload, signature) = token.split_once('.').ok_or(AppError::InvalidToken)?;
        if self.sign(payload) != signature {
            return Err(AppError::InvalidToken);
        }

        let raw = BASE64.decode(payload).map_err(|_| AppError::InvalidToken)?;
        let claims: Claims = serde_json::from_slice(&raw).map_err(|_| AppError::InvalidToken)?;
        if claims.exp <= now() {
            return Err(AppError::InvalidToken);
        }

        Ok((claims.from, claims.to))
    }

    fn sign(&self, payload: &str) -> String {
        let mut mac =
            HmacSha1::new_from_slice(self.secret.as_bytes()).expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}
