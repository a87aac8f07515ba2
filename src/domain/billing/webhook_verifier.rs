//! Gateway webhook signature verification.
//!
//! The gateway signs each delivery with HMAC-SHA512 over the raw body bytes,
//! keyed by a shared secret, and sends the hex digest in the
//! `x-korapay-signature` header. Verification compares digests in constant
//! time. Without a configured secret the check is skipped entirely, which is
//! only acceptable outside production.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha512;
use subtle::ConstantTimeEq;

use super::webhook_errors::WebhookError;

/// Verifier for gateway webhook signatures.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Option<SecretString>,
}

impl WebhookVerifier {
    /// Creates a verifier. `None` disables verification (insecure fallback).
    pub fn new(secret: Option<SecretString>) -> Self {
        Self { secret }
    }

    /// Whether signatures are actually checked.
    pub fn is_enforcing(&self) -> bool {
        self.secret.is_some()
    }

    /// Verifies the signature over the raw body bytes.
    ///
    /// # Errors
    ///
    /// - `MissingSignature` - secret configured but no header supplied
    /// - `InvalidSignature` - header is not hex or the digest does not match
    pub fn verify(&self, payload: &[u8], signature: Option<&str>) -> Result<(), WebhookError> {
        let secret = match &self.secret {
            Some(secret) => secret,
            None => return Ok(()),
        };

        let signature = signature.ok_or(WebhookError::MissingSignature)?;
        let provided = hex::decode(signature).map_err(|_| WebhookError::InvalidSignature)?;
        let expected = hmac_sha512(secret.expose_secret(), payload);

        if constant_time_compare(&expected, &provided) {
            Ok(())
        } else {
            Err(WebhookError::InvalidSignature)
        }
    }
}

/// Hex HMAC-SHA512 digest, as the gateway would send it.
///
/// Exposed so test fixtures and the mock gateway can sign deliveries.
pub fn sign_payload(secret: &str, payload: &[u8]) -> String {
    hex::encode(hmac_sha512(secret, payload))
}

fn hmac_sha512(secret: &str, payload: &[u8]) -> Vec<u8> {
    let mut mac =
        Hmac::<Sha512>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Constant-time comparison to avoid leaking digest prefixes via timing.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
