use crate::domain::error::PaymentError;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use subtle::ConstantTimeEq;

/// Authenticates inbound gateway callbacks. Holds the server-side signing
/// secret; a missing secret rejects every webhook (fail closed).
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Option<String>,
}

impl SignatureVerifier {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    pub fn require(&self, payload: &[u8], provided_hex: &str) -> Result<(), PaymentError> {
        let secret = self
            .secret
            .as_deref()
            .ok_or(PaymentError::WebhookSecretMissing)?;
        if verify(payload, provided_hex, secret) {
            Ok(())
        } else {
            Err(PaymentError::SignatureInvalid)
        }
    }
}

/// HMAC-SHA512 over the raw payload bytes, hex digest, constant-time
/// comparison. Malformed hex or a length mismatch rejects.
pub fn verify(payload: &[u8], provided_hex: &str, secret: &str) -> bool {
    let Ok(mut mac) = Hmac::<Sha512>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    let expected = mac.finalize().into_bytes();

    let Ok(provided) = hex::decode(provided_hex.trim()) else {
        return false;
    };
    if provided.len() != expected.len() {
        return false;
    }
    expected.as_slice().ct_eq(&provided).into()
}

pub fn sign(payload: &[u8], secret: &str) -> String {
    let mut mac =
        Hmac::<Sha512>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}
