//! Signed codec for session payloads.
//!
//! Cookie value layout: `<b64url(json payload)>.<b64url(hmac-sha256(payload))>`,
//! unpadded. The payload is readable by the client but cannot be altered
//! without the server secret. Signatures are checked in constant time.

use std::collections::BTreeMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use folio_core::types::Timestamp;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Serialized session contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionPayload {
    pub values: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
}

/// Secret used to sign and verify session cookies.
pub struct SessionKey {
    secret: Vec<u8>,
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

impl SessionKey {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length")
    }

    /// Serialize and sign a payload into a cookie value.
    pub fn encode(&self, payload: &SessionPayload) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(payload)?;
        let mut mac = self.mac();
        mac.update(&json);
        let signature = mac.finalize().into_bytes();
        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&json),
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Verify and deserialize a cookie value.
    ///
    /// Returns `None` for malformed values, bad signatures, or payloads that
    /// have expired as of `now`.
    pub fn decode(&self, value: &str, now: Timestamp) -> Option<SessionPayload> {
        let (payload_b64, signature_b64) = value.split_once('.')?;
        let json = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
        let signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;

        let mut mac = self.mac();
        mac.update(&json);
        if mac.verify_slice(&signature).is_err() {
            tracing::debug!("Rejected session cookie with invalid signature");
            return None;
        }

        let payload: SessionPayload = serde_json::from_slice(&json).ok()?;
        match payload.expires_at {
            Some(expires_at) if now >= expires_at => None,
            _ => Some(payload),
        }
    }
}
