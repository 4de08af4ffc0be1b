//! Signed session cookie payloads.
//!
//! Wire format: `<base64url(json)>.<base64url(hmac-sha256)>`, both parts
//! unpadded, with the MAC computed over the encoded JSON text.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::SessionData;
use crate::config::SessionSecret;
use crate::error::SessionError;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone, Debug)]
pub struct SessionCodec {
    secret: SessionSecret,
}

impl SessionCodec {
    pub fn new(secret: SessionSecret) -> Self {
        Self { secret }
    }

    pub fn encode(&self, session: &SessionData) -> Result<String, SessionError> {
        let json = serde_json::to_vec(session)?;
        let encoded = URL_SAFE_NO_PAD.encode(json);
        let signature = URL_SAFE_NO_PAD.encode(self.mac(&encoded).finalize().into_bytes());
        Ok(format!("{encoded}.{signature}"))
    }

    /// Verify and decode a cookie value. Any failure means "no session".
    pub fn decode(&self, value: &str) -> Option<SessionData> {
        let (encoded, signature) = value.rsplit_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        // verify_slice compares in constant time
        self.mac(encoded).verify_slice(&signature).ok()?;

        let json = URL_SAFE_NO_PAD.decode(encoded).ok()?;
        serde_json::from_slice(&json).ok()
    }

    fn mac(&self, encoded: &str) -> HmacSha256 {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(encoded.as_bytes());
        mac
    }
}
