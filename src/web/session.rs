//! Session Carrier
//! Mission: Hold the browser's token pair in an encrypted, authenticated cookie

use aes_gcm::{aead::Aead, Aes256Gcm, Key, KeyInit, Nonce};
use anyhow::{anyhow, Result};
use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const SESSION_COOKIE_NAME: &str = "jokebox_session";

/// 365 days, matching the refresh token's lifetime
pub const SESSION_MAX_AGE_SECS: i64 = 365 * 24 * 60 * 60;

/// The token pair for one browser session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub access_token: String,
    pub refresh_token: String,
}

/// Encrypts session payloads into cookie values and back.
///
/// AES-256-GCM with a random nonce prepended to the ciphertext, so the
/// browser can neither read nor forge token values. The key is derived
/// from the session secret.
#[derive(Clone)]
pub struct SessionCodec {
    cipher: Aes256Gcm,
    secure: bool,
}

impl SessionCodec {
    pub fn new(secret: &str, secure: bool) -> Self {
        let key_bytes = Sha256::digest(secret.as_bytes());
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
        Self { cipher, secure }
    }

    /// Encrypt a session into a cookie-safe value
    pub fn encode(&self, session: &SessionData) -> Result<String> {
        let plaintext = serde_json::to_vec(session)?;

        let nonce_bytes = rand::random::<[u8; 12]>();
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_slice())
            .map_err(|_| anyhow!("Session encryption failed"))?;

        let mut payload = Vec::with_capacity(12 + ciphertext.len());
        payload.extend_from_slice(&nonce_bytes);
        payload.extend_from_slice(&ciphertext);

        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
        Ok(URL_SAFE_NO_PAD.encode(payload))
    }

    /// Decrypt a cookie value. Any failure means "no session" - the value
    /// came from the browser and gets no benefit of the doubt.
    pub fn decode(&self, value: &str) -> Option<SessionData> {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
        let payload = URL_SAFE_NO_PAD.decode(value).ok()?;
        if payload.len() < 12 {
            return None;
        }

        let nonce = Nonce::from_slice(&payload[..12]);
        let plaintext = self.cipher.decrypt(nonce, &payload[12..]).ok()?;

        serde_json::from_slice(&plaintext).ok()
    }

    /// Read the session carried on an inbound request, if any
    pub fn read(&self, headers: &HeaderMap) -> Option<SessionData> {
        let value = get_cookie(headers, SESSION_COOKIE_NAME)?;
        self.decode(value)
    }

    /// Set-Cookie value committing the session for a year
    pub fn commit_cookie(&self, session: &SessionData) -> Result<String> {
        let value = self.encode(session)?;
        Ok(format!(
            "{}={}; Max-Age={}; Path=/; SameSite=Lax; HttpOnly{}",
            SESSION_COOKIE_NAME,
            value,
            SESSION_MAX_AGE_SECS,
            if self.secure { "; Secure" } else { "" }
        ))
    }

    /// Set-Cookie value destroying the session
    pub fn destroy_cookie(&self) -> String {
        format!(
            "{}=; Max-Age=0; Path=/; SameSite=Lax; HttpOnly{}",
            SESSION_COOKIE_NAME,
            if self.secure { "; Secure" } else { "" }
        )
    }
}

/// Extract a cookie value from the Cookie header
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn test_codec() -> SessionCodec {
        SessionCodec::new("test-session-secret", false)
    }

    fn test_session() -> SessionData {
        SessionData {
            access_token: "access.jwt.value".to_string(),
            refresh_token: "refresh.jwt.value".to_string(),
        }
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let codec = test_codec();
        let session = test_session();

        let value = codec.encode(&session).unwrap();
        assert_eq!(codec.decode(&value), Some(session));
    }

    #[test]
    fn test_tampered_value_rejected() {
        let codec = test_codec();
        let mut value = codec.encode(&test_session()).unwrap();

        // Flip a character in the ciphertext portion
        let tail = value.pop().unwrap();
        value.push(if tail == 'A' { 'B' } else { 'A' });

        assert!(codec.decode(&value).is_none());
    }

    #[test]
    fn test_wrong_key_rejected() {
        let codec = test_codec();
        let other = SessionCodec::new("different-secret", false);

        let value = codec.encode(&test_session()).unwrap();
        assert!(other.decode(&value).is_none());
    }

    #[test]
    fn test_garbage_value_rejected() {
        let codec = test_codec();
        assert!(codec.decode("not base64 at all!!!").is_none());
        assert!(codec.decode("").is_none());
    }

    #[test]
    fn test_cookie_attributes() {
        let codec = test_codec();
        let cookie = codec.commit_cookie(&test_session()).unwrap();

        assert!(cookie.starts_with("jokebox_session="));
        assert!(cookie.contains("Max-Age=31536000"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Secure"));

        let secure = SessionCodec::new("test-session-secret", true);
        assert!(secure.commit_cookie(&test_session()).unwrap().contains("Secure"));
    }

    #[test]
    fn test_destroy_cookie_zeroes_max_age() {
        let codec = test_codec();
        assert!(codec.destroy_cookie().contains("Max-Age=0"));
    }

    #[test]
    fn test_read_from_headers() {
        let codec = test_codec();
        let session = test_session();
        let value = codec.encode(&session).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("foo=bar; {}={}", SESSION_COOKIE_NAME, value)).unwrap(),
        );

        assert_eq!(codec.read(&headers), Some(session));
        assert_eq!(get_cookie(&headers, "foo"), Some("bar"));
        assert_eq!(get_cookie(&headers, "missing"), None);
    }
}
