//! Token Issuance and Verification
//! Mission: Mint and validate the two JWT classes (access, refresh) locally and synchronously

use crate::auth::models::Claims;
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// Issuer claim stamped on every token
pub const TOKEN_ISSUER: &str = "jokebox";

/// Access tokens live 90 minutes; renewal goes through /auth/token
pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 90;

/// Refresh tokens live a year; revocation is tracked out-of-band in the blacklist
pub const REFRESH_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// The two token classes, each signed with its own secret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn lifetime(&self) -> Duration {
        match self {
            TokenKind::Access => Duration::minutes(ACCESS_TOKEN_TTL_MINUTES),
            TokenKind::Refresh => Duration::seconds(REFRESH_TOKEN_TTL_SECS),
        }
    }
}

/// Signing and verification keys for one token class
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Sign a token for the given subject with an explicit lifetime
    pub fn issue_with_lifetime(&self, user_id: &str, lifetime: Duration) -> Result<String> {
        let iat = Utc::now();
        let exp = iat
            .checked_add_signed(lifetime)
            .context("Invalid token expiration timestamp")?;

        let claims = Claims {
            user_id: user_id.to_string(),
            iss: TOKEN_ISSUER.to_string(),
            aud: user_id.to_string(),
            exp: exp.timestamp() as usize,
            iat: iat.timestamp() as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .context("Failed to sign token")
    }

    /// Verify signature and expiration, returning the decoded claims.
    ///
    /// Zero leeway: a token is rejected from its expiration instant onward.
    /// The audience is not validated (it duplicates the subject claim).
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_issuer(&[TOKEN_ISSUER]);

        let decoded = decode::<Claims>(token, &self.decoding, &validation)
            .context("Invalid or expired token")?;

        Ok(decoded.claims)
    }
}

/// Issues and verifies both token classes for the API service
#[derive(Clone)]
pub struct TokenSigner {
    access: TokenKeys,
    refresh: TokenKeys,
}

impl TokenSigner {
    pub fn new(access_secret: &str, refresh_secret: &str) -> Self {
        Self {
            access: TokenKeys::new(access_secret),
            refresh: TokenKeys::new(refresh_secret),
        }
    }

    fn keys(&self, kind: TokenKind) -> &TokenKeys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    pub fn issue(&self, kind: TokenKind, user_id: &str) -> Result<String> {
        debug!("Issuing {:?} token for subject {}", kind, user_id);
        self.keys(kind).issue_with_lifetime(user_id, kind.lifetime())
    }

    pub fn verify(&self, kind: TokenKind, token: &str) -> Result<Claims> {
        self.keys(kind).verify(token)
    }
}
