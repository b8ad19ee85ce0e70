//! Refresh-Token Blacklist
//! Mission: Track revoked refresh tokens per subject, with per-key TTL expiry

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use redis::AsyncCommands;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct RevokedEntry {
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

/// Subject-keyed store of revoked refresh tokens.
///
/// Keyed by subject identifier, not token value: at most one entry per
/// subject, and a newer logout overwrites an older one (last writer wins).
/// Redis backs production; the in-memory variant serves tests and dev.
#[derive(Clone)]
pub enum RevocationStore {
    Memory {
        entries: Arc<DashMap<String, RevokedEntry>>,
    },
    Redis {
        manager: redis::aio::ConnectionManager,
    },
}

impl RevocationStore {
    pub fn new_memory() -> Self {
        Self::Memory {
            entries: Arc::new(DashMap::new()),
        }
    }

    pub async fn connect(redis_url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(redis_url)?;
        let manager = redis::aio::ConnectionManager::new(client).await?;

        info!("Redis connection established for the refresh-token blacklist");

        Ok(Self::Redis { manager })
    }

    /// Blacklist the subject's current refresh token for `ttl_secs` seconds.
    ///
    /// Overwrites any prior entry for the subject and resets its TTL.
    pub async fn mark_revoked(
        &self,
        user_id: &str,
        refresh_token: &str,
        ttl_secs: i64,
    ) -> Result<()> {
        match self {
            Self::Memory { entries } => {
                entries.insert(
                    user_id.to_string(),
                    RevokedEntry {
                        refresh_token: refresh_token.to_string(),
                        expires_at: Utc::now() + Duration::seconds(ttl_secs),
                    },
                );
            }
            Self::Redis { manager } => {
                let mut conn = manager.clone();
                // SET then EXPIRE, per the wire contract
                let _: () = conn.set(user_id, refresh_token).await?;
                let _: () = conn.expire(user_id, ttl_secs).await?;
            }
        }
        Ok(())
    }

    /// The revoked refresh token currently held for the subject, if any
    pub async fn revoked_token(&self, user_id: &str) -> Result<Option<String>> {
        match self {
            Self::Memory { entries } => {
                if let Some(entry) = entries.get(user_id) {
                    if entry.expires_at > Utc::now() {
                        return Ok(Some(entry.refresh_token.clone()));
                    }
                }
                // Lapsed entries are dropped lazily
                entries.remove_if(user_id, |_, entry| entry.expires_at <= Utc::now());
                Ok(None)
            }
            Self::Redis { manager } => {
                let mut conn = manager.clone();
                let value: Option<String> = conn.get(user_id).await?;
                Ok(value)
            }
        }
    }

    pub async fn is_revoked(&self, user_id: &str) -> Result<bool> {
        Ok(self.revoked_token(user_id).await?.is_some())
    }

    /// Remove the subject's blacklist entry, reinstating its refresh capability
    pub async fn clear_revoked(&self, user_id: &str) -> Result<()> {
        match self {
            Self::Memory { entries } => {
                entries.remove(user_id);
            }
            Self::Redis { manager } => {
                let mut conn = manager.clone();
                let _: () = conn.del(user_id).await?;
            }
        }
        Ok(())
    }
}
