//! User Storage
//! Mission: Store credential records in SQLite and verify username/password pairs

use crate::auth::models::User;
use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::info;
use uuid::Uuid;

/// Outcome of a credential check.
///
/// Unknown user and wrong password are reported separately so the API can
/// return the original error messages, but both map to the same status code.
#[derive(Debug)]
pub enum CredentialCheck {
    Valid(User),
    UnknownUser,
    WrongPassword,
}

/// User storage with SQLite backend
pub struct UserStore {
    db_path: String,
}

impl UserStore {
    /// Create a new user store and initialize database
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Get user by username
    pub fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, username, password_hash, created_at
             FROM users WHERE username = ?1",
        )?;

        let user_result = stmt.query_row(params![username], |row| {
            Ok(RawUser {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
                created_at: row.get(3)?,
            })
        });

        match user_result {
            Ok(raw) => Ok(Some(raw.into_user()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get user by subject identifier
    pub fn find_by_id(&self, user_id: &Uuid) -> Result<Option<User>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, username, password_hash, created_at
             FROM users WHERE id = ?1",
        )?;

        let user_result = stmt.query_row(params![user_id.to_string()], |row| {
            Ok(RawUser {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
                created_at: row.get(3)?,
            })
        });

        match user_result {
            Ok(raw) => Ok(Some(raw.into_user()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Check a username/password pair against the stored credential record
    pub fn verify_credentials(&self, username: &str, password: &str) -> Result<CredentialCheck> {
        let Some(user) = self.find_by_username(username)? else {
            return Ok(CredentialCheck::UnknownUser);
        };

        let valid = verify(password, &user.password_hash).context("Failed to verify password")?;
        if valid {
            Ok(CredentialCheck::Valid(user))
        } else {
            Ok(CredentialCheck::WrongPassword)
        }
    }

    /// Create a new user with a freshly hashed password
    pub fn create_user(&self, username: &str, password: &str) -> Result<User> {
        let password_hash = hash(password, DEFAULT_COST).context("Failed to hash password")?;

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO users (id, username, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                user.id.to_string(),
                user.username,
                user.password_hash,
                user.created_at,
            ],
        )
        .context("Failed to insert user")?;

        info!("✅ Created user: {}", user.username);

        Ok(user)
    }
}

struct RawUser {
    id: String,
    username: String,
    password_hash: String,
    created_at: String,
}

impl RawUser {
    fn into_user(self) -> Result<User> {
        Ok(User {
            id: Uuid::parse_str(&self.id).context("Corrupt user id in database")?,
            username: self.username,
            password_hash: self.password_hash,
            created_at: self.created_at,
        })
    }
}
