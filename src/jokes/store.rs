//! Joke Storage

use anyhow::{Context, Result};
use chrono::Utc;
use rand::Rng;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A joke
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Joke {
    pub id: Uuid,
    pub name: String,
    pub content: String,
    pub jokester_id: Uuid,
    pub created_at: String,
}

/// Listing entry: id and name only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JokeListItem {
    pub id: Uuid,
    pub name: String,
}

/// Joke storage with SQLite backend
pub struct JokeStore {
    db_path: String,
}

impl JokeStore {
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
            "CREATE TABLE IF NOT EXISTS jokes (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                content TEXT NOT NULL,
                jokester_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// The most recently created jokes, id and name only
    pub fn list_latest(&self, limit: usize) -> Result<Vec<JokeListItem>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, name FROM jokes ORDER BY created_at DESC LIMIT ?1",
        )?;

        let items = stmt
            .query_map(params![limit as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|(id, name)| {
                Ok(JokeListItem {
                    id: Uuid::parse_str(&id).context("Corrupt joke id in database")?,
                    name,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(items)
    }

    /// A uniformly random joke, or None when the table is empty
    pub fn random(&self) -> Result<Option<Joke>> {
        let conn = Connection::open(&self.db_path)?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM jokes", [], |row| row.get(0))?;
        if count == 0 {
            return Ok(None);
        }

        let offset = rand::thread_rng().gen_range(0..count);
        let mut stmt = conn.prepare(
            "SELECT id, name, content, jokester_id, created_at
             FROM jokes LIMIT 1 OFFSET ?1",
        )?;

        let joke = stmt.query_row(params![offset], row_to_joke)?;
        Ok(Some(joke.into_joke()?))
    }

    pub fn get(&self, id: &Uuid) -> Result<Option<Joke>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, name, content, jokester_id, created_at
             FROM jokes WHERE id = ?1",
        )?;

        match stmt.query_row(params![id.to_string()], row_to_joke) {
            Ok(raw) => Ok(Some(raw.into_joke()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn create(&self, name: &str, content: &str, jokester_id: &Uuid) -> Result<Joke> {
        let joke = Joke {
            id: Uuid::new_v4(),
            name: name.to_string(),
            content: content.to_string(),
            jokester_id: *jokester_id,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO jokes (id, name, content, jokester_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                joke.id.to_string(),
                joke.name,
                joke.content,
                joke.jokester_id.to_string(),
                joke.created_at,
            ],
        )
        .context("Failed to insert joke")?;

        Ok(joke)
    }

    pub fn delete(&self, id: &Uuid) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        let rows_affected =
            conn.execute("DELETE FROM jokes WHERE id = ?1", params![id.to_string()])?;

        if rows_affected == 0 {
            anyhow::bail!("Joke not found");
        }

        Ok(())
    }
}

struct RawJoke {
    id: String,
    name: String,
    content: String,
    jokester_id: String,
    created_at: String,
}

impl RawJoke {
    fn into_joke(self) -> Result<Joke> {
        Ok(Joke {
            id: Uuid::parse_str(&self.id).context("Corrupt joke id in database")?,
            name: self.name,
            content: self.content,
            jokester_id: Uuid::parse_str(&self.jokester_id)
                .context("Corrupt jokester id in database")?,
            created_at: self.created_at,
        })
    }
}

fn row_to_joke(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawJoke> {
    Ok(RawJoke {
        id: row.get(0)?,
        name: row.get(1)?,
        content: row.get(2)?,
        jokester_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (JokeStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let store = JokeStore::new(temp_file.path().to_str().unwrap()).unwrap();
        (store, temp_file)
    }

    #[test]
    fn test_create_get_delete() {
        let (store, _temp) = create_test_store();
        let jokester = Uuid::new_v4();

        let joke = store.create("Road worker", "I used to...", &jokester).unwrap();
        let fetched = store.get(&joke.id).unwrap().unwrap();
        assert_eq!(fetched.name, "Road worker");
        assert_eq!(fetched.jokester_id, jokester);

        store.delete(&joke.id).unwrap();
        assert!(store.get(&joke.id).unwrap().is_none());
        assert!(store.delete(&joke.id).is_err());
    }

    #[test]
    fn test_list_latest_caps_results() {
        let (store, _temp) = create_test_store();
        let jokester = Uuid::new_v4();

        for i in 0..8 {
            store
                .create(&format!("joke-{}", i), "content", &jokester)
                .unwrap();
        }

        let items = store.list_latest(5).unwrap();
        assert_eq!(items.len(), 5);
    }

    #[test]
    fn test_random_on_empty_table() {
        let (store, _temp) = create_test_store();
        assert!(store.random().unwrap().is_none());
    }

    #[test]
    fn test_random_returns_a_joke() {
        let (store, _temp) = create_test_store();
        let jokester = Uuid::new_v4();
        store.create("only one", "content", &jokester).unwrap();

        let joke = store.random().unwrap().unwrap();
        assert_eq!(joke.name, "only one");
    }
}
