//! Key/value store contract and SQLite implementation.
//!
//! # Responsibility
//! - Mirror the on-device storage API: string keys to JSON-string values.
//! - Provide typed JSON read/write helpers on top of raw strings.
//!
//! # Invariants
//! - `set_item` replaces any previous value for the key.
//! - Removing a missing key is not an error.
//! - Stored values that fail to decode surface as `RepoError::Decode`
//!   instead of being silently dropped.

use crate::db::DbError;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage-level error for key/value persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Value could not be serialized before writing `key`.
    Encode {
        key: String,
        source: serde_json::Error,
    },
    /// Stored value under `key` is not valid for the expected type.
    Decode {
        key: String,
        source: serde_json::Error,
    },
    /// Stored value decodes but violates a domain invariant.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode { key, source } => write!(f, "failed to encode `{key}`: {source}"),
            Self::Decode { key, source } => {
                write!(f, "invalid stored value for `{key}`: {source}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Device-style key/value storage.
pub trait KvStore {
    fn get_item(&self, key: &str) -> RepoResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> RepoResult<()>;
    fn remove_item(&self, key: &str) -> RepoResult<()>;
    /// All keys, sorted ascending.
    fn get_all_keys(&self) -> RepoResult<Vec<String>>;
    fn multi_remove(&self, keys: &[String]) -> RepoResult<()>;

    /// Removes every key.
    fn clear(&self) -> RepoResult<()> {
        let keys = self.get_all_keys()?;
        self.multi_remove(&keys)
    }

    /// Reads and decodes a JSON value.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> RepoResult<Option<T>> {
        match self.get_item(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| RepoError::Decode {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Encodes and writes a JSON value.
    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> RepoResult<()> {
        let raw = serde_json::to_string(value).map_err(|source| RepoError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.set_item(key, &raw)
    }
}

/// SQLite-backed key/value store over the `kv_entries` table.
#[derive(Clone, Copy)]
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl KvStore for SqliteKvStore<'_> {
    fn get_item(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }

    fn get_all_keys(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv_entries ORDER BY key ASC;")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    fn multi_remove(&self, keys: &[String]) -> RepoResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let placeholders = vec!["?"; keys.len()].join(", ");
        self.conn.execute(
            &format!("DELETE FROM kv_entries WHERE key IN ({placeholders});"),
            params_from_iter(keys.iter()),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KvStore, RepoError, SqliteKvStore};
    use crate::db::open_db_in_memory;

    #[test]
    fn set_get_and_overwrite() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteKvStore::new(&conn);

        assert_eq!(store.get_item("k").unwrap(), None);
        store.set_item("k", "one").unwrap();
        store.set_item("k", "two").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn remove_missing_key_is_ok() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteKvStore::new(&conn);
        store.remove_item("missing").unwrap();
    }

    #[test]
    fn clear_removes_every_key() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteKvStore::new(&conn);
        store.set_item("b", "1").unwrap();
        store.set_item("a", "2").unwrap();
        assert_eq!(store.get_all_keys().unwrap(), vec!["a", "b"]);

        store.clear().unwrap();
        assert!(store.get_all_keys().unwrap().is_empty());
    }

    #[test]
    fn get_json_reports_decode_errors_with_key() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteKvStore::new(&conn);
        store.set_item("numbers", "not json").unwrap();

        let err = store.get_json::<Vec<u32>>("numbers").unwrap_err();
        assert!(matches!(err, RepoError::Decode { ref key, .. } if key == "numbers"));
    }
}
