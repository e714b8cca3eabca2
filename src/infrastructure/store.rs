//! # Record Store
//!
//! SQLite persistence for quotes, weather locations and the message archive.
//!
//! - Owns a single connection behind a mutex: every call holds the lock for its whole
//!   duration, so writers are serialised against each other and against readers.
//! - Quote ids are assigned inside the locked write as the current row count, which keeps
//!   them dense from 0 and makes "random integer in `[0, count)`" a valid sample.
//! - Weather locations are keyed by username and written with an atomic upsert.

use chrono::{DateTime, TimeZone, Utc};
use rand::Rng;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::domain::error::{BotError, BotResult};
use crate::domain::types::{LoggedMessage, Quote, TimestampPrecision, WeatherLocation};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS quotes (
      id            INTEGER PRIMARY KEY,
      username      TEXT NOT NULL,
      text          TEXT NOT NULL,
      submitted_at  INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS weather_locations (
      username  TEXT PRIMARY KEY,
      city      TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS logged_messages (
      id        INTEGER PRIMARY KEY AUTOINCREMENT,
      channel   TEXT NOT NULL,
      username  TEXT NOT NULL,
      message   TEXT NOT NULL,
      sent_at   INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_logged_user_time
      ON logged_messages(username, sent_at DESC, id DESC);
"#;

pub struct RecordStore {
    db: Mutex<Connection>,
    precision: TimestampPrecision,
}

impl RecordStore {
    /// Open/create the database file and ensure the schema.
    pub fn open(path: impl AsRef<Path>, precision: TimestampPrecision) -> BotResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| BotError::Storage(e.to_string()))?;
        }

        let db = Connection::open(path)?;
        db.execute_batch("PRAGMA journal_mode = WAL;")?;
        Self::init(db, precision)
    }

    /// In-memory store, used by tests.
    #[cfg(test)]
    pub fn open_in_memory(precision: TimestampPrecision) -> BotResult<Self> {
        Self::init(Connection::open_in_memory()?, precision)
    }

    fn init(db: Connection, precision: TimestampPrecision) -> BotResult<Self> {
        db.execute_batch(SCHEMA)?;
        Ok(Self {
            db: Mutex::new(db),
            precision,
        })
    }

    pub fn precision(&self) -> TimestampPrecision {
        self.precision
    }

    fn conn(&self) -> BotResult<MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|_| BotError::Storage("store lock poisoned".to_string()))
    }

    // --- Quotes ---

    /// Append a quote. Never overwrites; returns the new dense id.
    pub fn insert_quote(&self, username: &str, text: &str, at: DateTime<Utc>) -> BotResult<i64> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let id = Self::count(&tx)?;
        tx.execute(
            "INSERT INTO quotes (id, username, text, submitted_at) VALUES (?1, ?2, ?3, ?4)",
            params![id, username, text, at.timestamp()],
        )?;
        tx.commit()?;
        Ok(id)
    }

    pub fn count_quotes(&self) -> BotResult<i64> {
        let conn = self.conn()?;
        Self::count(&conn)
    }

    #[cfg(test)]
    pub fn get_quote(&self, id: i64) -> BotResult<Quote> {
        let conn = self.conn()?;
        Self::quote_by_id(&conn, id)
    }

    /// Count and fetch under one lock acquisition.
    /// Returns `Ok(None)` when there are no quotes.
    pub fn random_quote<R: Rng + ?Sized>(&self, rng: &mut R) -> BotResult<Option<Quote>> {
        let conn = self.conn()?;
        let count = Self::count(&conn)?;
        if count == 0 {
            return Ok(None);
        }
        let id = rng.gen_range(0..count);
        Self::quote_by_id(&conn, id).map(Some)
    }

    fn count(conn: &Connection) -> BotResult<i64> {
        Ok(conn.query_row("SELECT COUNT(*) FROM quotes", [], |row| row.get(0))?)
    }

    fn quote_by_id(conn: &Connection, id: i64) -> BotResult<Quote> {
        conn.query_row(
            "SELECT id, username, text, submitted_at FROM quotes WHERE id = ?1",
            params![id],
            |row| {
                Ok(Quote {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    text: row.get(2)?,
                    submitted_at: from_unix(row.get(3)?),
                })
            },
        )
        .optional()?
        .ok_or_else(|| BotError::NotFound(format!("quote {id}")))
    }

    // --- Weather locations ---

    /// Insert if absent, replace `city` if present.
    pub fn upsert_weather_location(&self, username: &str, city: &str) -> BotResult<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO weather_locations (username, city) VALUES (?1, ?2)
            ON CONFLICT(username) DO UPDATE SET city = excluded.city
            "#,
            params![username, city],
        )?;
        Ok(())
    }

    pub fn get_weather_location(&self, username: &str) -> BotResult<WeatherLocation> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT username, city FROM weather_locations WHERE username = ?1",
            params![username],
            |row| {
                Ok(WeatherLocation {
                    username: row.get(0)?,
                    city: row.get(1)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| BotError::NotFound(format!("weather location for {username}")))
    }

    // --- Message archive ---

    /// Append a chat line; `at` is truncated to the configured precision.
    pub fn append_logged_message(
        &self,
        channel: &str,
        username: &str,
        text: &str,
        at: DateTime<Utc>,
    ) -> BotResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO logged_messages (channel, username, message, sent_at) VALUES (?1, ?2, ?3, ?4)",
            params![channel, username, text, self.precision.truncate(at)],
        )?;
        Ok(())
    }

    /// Latest `sent_at` wins; equal timestamps fall back to the most recently appended.
    pub fn find_most_recent_message_by_user(&self, username: &str) -> BotResult<LoggedMessage> {
        let conn = self.conn()?;
        conn.query_row(
            r#"
            SELECT id, channel, username, message, sent_at FROM logged_messages
            WHERE username = ?1
            ORDER BY sent_at DESC, id DESC
            LIMIT 1
            "#,
            params![username],
            map_logged_message,
        )
        .optional()?
        .ok_or_else(|| BotError::NotFound(format!("messages from {username}")))
    }

    /// Full archive in append order, for the log viewer.
    pub fn all_logged_messages(&self) -> BotResult<Vec<LoggedMessage>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, channel, username, message, sent_at FROM logged_messages ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], map_logged_message)?;
        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }
}

fn map_logged_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<LoggedMessage> {
    Ok(LoggedMessage {
        id: row.get(0)?,
        channel: row.get(1)?,
        username: row.get(2)?,
        message: row.get(3)?,
        sent_at: from_unix(row.get(4)?),
    })
}

fn from_unix(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;
    use tempfile::tempdir;

    fn store() -> RecordStore {
        RecordStore::open_in_memory(TimestampPrecision::Day).unwrap()
    }

    fn at(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_quote_ids_are_dense_from_zero() {
        let store = store();
        for i in 0..5 {
            let id = store.insert_quote("alice", &format!("q{i}"), at(2024, 1, 1, 0)).unwrap();
            assert_eq!(id, i);
        }
        assert_eq!(store.count_quotes().unwrap(), 5);
        for id in 0..5 {
            assert_eq!(store.get_quote(id).unwrap().text, format!("q{id}"));
        }
        assert!(matches!(store.get_quote(5), Err(BotError::NotFound(_))));
    }

    #[test]
    fn test_random_quote_covers_every_id() {
        let store = store();
        for i in 0..4 {
            store.insert_quote("bob", &format!("q{i}"), at(2024, 1, 1, 0)).unwrap();
        }
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let quote = store.random_quote(&mut rng).unwrap().unwrap();
            assert!((0..4).contains(&quote.id));
            seen.insert(quote.id);
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_random_quote_empty_store() {
        let store = store();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(store.random_quote(&mut rng).unwrap().is_none());
    }

    #[test]
    fn test_sampling_stays_consistent_under_concurrent_writers() {
        const WRITERS: i64 = 4;
        const PER_WRITER: i64 = 150;

        let store = Arc::new(store());
        let writers: Vec<_> = (0..WRITERS)
            .map(|w| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..PER_WRITER {
                        store
                            .insert_quote(&format!("writer{w}"), &format!("q{w}-{i}"), at(2024, 1, 1, 0))
                            .unwrap();
                    }
                })
            })
            .collect();

        let reader = {
            let store = store.clone();
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(11);
                let mut failures = 0;
                for _ in 0..1500 {
                    match store.random_quote(&mut rng) {
                        Ok(_) => {}
                        Err(_) => failures += 1,
                    }
                }
                failures
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        assert_eq!(reader.join().unwrap(), 0);

        let total = WRITERS * PER_WRITER;
        assert_eq!(store.count_quotes().unwrap(), total);
        for id in 0..total {
            assert!(store.get_quote(id).is_ok(), "quote {id} missing");
        }
    }

    #[test]
    fn test_upsert_keeps_one_row_per_user() {
        let store = store();
        store.upsert_weather_location("alice", "Paris").unwrap();
        store.upsert_weather_location("alice", "Berlin").unwrap();
        assert_eq!(store.get_weather_location("alice").unwrap().city, "Berlin");

        let conn = store.conn().unwrap();
        let rows: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM weather_locations WHERE username = 'alice'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_missing_weather_location() {
        let store = store();
        assert!(matches!(
            store.get_weather_location("nobody"),
            Err(BotError::NotFound(_))
        ));
    }

    #[test]
    fn test_most_recent_message_by_time() {
        let store = store();
        store.append_logged_message("#a", "carol", "newer", at(2024, 5, 2, 9)).unwrap();
        store.append_logged_message("#a", "carol", "older", at(2024, 5, 1, 9)).unwrap();
        store.append_logged_message("#a", "dave", "other", at(2024, 6, 1, 9)).unwrap();
        let found = store.find_most_recent_message_by_user("carol").unwrap();
        assert_eq!(found.message, "newer");
    }

    #[test]
    fn test_most_recent_message_tie_uses_insert_order() {
        let store = store();
        store.append_logged_message("#a", "carol", "morning", at(2024, 5, 1, 8)).unwrap();
        store.append_logged_message("#a", "carol", "evening", at(2024, 5, 1, 20)).unwrap();
        let found = store.find_most_recent_message_by_user("carol").unwrap();
        assert_eq!(found.message, "evening");
        assert_eq!(found.sent_at, at(2024, 5, 1, 0));
    }

    #[test]
    fn test_second_precision_is_kept() {
        let store = RecordStore::open_in_memory(TimestampPrecision::Second).unwrap();
        store.append_logged_message("#a", "erin", "hi", at(2024, 5, 1, 20)).unwrap();
        let found = store.find_most_recent_message_by_user("erin").unwrap();
        assert_eq!(found.sent_at, at(2024, 5, 1, 20));
    }

    #[test]
    fn test_all_logged_messages_in_append_order() {
        let store = store();
        store.append_logged_message("#a", "x", "one", at(2024, 5, 3, 0)).unwrap();
        store.append_logged_message("#b", "y", "two", at(2024, 5, 1, 0)).unwrap();
        let all = store.all_logged_messages().unwrap();
        let texts: Vec<_> = all.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn test_reopen_file_keeps_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("itsk.db");
        {
            let store = RecordStore::open(&path, TimestampPrecision::Day).unwrap();
            store.insert_quote("alice", "persisted", at(2024, 1, 1, 0)).unwrap();
        }
        let store = RecordStore::open(&path, TimestampPrecision::Day).unwrap();
        assert_eq!(store.count_quotes().unwrap(), 1);
        assert_eq!(store.insert_quote("bob", "next", at(2024, 1, 2, 0)).unwrap(), 1);
    }
}
