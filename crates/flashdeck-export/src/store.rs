//! Embedded database engine behind the package builder.
//!
//! [`CollectionEngine`] opens a fresh [`CollectionStore`] per build. The
//! builder never touches SQLite directly, which keeps the release discipline
//! in one place ([`StoreGuard`]) and lets tests substitute a recording store.

use std::ops::{Deref, DerefMut};

use rusqlite::{Connection, MAIN_DB};
use tracing::{debug, warn};

use crate::collection::{CardRow, CollectionRow, NoteRow};
use crate::error::{Error, Result};

/// Opens database stores.
pub trait CollectionEngine {
    /// Store type produced by this engine.
    type Store: CollectionStore;

    /// Open an empty store.
    ///
    /// Failures should be reported as [`Error::EngineUnavailable`].
    fn open(&self) -> Result<Self::Store>;
}

/// An open collection database.
pub trait CollectionStore {
    /// Execute the schema DDL.
    fn create_schema(&mut self, ddl: &str) -> Result<()>;

    /// Insert the `col` row.
    fn insert_collection(&mut self, col: &CollectionRow) -> Result<()>;

    /// Insert one note.
    fn insert_note(&mut self, note: &NoteRow) -> Result<()>;

    /// Insert one card.
    fn insert_card(&mut self, card: &CardRow) -> Result<()>;

    /// Serialize the database to its on-disk form.
    fn to_bytes(&mut self) -> Result<Vec<u8>>;

    /// Close the store and free everything it holds.
    fn release(self) -> Result<()>;
}

/// Owns an open store and releases it exactly once when dropped.
///
/// Dropping covers every exit from a build: success, `?` propagation,
/// cancellation and unwinding.
pub struct StoreGuard<S: CollectionStore> {
    store: Option<S>,
}

impl<S: CollectionStore> StoreGuard<S> {
    /// Take ownership of an open store.
    pub fn new(store: S) -> Self {
        Self { store: Some(store) }
    }
}

impl<S: CollectionStore> Deref for StoreGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        // Only `drop` empties the option.
        self.store.as_ref().expect("store already released")
    }
}

impl<S: CollectionStore> DerefMut for StoreGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        self.store.as_mut().expect("store already released")
    }
}

impl<S: CollectionStore> Drop for StoreGuard<S> {
    fn drop(&mut self) {
        if let Some(store) = self.store.take() {
            if let Err(e) = store.release() {
                warn!(error = %e, "Failed to release export database");
            }
        }
    }
}

/// SQLite engine holding each collection in memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteEngine;

impl CollectionEngine for SqliteEngine {
    type Store = SqliteStore;

    fn open(&self) -> Result<SqliteStore> {
        SqliteStore::open().map_err(|e| Error::EngineUnavailable(Box::new(e)))
    }
}

/// An in-memory SQLite collection.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    fn open() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        debug!("Opened export database");
        Ok(Self { conn })
    }
}

impl CollectionStore for SqliteStore {
    fn create_schema(&mut self, ddl: &str) -> Result<()> {
        self.conn.execute_batch(ddl)?;
        Ok(())
    }

    fn insert_collection(&mut self, col: &CollectionRow) -> Result<()> {
        self.conn.execute(
            "INSERT INTO col (id, crt, mod, scm, ver, dty, usn, ls, conf, models, decks, dconf, tags)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                col.id,
                col.crt,
                col.modified,
                col.scm,
                col.ver,
                col.dty,
                col.usn,
                col.ls,
                col.conf,
                col.models,
                col.decks,
                col.dconf,
                col.tags
            ],
        )?;
        Ok(())
    }

    fn insert_note(&mut self, note: &NoteRow) -> Result<()> {
        self.conn
            .prepare_cached(
                "INSERT INTO notes (id, guid, mid, mod, usn, tags, flds, sfld, csum, flags, data)
                 VALUES (?, ?, ?, ?, -1, ?, ?, ?, ?, 0, '')",
            )?
            .execute(rusqlite::params![
                note.id,
                note.guid,
                note.mid,
                note.modified,
                note.tags,
                note.flds,
                note.sfld,
                note.csum
            ])?;
        Ok(())
    }

    fn insert_card(&mut self, card: &CardRow) -> Result<()> {
        self.conn
            .prepare_cached(
                "INSERT INTO cards (id, nid, did, ord, mod, usn, type, queue, due, ivl, factor, reps, lapses, left, odue, odid, flags, data)
                 VALUES (?, ?, ?, ?, ?, -1, 0, 0, ?, 0, 0, 0, 0, 0, 0, 0, 0, '')",
            )?
            .execute(rusqlite::params![
                card.id,
                card.nid,
                card.did,
                card.ord,
                card.modified,
                card.due
            ])?;
        Ok(())
    }

    fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let data = self.conn.serialize(MAIN_DB)?;
        Ok(data.to_vec())
    }

    fn release(self) -> Result<()> {
        if let Err((_conn, e)) = self.conn.close() {
            return Err(e.into());
        }
        debug!("Released export database");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::SCHEMA;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStore {
        released: Arc<AtomicUsize>,
    }

    impl CollectionStore for CountingStore {
        fn create_schema(&mut self, _ddl: &str) -> Result<()> {
            Ok(())
        }
        fn insert_collection(&mut self, _col: &CollectionRow) -> Result<()> {
            Ok(())
        }
        fn insert_note(&mut self, _note: &NoteRow) -> Result<()> {
            Ok(())
        }
        fn insert_card(&mut self, _card: &CardRow) -> Result<()> {
            Ok(())
        }
        fn to_bytes(&mut self) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
        fn release(self) -> Result<()> {
            self.released.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_guard_releases_once_on_drop() {
        let released = Arc::new(AtomicUsize::new(0));
        {
            let mut guard = StoreGuard::new(CountingStore {
                released: released.clone(),
            });
            guard.create_schema("").unwrap();
        }
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_guard_releases_on_early_return() {
        fn fails(released: Arc<AtomicUsize>) -> Result<()> {
            let _guard = StoreGuard::new(CountingStore { released });
            Err(Error::Cancelled)
        }

        let released = Arc::new(AtomicUsize::new(0));
        assert!(fails(released.clone()).is_err());
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sqlite_store_round_trip() {
        let mut store = SqliteEngine.open().unwrap();
        store.create_schema(SCHEMA).unwrap();
        store
            .insert_collection(&CollectionRow::new("Deck", 1, 2, 1_700_000_000_000))
            .unwrap();

        let bytes = store.to_bytes().unwrap();
        assert!(bytes.starts_with(b"SQLite format 3\0"));
        store.release().unwrap();

        // The serialized image opens as a standalone database.
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("collection.anki2");
        std::fs::write(&path, &bytes).unwrap();
        let conn = rusqlite::Connection::open(&path).unwrap();
        let ver: i64 = conn
            .query_row("SELECT ver FROM col", [], |row| row.get(0))
            .unwrap();
        assert_eq!(ver, 11);
    }
}
