use crate::error::{FarmcastError, Result};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Explicitly opened handle to the local history store.
///
/// Cloning shares the underlying connection; `close` ends the lifecycle once
/// the last clone is handed back.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            path: path.to_path_buf(),
        };

        super::migrations::run(&db)?;
        tracing::debug!(path = %path.display(), "Opened history store");

        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            path: PathBuf::from(":memory:"),
        };

        super::migrations::run(&db)?;

        Ok(db)
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|_| FarmcastError::LockPoisoned)?;
        f(&conn)
    }

    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock().map_err(|_| FarmcastError::LockPoisoned)?;
        f(&mut conn)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Close the connection if this is the last handle; otherwise just drop it.
    pub fn close(self) -> Result<()> {
        match Arc::try_unwrap(self.conn) {
            Ok(mutex) => {
                let conn = mutex.into_inner().map_err(|_| FarmcastError::LockPoisoned)?;
                conn.close().map_err(|(_, e)| FarmcastError::Database(e))?;
                tracing::debug!(path = %self.path.display(), "Closed history store");
                Ok(())
            }
            Err(_) => {
                tracing::debug!("History store still shared, deferring close");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_database_runs_migrations() {
        let db = Database::open_in_memory().unwrap();
        let tables: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' \
                     AND name IN ('forecast_snapshots', 'crop_recommendations', 'insight_logs')",
                    [],
                    |row| row.get(0),
                )?)
            })
            .unwrap();
        assert_eq!(tables, 3);
    }

    #[test]
    fn close_with_outstanding_clone_is_deferred() {
        let db = Database::open_in_memory().unwrap();
        let other = db.clone();
        db.close().unwrap();
        assert!(other.with_conn(|_| Ok(())).is_ok());
        other.close().unwrap();
    }
}
