//! Service layer over `DeskDb`.
//!
//! `DeskService` wraps the raw database handle; all repo methods are
//! implemented as `impl DeskService` blocks under `repos/`.

use tracing::debug;

use crate::DeskDb;
use crate::error::DatabaseError;

/// Entry point for every lookup and mutation the engine performs.
///
/// A task mutation runs as:
/// 1. `begin()` a transaction
/// 2. Repo calls (they share the connection, so they run inside it)
/// 3. `commit()` on success, `rollback()` on the first error
pub struct DeskService {
    db: DeskDb,
}

impl DeskService {
    /// Create a new service over a local database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = DeskDb::open_local(db_path).await?;
        Ok(Self { db })
    }

    /// Create from an existing `DeskDb` (for testing).
    #[must_use]
    pub const fn from_db(db: DeskDb) -> Self {
        Self { db }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &DeskDb {
        &self.db
    }

    /// Open a transaction on the shared connection.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if `BEGIN` fails (e.g. a transaction is
    /// already open).
    pub async fn begin(&self) -> Result<libsql::Transaction, DatabaseError> {
        debug!("begin transaction");
        Ok(self.db.conn().transaction().await?)
    }

    /// Commit a transaction opened with [`Self::begin`].
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if `COMMIT` fails.
    pub async fn commit(&self, tx: libsql::Transaction) -> Result<(), DatabaseError> {
        tx.commit().await?;
        debug!("commit transaction");
        Ok(())
    }

    /// Roll back a transaction opened with [`Self::begin`].
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if `ROLLBACK` fails.
    pub async fn rollback(&self, tx: libsql::Transaction) -> Result<(), DatabaseError> {
        tx.rollback().await?;
        debug!("rollback transaction");
        Ok(())
    }
}
