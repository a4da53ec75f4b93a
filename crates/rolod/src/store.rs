//! Persistent contact store backed by SQLite.
//!
//! Every operation opens its own connection with a bounded busy timeout,
//! runs inside a transaction, and releases the connection on every exit
//! path by scope. Uniqueness is enforced by the table's UNIQUE constraints;
//! violations are classified into typed variants via the driver's extended
//! result code plus a lookup inside the same still-open transaction, never
//! by matching error-message text.

use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Bounded wait for store-level locks, matching the original deployment.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// One phone-book entry. `id` is assigned by the store and never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Contact name '{0}' already exists.")]
    DuplicateName(String),

    #[error("Phone number '{0}' is already assigned to someone else.")]
    DuplicatePhone(String),

    #[error("Contact '{0}' not found.")]
    NotFound(String),

    #[error("Database integrity error.")]
    Integrity,

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Domain outcomes are reported to the caller inside the reply payload;
    /// everything else is an internal failure and stays behind the curtain.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            StoreError::DuplicateName(_)
                | StoreError::DuplicatePhone(_)
                | StoreError::NotFound(_)
                | StoreError::Integrity
        )
    }
}

/// Connection-per-operation contact store. Constructed once and passed by
/// dependency injection; holds no open connection between operations.
pub struct ContactStore {
    db_path: PathBuf,
}

impl ContactStore {
    /// Open the store, creating the database file and schema if absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self { db_path: path.into() };

        if let Some(parent) = store.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        store.init_schema()?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(conn)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS contacts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE NOT NULL,
                phone TEXT UNIQUE NOT NULL
            )",
            [],
        )?;
        info!("contact schema ready at {}", self.db_path.display());
        Ok(())
    }

    /// Insert a new contact. Fails with `DuplicateName` or `DuplicatePhone`
    /// when the corresponding UNIQUE constraint fires.
    pub fn create(&self, name: &str, phone: &str) -> Result<Contact, StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        match tx.execute(
            "INSERT INTO contacts (name, phone) VALUES (?1, ?2)",
            params![name, phone],
        ) {
            Ok(_) => {
                let id = tx.last_insert_rowid();
                tx.commit()?;
                Ok(Contact {
                    id,
                    name: name.to_string(),
                    phone: phone.to_string(),
                })
            }
            Err(err) if is_unique_violation(&err) => Err(classify_unique(&tx, name, phone)),
            Err(err) => Err(err.into()),
        }
    }

    /// Look up one contact by name.
    pub fn read(&self, name: &str) -> Result<Contact, StoreError> {
        let conn = self.connect()?;
        conn.query_row(
            "SELECT id, name, phone FROM contacts WHERE name = ?1",
            [name],
            |row| {
                Ok(Contact {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    phone: row.get(2)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    /// All contacts in insertion order.
    pub fn read_all(&self) -> Result<Vec<Contact>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT id, name, phone FROM contacts ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Contact {
                id: row.get(0)?,
                name: row.get(1)?,
                phone: row.get(2)?,
            })
        })?;

        let mut contacts = Vec::new();
        for row in rows {
            contacts.push(row?);
        }
        Ok(contacts)
    }

    /// Change an existing contact's phone number. `id` and `name` are
    /// preserved. Success is decided by the affected-row count.
    pub fn update(&self, name: &str, new_phone: &str) -> Result<Contact, StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        match tx.execute(
            "UPDATE contacts SET phone = ?1 WHERE name = ?2",
            params![new_phone, name],
        ) {
            Ok(0) => Err(StoreError::NotFound(name.to_string())),
            Ok(_) => {
                let id: i64 =
                    tx.query_row("SELECT id FROM contacts WHERE name = ?1", [name], |row| {
                        row.get(0)
                    })?;
                tx.commit()?;
                Ok(Contact {
                    id,
                    name: name.to_string(),
                    phone: new_phone.to_string(),
                })
            }
            // The only changed column is phone, so a UNIQUE violation here
            // can only be the phone constraint.
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::DuplicatePhone(new_phone.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Remove a contact permanently. Success is decided by the affected-row
    /// count, not by re-reading state.
    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        let conn = self.connect()?;
        let changed = conn.execute("DELETE FROM contacts WHERE name = ?1", [name])?;
        if changed == 0 {
            return Err(StoreError::NotFound(name.to_string()));
        }
        Ok(())
    }

    /// Number of stored contacts.
    pub fn count(&self) -> Result<u64, StoreError> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Decide which uniqueness constraint fired, inside the transaction that
/// observed the violation so no concurrent writer can change the answer.
fn classify_unique(tx: &Transaction<'_>, name: &str, phone: &str) -> StoreError {
    let exists = |sql: &str, value: &str| -> bool {
        tx.query_row(sql, [value], |row| row.get::<_, bool>(0))
            .unwrap_or(false)
    };

    if exists("SELECT EXISTS(SELECT 1 FROM contacts WHERE name = ?1)", name) {
        StoreError::DuplicateName(name.to_string())
    } else if exists("SELECT EXISTS(SELECT 1 FROM contacts WHERE phone = ?1)", phone) {
        StoreError::DuplicatePhone(phone.to_string())
    } else {
        StoreError::Integrity
    }
}
