// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::errors::LedgerResult;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Handle to the ledger database.
///
/// Owns a single connection; every engine operation holds it for the length of
/// one SQLite transaction. Writers open that transaction with `BEGIN IMMEDIATE`
/// so the write lock is taken before any balance is read, which also serializes
/// other processes sharing the file.
pub struct Ledger {
    conn: Mutex<Connection>,
    clock: Arc<dyn Clock>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger").field("path", &self.path).finish()
    }
}

impl Ledger {
    pub fn open(cfg: &StoreConfig) -> Result<Self> {
        if let Some(parent) = cfg.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Create data dir {}", parent.display()))?;
        }
        let mut conn = Connection::open(&cfg.path)
            .with_context(|| format!("Open DB at {}", cfg.path.display()))?;
        conn.busy_timeout(cfg.busy_timeout)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |r| r.get(0))?;
        tracing::debug!(path = %cfg.path.display(), journal_mode = %mode, "opened ledger store");
        init_schema(&mut conn)?;
        Ok(Ledger {
            conn: Mutex::new(conn),
            clock: Arc::new(SystemClock),
            path: Some(cfg.path.clone()),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        init_schema(&mut conn)?;
        Ok(Ledger {
            conn: Mutex::new(conn),
            clock: Arc::new(SystemClock),
            path: None,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-operation drops its rusqlite Transaction, which rolls back,
        // so the connection behind a poisoned lock is still consistent.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Runs `f` inside one `BEGIN IMMEDIATE` transaction; commits on `Ok`,
    /// rolls back on `Err`.
    pub(crate) fn write<T, F>(&self, f: F) -> LedgerResult<T>
    where
        F: FnOnce(&Connection) -> LedgerResult<T>,
    {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    /// Runs `f` inside a deferred transaction so all of its reads see one snapshot.
    pub(crate) fn read<T, F>(&self, f: F) -> LedgerResult<T>
    where
        F: FnOnce(&Connection) -> LedgerResult<T>,
    {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
        let out = f(&tx)?;
        tx.finish()?;
        Ok(out)
    }

    pub fn get_setting(&self, key: &str) -> LedgerResult<Option<String>> {
        self.read(|conn| {
            Ok(conn
                .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
                    r.get(0)
                })
                .optional()?)
        })
    }

    pub fn set_setting(&self, key: &str, value: &str) -> LedgerResult<()> {
        self.write(|conn| {
            conn.execute(
                "INSERT INTO settings(key, value) VALUES(?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value=excluded.value",
                params![key, value],
            )?;
            Ok(())
        })
    }

    pub fn display_currency(&self) -> LedgerResult<String> {
        Ok(self
            .get_setting("display_currency")?
            .unwrap_or_else(|| "USD".to_string()))
    }
}

fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS account_types(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        description TEXT
    );

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        is_expense INTEGER NOT NULL,
        icon TEXT,
        color TEXT,
        parent_id INTEGER,
        FOREIGN KEY(parent_id) REFERENCES categories(id)
    );

    CREATE TABLE IF NOT EXISTS accounts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        account_type_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        account_number TEXT UNIQUE,
        balance TEXT NOT NULL DEFAULT '0',
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        UNIQUE(user_id, name),
        FOREIGN KEY(account_type_id) REFERENCES account_types(id)
    );

    -- amounts are positive decimal text; direction comes from kind
    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        account_id INTEGER NOT NULL,
        counter_account_id INTEGER,
        external_recipient TEXT,
        category_id INTEGER,
        amount TEXT NOT NULL,
        kind TEXT NOT NULL
            CHECK(kind IN ('deposit','withdrawal','transfer','external_transfer')),
        description TEXT,
        created_by INTEGER NOT NULL,
        occurred_at TEXT NOT NULL,
        CHECK(
            (kind = 'transfer'
                AND counter_account_id IS NOT NULL
                AND counter_account_id != account_id
                AND external_recipient IS NULL)
            OR (kind = 'external_transfer'
                AND counter_account_id IS NULL
                AND external_recipient IS NOT NULL
                AND external_recipient != '')
            OR (kind IN ('deposit','withdrawal')
                AND counter_account_id IS NULL
                AND external_recipient IS NULL)
        ),
        FOREIGN KEY(account_id) REFERENCES accounts(id),
        FOREIGN KEY(counter_account_id) REFERENCES accounts(id),
        FOREIGN KEY(category_id) REFERENCES categories(id)
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_account
        ON transactions(account_id, occurred_at);
    CREATE INDEX IF NOT EXISTS idx_transactions_counter
        ON transactions(counter_account_id, occurred_at);

    CREATE TABLE IF NOT EXISTS audit_log(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        transaction_id INTEGER NOT NULL,
        user_id INTEGER NOT NULL,
        action TEXT NOT NULL,
        details TEXT NOT NULL,
        recorded_at TEXT NOT NULL,
        FOREIGN KEY(transaction_id) REFERENCES transactions(id)
    );
    CREATE INDEX IF NOT EXISTS idx_audit_transaction ON audit_log(transaction_id);

    CREATE TRIGGER IF NOT EXISTS transactions_no_update
        BEFORE UPDATE ON transactions
        BEGIN SELECT RAISE(ABORT, 'transactions are append-only'); END;
    CREATE TRIGGER IF NOT EXISTS transactions_no_delete
        BEFORE DELETE ON transactions
        BEGIN SELECT RAISE(ABORT, 'transactions are append-only'); END;
    CREATE TRIGGER IF NOT EXISTS audit_log_no_update
        BEFORE UPDATE ON audit_log
        BEGIN SELECT RAISE(ABORT, 'audit log is append-only'); END;
    CREATE TRIGGER IF NOT EXISTS audit_log_no_delete
        BEFORE DELETE ON audit_log
        BEGIN SELECT RAISE(ABORT, 'audit log is append-only'); END;
    "#,
    )?;
    seed_catalog(conn)?;
    Ok(())
}

const ACCOUNT_TYPES: &[(&str, &str)] = &[
    ("Checking", "Everyday spending account"),
    ("Savings", "Account for saving money with interest"),
    ("Investment", "Account for investing in stocks, bonds, etc."),
    ("Credit Card", "Credit card account with monthly payments"),
];

// (name, is_expense, icon, color)
const CATEGORIES: &[(&str, bool, &str, &str)] = &[
    ("Salary", false, "salary", "#4CAF50"),
    ("Investment", false, "investment", "#8BC34A"),
    ("Gift", false, "gift", "#CDDC39"),
    ("Other Income", false, "other_income", "#FFC107"),
    ("Food & Dining", true, "food", "#F44336"),
    ("Shopping", true, "shopping", "#E91E63"),
    ("Housing", true, "home", "#9C27B0"),
    ("Transportation", true, "car", "#673AB7"),
    ("Entertainment", true, "entertainment", "#3F51B5"),
    ("Health & Fitness", true, "health", "#2196F3"),
    ("Education", true, "education", "#03A9F4"),
    ("Utilities", true, "utilities", "#00BCD4"),
    ("Travel", true, "travel", "#009688"),
    ("Other Expenses", true, "other_expense", "#FF5722"),
];

/// Fills the static catalogs on first open only; later edits are left alone.
fn seed_catalog(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    let types: i64 = tx.query_row("SELECT COUNT(*) FROM account_types", [], |r| r.get(0))?;
    if types == 0 {
        for (name, desc) in ACCOUNT_TYPES {
            tx.execute(
                "INSERT INTO account_types(name, description) VALUES (?1, ?2)",
                params![name, desc],
            )?;
        }
    }
    let cats: i64 = tx.query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))?;
    if cats == 0 {
        for (name, is_expense, icon, color) in CATEGORIES {
            tx.execute(
                "INSERT INTO categories(name, is_expense, icon, color) VALUES (?1, ?2, ?3, ?4)",
                params![name, is_expense, icon, color],
            )?;
        }
    }
    tx.commit()?;
    Ok(())
}
