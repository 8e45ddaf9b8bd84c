// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::Ledger;
use crate::engine::Movement;
use crate::errors::LedgerResult;
use crate::models::{Account, AuditId, AuditLogEntry, Transaction, TransactionId, UserId};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

/// Appends the audit record for `tx` inside the caller's open transaction.
///
/// Any error here must abort the caller's unit of work.
pub(crate) fn record(
    conn: &Connection,
    tx: &Transaction,
    actor: UserId,
    details: &str,
) -> rusqlite::Result<AuditId> {
    conn.execute(
        "INSERT INTO audit_log(transaction_id, user_id, action, details, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![tx.id, actor, tx.kind, details, tx.occurred_at],
    )?;
    Ok(AuditId(conn.last_insert_rowid()))
}

/// Human-readable description of a posted movement.
pub fn describe(movement: &Movement<'_>, amount: Decimal, source: &Account) -> String {
    match movement {
        Movement::Deposit => format!(
            "Added {} to account {} (ID: {})",
            amount, source.name, source.id
        ),
        Movement::Withdrawal => format!(
            "Withdrew {} from account {} (ID: {})",
            amount, source.name, source.id
        ),
        Movement::Transfer { target } => format!(
            "Transferred {} from account {} (ID: {}) to account {} (ID: {})",
            amount, source.name, source.id, target.name, target.id
        ),
        Movement::ExternalTransfer { recipient } => format!(
            "Sent {} from account {} (ID: {}) to external recipient: {}",
            amount, source.name, source.id, recipient
        ),
    }
}

impl Ledger {
    pub fn audit_entries_for_transaction(
        &self,
        id: TransactionId,
    ) -> LedgerResult<Vec<AuditLogEntry>> {
        self.read(|conn| {
            let sql = format!(
                "SELECT {} FROM audit_log WHERE transaction_id=?1 ORDER BY id",
                AuditLogEntry::COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![id], AuditLogEntry::from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    /// Most recent entries first, optionally restricted to one acting user.
    pub fn audit_trail(
        &self,
        user: Option<UserId>,
        limit: usize,
    ) -> LedgerResult<Vec<AuditLogEntry>> {
        self.read(|conn| {
            let sql = format!(
                "SELECT {} FROM audit_log WHERE (?1 IS NULL OR user_id=?1)
                 ORDER BY recorded_at DESC, id DESC LIMIT ?2",
                AuditLogEntry::COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let limit = i64::try_from(limit).unwrap_or(i64::MAX);
            let rows = stmt.query_map(params![user, limit], AuditLogEntry::from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    /// Transactions with no audit record. Always empty unless the file was
    /// edited outside the ledger.
    pub fn unaudited_transactions(&self) -> LedgerResult<Vec<TransactionId>> {
        self.read(|conn| {
            let mut stmt = conn.prepare(
                "SELECT t.id FROM transactions t
                 LEFT JOIN audit_log l ON l.transaction_id=t.id
                 WHERE l.id IS NULL ORDER BY t.id",
            )?;
            let rows = stmt.query_map([], |r| r.get(0))?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    pub fn audit_count(&self) -> LedgerResult<i64> {
        self.read(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM audit_log", [], |r| r.get(0))?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountId, AccountTypeId};
    use chrono::NaiveDate;

    fn account(id: i64, name: &str) -> Account {
        Account {
            id: AccountId(id),
            owner_id: UserId(1),
            account_type_id: AccountTypeId(1),
            name: name.into(),
            account_number: None,
            balance: Decimal::ZERO,
            is_active: true,
            created_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn transfer_wording_names_both_accounts() {
        let from = account(3, "Checking");
        let to = account(9, "Savings");
        assert_eq!(
            describe(
                &Movement::Transfer { target: &to },
                Decimal::new(2500, 2),
                &from
            ),
            "Transferred 25.00 from account Checking (ID: 3) to account Savings (ID: 9)"
        );
        assert_eq!(
            describe(
                &Movement::ExternalTransfer { recipient: "ACME-001" },
                Decimal::new(7, 0),
                &from
            ),
            "Sent 7 from account Checking (ID: 3) to external recipient: ACME-001"
        );
    }
}
