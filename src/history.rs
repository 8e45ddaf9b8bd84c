// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Historical balances rebuilt from the transaction log.
//!
//! Everything here reads inside a single snapshot and never writes.

use crate::db::Ledger;
use crate::delta::{delta_for, net_change};
use crate::engine::load_account;
use crate::errors::{LedgerError, LedgerResult};
use crate::models::{AccountId, Transaction};
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;

/// Inclusive calendar-day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> LedgerResult<Self> {
        if from > to {
            return Err(LedgerError::InvalidDateRange { from, to });
        }
        Ok(DateRange { from, to })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// End-of-day balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalancePoint {
    pub date: NaiveDate,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub account: AccountId,
    pub stored: Decimal,
    pub replayed: Decimal,
}

impl Reconciliation {
    pub fn is_consistent(&self) -> bool {
        self.stored == self.replayed
    }
}

/// Daily series over `window` for an account whose balance is `current` today
/// and whose full history is `history`, sorted by time.
///
/// The balance entering the window is backed out of `current` by removing every
/// delta dated on or after `window.from`; days are then walked forward.
pub fn series_from(
    current: Decimal,
    account: AccountId,
    history: &[Transaction],
    window: DateRange,
) -> Vec<BalancePoint> {
    let since_start = net_change(
        history
            .iter()
            .filter(|t| t.occurred_at.date() >= window.from),
        account,
    );
    let mut running = current - since_start;

    let mut in_window = history
        .iter()
        .filter(|t| window.contains(t.occurred_at.date()))
        .peekable();
    let mut out = Vec::new();
    for day in window.from.iter_days().take_while(|d| *d <= window.to) {
        while let Some(t) = in_window.next_if(|t| t.occurred_at.date() == day) {
            running += delta_for(t, account);
        }
        out.push(BalancePoint {
            date: day,
            balance: running,
        });
    }
    out
}

/// Every transaction where `account` is source or counter-account, oldest first.
pub(crate) fn account_history(
    conn: &Connection,
    account: AccountId,
) -> LedgerResult<Vec<Transaction>> {
    let sql = format!(
        "SELECT {} FROM transactions
         WHERE account_id=?1 OR counter_account_id=?1
         ORDER BY occurred_at, id",
        Transaction::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![account], Transaction::from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn reconcile_in(conn: &Connection, account: AccountId) -> LedgerResult<Reconciliation> {
    let acct = load_account(conn, account)?;
    let history = account_history(conn, account)?;
    Ok(Reconciliation {
        account,
        stored: acct.balance,
        replayed: net_change(&history, account),
    })
}

impl Ledger {
    /// Daily balances over `range`, or over the span of the account's history
    /// when no range is given. Empty when the account has no transactions.
    pub fn balance_series(
        &self,
        account: AccountId,
        range: Option<DateRange>,
    ) -> LedgerResult<Vec<BalancePoint>> {
        self.read(|conn| {
            let acct = load_account(conn, account)?;
            let history = account_history(conn, account)?;
            let (first, last) = match (history.first(), history.last()) {
                (Some(f), Some(l)) => (f.occurred_at.date(), l.occurred_at.date()),
                _ => return Ok(Vec::new()),
            };
            let window = match range {
                Some(r) => r,
                None => DateRange::new(first, last)?,
            };
            Ok(series_from(acct.balance, account, &history, window))
        })
    }

    /// Balance at the end of `date`.
    pub fn balance_at(&self, account: AccountId, date: NaiveDate) -> LedgerResult<Decimal> {
        self.read(|conn| {
            let acct = load_account(conn, account)?;
            let history = account_history(conn, account)?;
            let later = net_change(
                history.iter().filter(|t| t.occurred_at.date() > date),
                account,
            );
            Ok(acct.balance - later)
        })
    }

    pub fn current_balance(&self, account: AccountId) -> LedgerResult<Decimal> {
        self.read(|conn| Ok(load_account(conn, account)?.balance))
    }

    /// Balance obtained by replaying the whole history from zero.
    pub fn replay_from_zero(&self, account: AccountId) -> LedgerResult<Decimal> {
        self.read(|conn| {
            load_account(conn, account)?;
            let history = account_history(conn, account)?;
            Ok(net_change(&history, account))
        })
    }

    pub fn reconcile(&self, account: AccountId) -> LedgerResult<Reconciliation> {
        self.read(|conn| reconcile_in(conn, account))
    }

    pub fn reconcile_all(&self) -> LedgerResult<Vec<Reconciliation>> {
        self.read(|conn| {
            let mut stmt = conn.prepare("SELECT id FROM accounts ORDER BY id")?;
            let ids = stmt
                .query_map([], |r| r.get::<_, AccountId>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            ids.into_iter().map(|id| reconcile_in(conn, id)).collect()
        })
    }
}
