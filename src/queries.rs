// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-side joins for listings, reports and exports. Nothing here writes.

use crate::db::Ledger;
use crate::engine::load_account;
use crate::errors::LedgerResult;
use crate::models::{Account, AccountId, CategoryId, Transaction, TransactionId, TransactionType, UserId};
use chrono::{Datelike, NaiveDate};
use rusqlite::{OptionalExtension, params, params_from_iter};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Filters for transaction listings. Unset fields do not restrict.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Matches the account on either side of a transfer.
    pub account: Option<AccountId>,
    pub owner: Option<UserId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category: Option<CategoryId>,
    pub kind: Option<TransactionType>,
    /// Substring of the description or external recipient.
    pub search: Option<String>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub limit: Option<usize>,
    pub offset: usize,
}

/// Transaction with the names a listing shows next to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub account_name: String,
    pub counter_account_name: Option<String>,
    pub category_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountView {
    #[serde(flatten)]
    pub account: Account,
    pub account_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category_id: CategoryId,
    pub category: String,
    pub total: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    pub month: u32,
    pub income: Decimal,
    pub expense: Decimal,
}

impl Ledger {
    pub fn get_account(&self, id: AccountId) -> LedgerResult<Account> {
        self.read(|conn| load_account(conn, id))
    }

    pub fn accounts(
        &self,
        owner: Option<UserId>,
        include_inactive: bool,
    ) -> LedgerResult<Vec<AccountView>> {
        self.read(|conn| {
            let mut stmt = conn.prepare(
                "SELECT a.id, a.user_id, a.account_type_id, a.name, a.account_number, a.balance,
                        a.is_active, a.created_at, t.name
                 FROM accounts a JOIN account_types t ON a.account_type_id=t.id
                 WHERE (?1 IS NULL OR a.user_id=?1) AND (?2 OR a.is_active=1)
                 ORDER BY a.user_id, a.name",
            )?;
            let rows = stmt.query_map(params![owner, include_inactive], |r| {
                Ok(AccountView {
                    account: Account::from_row(r)?,
                    account_type: r.get(8)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    pub fn get_transaction(&self, id: TransactionId) -> LedgerResult<Option<Transaction>> {
        self.read(|conn| {
            let sql = format!(
                "SELECT {} FROM transactions WHERE id=?1",
                Transaction::COLUMNS
            );
            Ok(conn
                .query_row(&sql, params![id], Transaction::from_row)
                .optional()?)
        })
    }

    pub fn transaction_count(&self) -> LedgerResult<i64> {
        self.read(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))?)
        })
    }

    /// Newest first. Amount bounds, limit and offset are applied after decoding
    /// because amounts are stored as decimal text.
    pub fn list_transactions(&self, f: &TransactionFilter) -> LedgerResult<Vec<TransactionView>> {
        let mut sql = String::from(
            "SELECT t.id, t.account_id, t.counter_account_id, t.external_recipient, t.category_id,
                    t.amount, t.kind, t.description, t.created_by, t.occurred_at,
                    a.name, ca.name, c.name
             FROM transactions t
             JOIN accounts a ON t.account_id=a.id
             LEFT JOIN accounts ca ON t.counter_account_id=ca.id
             LEFT JOIN categories c ON t.category_id=c.id
             WHERE 1=1",
        );
        let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(acct) = f.account {
            sql.push_str(" AND (t.account_id=? OR t.counter_account_id=?)");
            args.push(Box::new(acct));
            args.push(Box::new(acct));
        }
        if let Some(owner) = f.owner {
            sql.push_str(" AND (a.user_id=? OR ca.user_id=?)");
            args.push(Box::new(owner));
            args.push(Box::new(owner));
        }
        if let Some(from) = f.from {
            sql.push_str(" AND substr(t.occurred_at,1,10)>=?");
            args.push(Box::new(from.to_string()));
        }
        if let Some(to) = f.to {
            sql.push_str(" AND substr(t.occurred_at,1,10)<=?");
            args.push(Box::new(to.to_string()));
        }
        if let Some(cat) = f.category {
            sql.push_str(" AND t.category_id=?");
            args.push(Box::new(cat));
        }
        if let Some(kind) = f.kind {
            sql.push_str(" AND t.kind=?");
            args.push(Box::new(kind));
        }
        if let Some(term) = f.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            sql.push_str(" AND (t.description LIKE ? OR t.external_recipient LIKE ?)");
            let pattern = format!("%{}%", term);
            args.push(Box::new(pattern.clone()));
            args.push(Box::new(pattern));
        }
        sql.push_str(" ORDER BY t.occurred_at DESC, t.id DESC");

        let rows = self.read(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(args.iter()), |r| {
                Ok(TransactionView {
                    transaction: Transaction::from_row(r)?,
                    account_name: r.get(10)?,
                    counter_account_name: r.get(11)?,
                    category_name: r.get(12)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })?;

        let limit = f.limit.unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .filter(|v| f.min_amount.is_none_or(|min| v.transaction.amount >= min))
            .filter(|v| f.max_amount.is_none_or(|max| v.transaction.amount <= max))
            .skip(f.offset)
            .take(limit)
            .collect())
    }

    /// Sum of balances across an owner's active accounts.
    pub fn total_balance_for_user(&self, owner: UserId) -> LedgerResult<Decimal> {
        Ok(self
            .accounts(Some(owner), false)?
            .iter()
            .map(|v| v.account.balance)
            .sum())
    }

    /// Totals per category for transactions sourced from the owner's active
    /// accounts, largest first.
    pub fn spending_by_category(
        &self,
        owner: UserId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        is_expense: bool,
    ) -> LedgerResult<Vec<CategoryTotal>> {
        let rows = self.read(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.name, t.amount
                 FROM transactions t
                 JOIN accounts a ON t.account_id=a.id
                 JOIN categories c ON t.category_id=c.id
                 WHERE a.user_id=?1 AND a.is_active=1 AND c.is_expense=?2
                   AND (?3 IS NULL OR substr(t.occurred_at,1,10)>=?3)
                   AND (?4 IS NULL OR substr(t.occurred_at,1,10)<=?4)",
            )?;
            let rows = stmt.query_map(
                params![
                    owner,
                    is_expense,
                    from.map(|d| d.to_string()),
                    to.map(|d| d.to_string())
                ],
                |r| {
                    Ok((
                        r.get::<_, CategoryId>(0)?,
                        r.get::<_, String>(1)?,
                        crate::models::decimal_column(r, 2)?,
                    ))
                },
            )?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })?;

        let mut agg: BTreeMap<CategoryId, CategoryTotal> = BTreeMap::new();
        for (id, name, amount) in rows {
            let entry = agg.entry(id).or_insert_with(|| CategoryTotal {
                category_id: id,
                category: name,
                total: Decimal::ZERO,
                count: 0,
            });
            entry.total += amount;
            entry.count += 1;
        }
        let mut out: Vec<CategoryTotal> = agg.into_values().collect();
        out.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
        Ok(out)
    }

    /// Income and expense per month of `year`, split by the category's expense
    /// flag. Uncategorized transactions are not counted.
    pub fn monthly_summary(&self, owner: UserId, year: i32) -> LedgerResult<Vec<MonthSummary>> {
        let rows = self.read(|conn| {
            let mut stmt = conn.prepare(
                "SELECT t.occurred_at, t.amount, c.is_expense
                 FROM transactions t
                 JOIN accounts a ON t.account_id=a.id
                 JOIN categories c ON t.category_id=c.id
                 WHERE a.user_id=?1 AND a.is_active=1 AND substr(t.occurred_at,1,4)=?2",
            )?;
            let rows = stmt.query_map(params![owner, format!("{:04}", year)], |r| {
                Ok((
                    r.get::<_, chrono::NaiveDateTime>(0)?,
                    crate::models::decimal_column(r, 1)?,
                    r.get::<_, bool>(2)?,
                ))
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })?;

        let mut months: BTreeMap<u32, (Decimal, Decimal)> = BTreeMap::new();
        for (at, amount, is_expense) in rows {
            let entry = months
                .entry(at.month())
                .or_insert((Decimal::ZERO, Decimal::ZERO));
            if is_expense {
                entry.1 += amount;
            } else {
                entry.0 += amount;
            }
        }
        Ok(months
            .into_iter()
            .map(|(month, (income, expense))| MonthSummary {
                month,
                income,
                expense,
            })
            .collect())
    }
}
