// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Balance-changing operations.
//!
//! Every public operation here is one `BEGIN IMMEDIATE` unit: validate, write the
//! balance row(s), insert the transaction row, append the audit entry, commit.
//! Validation happens after the write lock is held and before the first write,
//! in this order: account existence, same-account, category, amount, recipient,
//! funds.

use crate::audit;
use crate::db::Ledger;
use crate::delta::{Role, signed_delta};
use crate::errors::{LedgerError, LedgerResult};
use crate::models::{
    Account, AccountId, CategoryId, NewAccount, Transaction, TransactionId, TransactionType,
    UserId,
};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use std::fmt::Display;

/// Currency scale of stored amounts.
pub const AMOUNT_SCALE: u32 = 2;

/// Largest amount or balance the ledger holds: 9,999,999,999,999.99, the
/// range of a `DECIMAL(15,2)` column.
pub const MAX_AMOUNT: Decimal =
    Decimal::from_parts(2_764_472_319, 232_830, 0, false, AMOUNT_SCALE);

pub const INITIAL_DEPOSIT_DESCRIPTION: &str = "Initial deposit";

/// Rejects non-positive amounts, amounts finer than a cent and amounts above
/// [`MAX_AMOUNT`].
pub fn validate_amount(amount: Decimal) -> LedgerResult<()> {
    if amount <= Decimal::ZERO
        || amount > MAX_AMOUNT
        || amount.normalize().scale() > AMOUNT_SCALE
    {
        return Err(LedgerError::InvalidAmount { amount });
    }
    Ok(())
}

/// `balance + delta`, kept within `0..=MAX_AMOUNT`.
fn apply_delta(balance: Decimal, delta: Decimal, amount: Decimal) -> LedgerResult<Decimal> {
    balance
        .checked_add(delta)
        .filter(|b| *b <= MAX_AMOUNT)
        .ok_or(LedgerError::InvalidAmount { amount })
}

pub(crate) fn load_account(conn: &Connection, id: AccountId) -> LedgerResult<Account> {
    let sql = format!("SELECT {} FROM accounts WHERE id=?1", Account::COLUMNS);
    conn.query_row(&sql, params![id], Account::from_row)
        .optional()?
        .ok_or(LedgerError::AccountNotFound(id))
}

fn load_active(conn: &Connection, id: AccountId) -> LedgerResult<Account> {
    let acct = load_account(conn, id)?;
    if !acct.is_active {
        return Err(LedgerError::AccountInactive(id));
    }
    Ok(acct)
}

fn ensure_category(conn: &Connection, category: Option<CategoryId>) -> LedgerResult<()> {
    if let Some(id) = category {
        let found: Option<i64> = conn
            .query_row("SELECT 1 FROM categories WHERE id=?1", params![id], |r| {
                r.get(0)
            })
            .optional()?;
        if found.is_none() {
            return Err(LedgerError::CategoryNotFound(id));
        }
    }
    Ok(())
}

fn ensure_funds(acct: &Account, amount: Decimal) -> LedgerResult<()> {
    if amount > acct.balance {
        return Err(LedgerError::InsufficientFunds {
            account: acct.id,
            balance: acct.balance,
            requested: amount,
        });
    }
    Ok(())
}

/// What a posting does besides touching its source account.
#[derive(Debug, Clone, Copy)]
pub enum Movement<'a> {
    Deposit,
    Withdrawal,
    Transfer { target: &'a Account },
    ExternalTransfer { recipient: &'a str },
}

impl<'a> Movement<'a> {
    pub fn kind(&self) -> TransactionType {
        match self {
            Movement::Deposit => TransactionType::Deposit,
            Movement::Withdrawal => TransactionType::Withdrawal,
            Movement::Transfer { .. } => TransactionType::Transfer,
            Movement::ExternalTransfer { .. } => TransactionType::ExternalTransfer,
        }
    }

    pub fn counter(&self) -> Option<&'a Account> {
        match self {
            Movement::Transfer { target } => Some(*target),
            _ => None,
        }
    }

    pub fn recipient(&self) -> Option<&'a str> {
        match self {
            Movement::ExternalTransfer { recipient } => Some(*recipient),
            _ => None,
        }
    }
}

/// A validated movement waiting to be written.
struct Posting<'a> {
    movement: Movement<'a>,
    source: &'a Account,
    category: Option<CategoryId>,
    amount: Decimal,
    description: &'a str,
    actor: UserId,
}

/// Writes balances, the transaction row and its audit entry. Caller owns the
/// surrounding SQLite transaction.
fn post(conn: &Connection, p: Posting<'_>, at: NaiveDateTime) -> LedgerResult<TransactionId> {
    let kind = p.movement.kind();
    let counter = p.movement.counter();
    let mut balances = vec![(
        p.source.id,
        apply_delta(
            p.source.balance,
            signed_delta(kind, Role::Source, p.amount),
            p.amount,
        )?,
    )];
    if let Some(counter) = counter {
        balances.push((
            counter.id,
            apply_delta(
                counter.balance,
                signed_delta(kind, Role::Counter, p.amount),
                p.amount,
            )?,
        ));
    }
    // Fixed order so two opposite transfers take row locks the same way on any
    // store with row-level locking.
    balances.sort_by_key(|(id, _)| *id);
    for (id, balance) in &balances {
        conn.execute(
            "UPDATE accounts SET balance=?1 WHERE id=?2",
            params![balance.to_string(), id],
        )?;
    }

    let mut tx = Transaction {
        id: TransactionId(0),
        account_id: p.source.id,
        counter_account_id: counter.map(|c| c.id),
        external_recipient: p.movement.recipient().map(str::to_string),
        category_id: p.category,
        amount: p.amount,
        kind,
        description: p.description.to_string(),
        created_by: p.actor,
        occurred_at: at,
    };
    debug_assert!(tx.check_shape().is_ok(), "{:?}", tx.check_shape());
    conn.execute(
        "INSERT INTO transactions(account_id, counter_account_id, external_recipient,
             category_id, amount, kind, description, created_by, occurred_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            tx.account_id,
            tx.counter_account_id,
            tx.external_recipient,
            tx.category_id,
            tx.amount.to_string(),
            tx.kind,
            tx.description,
            tx.created_by,
            tx.occurred_at,
        ],
    )?;
    tx.id = TransactionId(conn.last_insert_rowid());

    let details = audit::describe(&p.movement, p.amount, p.source);
    audit::record(conn, &tx, p.actor, &details)?;
    Ok(tx.id)
}

fn logged<T: Display>(op: &'static str, result: LedgerResult<T>) -> LedgerResult<T> {
    match &result {
        Ok(id) => tracing::info!(op, id = %id, "committed"),
        Err(LedgerError::StorageFailure(source)) => {
            tracing::error!(op, error = %source, "storage failure, rolled back")
        }
        Err(e) => tracing::warn!(op, error = %e, "rejected"),
    }
    result
}

impl Ledger {
    #[tracing::instrument(skip_all, fields(account = %account, amount = %amount, actor = %actor))]
    pub fn deposit(
        &self,
        account: AccountId,
        amount: Decimal,
        category: Option<CategoryId>,
        description: &str,
        actor: UserId,
    ) -> LedgerResult<TransactionId> {
        let result = self.write(|conn| {
            let at = self.now();
            let acct = load_active(conn, account)?;
            ensure_category(conn, category)?;
            validate_amount(amount)?;
            post(
                conn,
                Posting {
                    movement: Movement::Deposit,
                    source: &acct,
                    category,
                    amount,
                    description,
                    actor,
                },
                at,
            )
        });
        logged("deposit", result)
    }

    #[tracing::instrument(skip_all, fields(account = %account, amount = %amount, actor = %actor))]
    pub fn withdraw(
        &self,
        account: AccountId,
        amount: Decimal,
        category: Option<CategoryId>,
        description: &str,
        actor: UserId,
    ) -> LedgerResult<TransactionId> {
        let result = self.write(|conn| {
            let at = self.now();
            let acct = load_active(conn, account)?;
            ensure_category(conn, category)?;
            validate_amount(amount)?;
            ensure_funds(&acct, amount)?;
            post(
                conn,
                Posting {
                    movement: Movement::Withdrawal,
                    source: &acct,
                    category,
                    amount,
                    description,
                    actor,
                },
                at,
            )
        });
        logged("withdraw", result)
    }

    /// Moves `amount` from `source` to `target` as a single transaction row.
    #[tracing::instrument(
        skip_all,
        fields(source = %source, target = %target, amount = %amount, actor = %actor)
    )]
    pub fn transfer(
        &self,
        source: AccountId,
        target: AccountId,
        amount: Decimal,
        description: &str,
        actor: UserId,
    ) -> LedgerResult<TransactionId> {
        let result = self.write(|conn| {
            let at = self.now();
            let from = load_active(conn, source)?;
            let to = load_active(conn, target)?;
            if from.id == to.id {
                return Err(LedgerError::SameAccount(source));
            }
            validate_amount(amount)?;
            ensure_funds(&from, amount)?;
            post(
                conn,
                Posting {
                    movement: Movement::Transfer { target: &to },
                    source: &from,
                    category: None,
                    amount,
                    description,
                    actor,
                },
                at,
            )
        });
        logged("transfer", result)
    }

    /// Sends money out of the ledger. No counter-account is credited.
    #[tracing::instrument(skip_all, fields(account = %account, amount = %amount, actor = %actor))]
    pub fn send_external(
        &self,
        account: AccountId,
        amount: Decimal,
        category: Option<CategoryId>,
        recipient: &str,
        description: &str,
        actor: UserId,
    ) -> LedgerResult<TransactionId> {
        let recipient = recipient.trim();
        let result = self.write(|conn| {
            let at = self.now();
            let acct = load_active(conn, account)?;
            ensure_category(conn, category)?;
            validate_amount(amount)?;
            if recipient.is_empty() {
                return Err(LedgerError::MissingRecipient);
            }
            ensure_funds(&acct, amount)?;
            post(
                conn,
                Posting {
                    movement: Movement::ExternalTransfer { recipient },
                    source: &acct,
                    category,
                    amount,
                    description,
                    actor,
                },
                at,
            )
        });
        logged("send_external", result)
    }

    /// Creates an account at zero; a non-zero initial deposit is posted as a
    /// regular deposit in the same unit.
    #[tracing::instrument(skip_all, fields(owner = %new.owner_id, name = %new.name))]
    pub fn open_account(&self, new: &NewAccount, actor: UserId) -> LedgerResult<AccountId> {
        let name = new.name.trim();
        let number = new
            .account_number
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let result = self.write(|conn| {
            let at = self.now();
            let type_found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM account_types WHERE id=?1",
                    params![new.account_type_id],
                    |r| r.get(0),
                )
                .optional()?;
            if type_found.is_none() {
                return Err(LedgerError::AccountTypeNotFound(new.account_type_id));
            }
            ensure_unique_name(conn, new.owner_id, name, None)?;
            if let Some(number) = number {
                let taken: Option<i64> = conn
                    .query_row(
                        "SELECT 1 FROM accounts WHERE account_number=?1",
                        params![number],
                        |r| r.get(0),
                    )
                    .optional()?;
                if taken.is_some() {
                    return Err(LedgerError::DuplicateAccountNumber {
                        number: number.to_string(),
                    });
                }
            }
            let initial = new.initial_deposit.filter(|a| !a.is_zero());
            if let Some(amount) = initial {
                validate_amount(amount)?;
            }

            conn.execute(
                "INSERT INTO accounts(user_id, account_type_id, name, account_number, balance,
                     is_active, created_at)
                 VALUES (?1, ?2, ?3, ?4, '0', 1, ?5)",
                params![new.owner_id, new.account_type_id, name, number, at],
            )?;
            let id = AccountId(conn.last_insert_rowid());

            if let Some(amount) = initial {
                let acct = load_account(conn, id)?;
                post(
                    conn,
                    Posting {
                        movement: Movement::Deposit,
                        source: &acct,
                        category: None,
                        amount,
                        description: INITIAL_DEPOSIT_DESCRIPTION,
                        actor,
                    },
                    at,
                )?;
            }
            Ok(id)
        });
        logged("open_account", result)
    }

    pub fn rename_account(&self, account: AccountId, name: &str) -> LedgerResult<()> {
        let name = name.trim();
        self.write(|conn| {
            let acct = load_account(conn, account)?;
            ensure_unique_name(conn, acct.owner_id, name, Some(account))?;
            conn.execute(
                "UPDATE accounts SET name=?1 WHERE id=?2",
                params![name, account],
            )?;
            Ok(())
        })
    }

    /// Soft delete (`false`) or reactivation (`true`). History is untouched.
    pub fn set_account_active(&self, account: AccountId, active: bool) -> LedgerResult<()> {
        let result = self.write(|conn| {
            load_account(conn, account)?;
            conn.execute(
                "UPDATE accounts SET is_active=?1 WHERE id=?2",
                params![active, account],
            )?;
            Ok(account)
        });
        logged(if active { "reopen_account" } else { "close_account" }, result).map(|_| ())
    }
}

fn ensure_unique_name(
    conn: &Connection,
    owner: UserId,
    name: &str,
    except: Option<AccountId>,
) -> LedgerResult<()> {
    let clash: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM accounts WHERE user_id=?1 AND name=?2 AND (?3 IS NULL OR id != ?3)",
            params![owner, name, except],
            |r| r.get(0),
        )
        .optional()?;
    if clash.is_some() {
        return Err(LedgerError::DuplicateAccountName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// `FR` followed by ten digits, the format external account numbers use.
pub fn generate_account_number() -> String {
    let n = uuid::Uuid::new_v4().as_u128() % 10_000_000_000;
    format!("FR{:010}", n)
}
