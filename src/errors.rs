// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{AccountId, AccountTypeId, CategoryId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Failures surfaced by the ledger engine and its read side.
///
/// Validation variants are raised before any write happens. `StorageFailure`
/// keeps the driver error as its `source()` but never renders it, so callers can
/// show `to_string()` to an end user as-is.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    #[error("account {0} is closed")]
    AccountInactive(AccountId),

    #[error("cannot transfer from account {0} to itself")]
    SameAccount(AccountId),

    #[error("invalid amount {amount}: must be positive with at most 2 decimal places")]
    InvalidAmount { amount: Decimal },

    #[error("insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account: AccountId,
        balance: Decimal,
        requested: Decimal,
    },

    #[error("external recipient is required")]
    MissingRecipient,

    #[error("category {0} not found")]
    CategoryNotFound(CategoryId),

    #[error("category '{name}' already exists")]
    DuplicateCategoryName { name: String },

    #[error("category {0} is already a subcategory and cannot have children")]
    NestedCategory(CategoryId),

    #[error("account type {0} not found")]
    AccountTypeNotFound(AccountTypeId),

    #[error("account name '{name}' already exists for this owner")]
    DuplicateAccountName { name: String },

    #[error("account number '{number}' is already in use")]
    DuplicateAccountNumber { number: String },

    #[error("invalid date range: {from} is after {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },

    #[error("storage failure")]
    StorageFailure(#[from] rusqlite::Error),
}

impl LedgerError {
    /// True for errors caused by the request rather than the store.
    pub fn is_validation(&self) -> bool {
        !matches!(self, LedgerError::StorageFailure(_))
    }
}
