// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The one place that decides which way a transaction moves a balance.
//!
//! The engine applies [`signed_delta`] when it writes balances and the history
//! module applies [`delta_for`] when it replays them. Both must agree or a
//! reconstructed balance drifts from the stored one.

use crate::models::{AccountId, Transaction, TransactionType};
use rust_decimal::Decimal;

/// Which side of a transaction an account is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// `transactions.account_id`
    Source,
    /// `transactions.counter_account_id`; only transfers have one.
    Counter,
}

/// Balance change for an account in `role` of a transaction of type `kind`.
///
/// `amount` is the stored, always-positive amount.
pub fn signed_delta(kind: TransactionType, role: Role, amount: Decimal) -> Decimal {
    match (kind, role) {
        (TransactionType::Deposit, Role::Source) => amount,
        (TransactionType::Withdrawal, Role::Source)
        | (TransactionType::Transfer, Role::Source)
        | (TransactionType::ExternalTransfer, Role::Source) => -amount,
        (TransactionType::Transfer, Role::Counter) => amount,
        // Only transfers carry a counter-account.
        (_, Role::Counter) => Decimal::ZERO,
    }
}

/// Role of `account` in `tx`, if it takes part at all.
pub fn role_of(tx: &Transaction, account: AccountId) -> Option<Role> {
    if tx.account_id == account {
        Some(Role::Source)
    } else if tx.counter_account_id == Some(account) {
        Some(Role::Counter)
    } else {
        None
    }
}

/// Balance change `tx` caused on `account`; zero when the account is not involved.
pub fn delta_for(tx: &Transaction, account: AccountId) -> Decimal {
    match role_of(tx, account) {
        Some(role) => signed_delta(tx.kind, role, tx.amount),
        None => Decimal::ZERO,
    }
}

/// Sum of the deltas `txs` caused on `account`.
pub fn net_change<'a, I>(txs: I, account: AccountId) -> Decimal
where
    I: IntoIterator<Item = &'a Transaction>,
{
    txs.into_iter().map(|t| delta_for(t, account)).sum()
}
