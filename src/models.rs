// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDateTime;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.0))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map($name)
            }
        }
    };
}

row_id!(
    /// Primary key of a row in `accounts`.
    AccountId
);
row_id!(AccountTypeId);
row_id!(CategoryId);
row_id!(
    /// Primary key of a row in `transactions`. Never reused.
    TransactionId
);
row_id!(AuditId);
row_id!(
    /// Identity of the acting user, supplied by the session layer and only recorded.
    UserId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Transfer,
    ExternalTransfer,
}

impl TransactionType {
    pub const ALL: [TransactionType; 4] = [
        TransactionType::Deposit,
        TransactionType::Withdrawal,
        TransactionType::Transfer,
        TransactionType::ExternalTransfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Transfer => "transfer",
            TransactionType::ExternalTransfer => "external_transfer",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTransactionType(pub String);

impl fmt::Display for UnknownTransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known: Vec<&str> = TransactionType::ALL.iter().map(|t| t.as_str()).collect();
        write!(
            f,
            "unknown transaction type '{}' (use {})",
            self.0,
            known.join("|")
        )
    }
}

impl std::error::Error for UnknownTransactionType {}

impl FromStr for TransactionType {
    type Err = UnknownTransactionType;

    // "send" is the label older dialogs used for external sends; it is accepted
    // on input only and always stored as external_transfer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deposit" => Ok(TransactionType::Deposit),
            "withdrawal" | "withdraw" => Ok(TransactionType::Withdrawal),
            "transfer" => Ok(TransactionType::Transfer),
            "external_transfer" | "send" => Ok(TransactionType::ExternalTransfer),
            other => Err(UnknownTransactionType(other.to_string())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        match s {
            "deposit" => Ok(TransactionType::Deposit),
            "withdrawal" => Ok(TransactionType::Withdrawal),
            "transfer" => Ok(TransactionType::Transfer),
            "external_transfer" => Ok(TransactionType::ExternalTransfer),
            other => Err(FromSqlError::Other(Box::new(UnknownTransactionType(
                other.to_string(),
            )))),
        }
    }
}

/// Reads a decimal stored as canonical text.
pub fn decimal_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    raw.parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub owner_id: UserId,
    pub account_type_id: AccountTypeId,
    pub name: String,
    pub account_number: Option<String>,
    pub balance: Decimal,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl Account {
    pub const COLUMNS: &'static str =
        "id, user_id, account_type_id, name, account_number, balance, is_active, created_at";

    pub fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Account {
            id: r.get(0)?,
            owner_id: r.get(1)?,
            account_type_id: r.get(2)?,
            name: r.get(3)?,
            account_number: r.get(4)?,
            balance: decimal_column(r, 5)?,
            is_active: r.get(6)?,
            created_at: r.get(7)?,
        })
    }
}

/// Input for opening an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub owner_id: UserId,
    pub account_type_id: AccountTypeId,
    pub name: String,
    pub account_number: Option<String>,
    pub initial_deposit: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountType {
    pub id: AccountTypeId,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub is_expense: bool,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub parent_id: Option<CategoryId>,
}

impl Category {
    pub const COLUMNS: &'static str = "id, name, is_expense, icon, color, parent_id";

    pub fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Category {
            id: r.get(0)?,
            name: r.get(1)?,
            is_expense: r.get(2)?,
            icon: r.get(3)?,
            color: r.get(4)?,
            parent_id: r.get(5)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub counter_account_id: Option<AccountId>,
    pub external_recipient: Option<String>,
    pub category_id: Option<CategoryId>,
    /// Always positive; direction comes from `kind` and the account's role.
    pub amount: Decimal,
    pub kind: TransactionType,
    pub description: String,
    pub created_by: UserId,
    pub occurred_at: NaiveDateTime,
}

impl Transaction {
    pub const COLUMNS: &'static str = "id, account_id, counter_account_id, external_recipient, \
         category_id, amount, kind, description, created_by, occurred_at";

    pub fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Transaction {
            id: r.get(0)?,
            account_id: r.get(1)?,
            counter_account_id: r.get(2)?,
            external_recipient: r.get(3)?,
            category_id: r.get(4)?,
            amount: decimal_column(r, 5)?,
            kind: r.get(6)?,
            description: r.get::<_, Option<String>>(7)?.unwrap_or_default(),
            created_by: r.get(8)?,
            occurred_at: r.get(9)?,
        })
    }

    /// Checks which of counter-account and external recipient may be set for this type.
    pub fn check_shape(&self) -> Result<(), &'static str> {
        let has_counter = self.counter_account_id.is_some();
        let has_recipient = self
            .external_recipient
            .as_deref()
            .is_some_and(|s| !s.is_empty());
        match self.kind {
            TransactionType::Transfer if !has_counter => Err("transfer without counter-account"),
            TransactionType::Transfer if has_recipient => {
                Err("transfer with external recipient")
            }
            TransactionType::ExternalTransfer if !has_recipient => {
                Err("external transfer without recipient")
            }
            TransactionType::ExternalTransfer if has_counter => {
                Err("external transfer with counter-account")
            }
            TransactionType::Deposit | TransactionType::Withdrawal
                if has_counter || has_recipient =>
            {
                Err("deposit/withdrawal with counterparty")
            }
            _ if self.amount <= Decimal::ZERO => Err("non-positive amount"),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: AuditId,
    pub transaction_id: TransactionId,
    pub user_id: UserId,
    pub action: TransactionType,
    pub details: String,
    pub recorded_at: NaiveDateTime,
}

impl AuditLogEntry {
    pub const COLUMNS: &'static str = "id, transaction_id, user_id, action, details, recorded_at";

    pub fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(AuditLogEntry {
            id: r.get(0)?,
            transaction_id: r.get(1)?,
            user_id: r.get(2)?,
            action: r.get(3)?,
            details: r.get(4)?,
            recorded_at: r.get(5)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample(kind: TransactionType) -> Transaction {
        Transaction {
            id: TransactionId(1),
            account_id: AccountId(1),
            counter_account_id: None,
            external_recipient: None,
            category_id: None,
            amount: Decimal::new(1000, 2),
            kind,
            description: String::new(),
            created_by: UserId(1),
            occurred_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn send_is_parsed_as_external_transfer() {
        assert_eq!(
            "send".parse::<TransactionType>().unwrap(),
            TransactionType::ExternalTransfer
        );
        assert_eq!(
            " Deposit ".parse::<TransactionType>().unwrap(),
            TransactionType::Deposit
        );
        assert!("refund".parse::<TransactionType>().is_err());
    }

    #[test]
    fn stored_labels_parse_back() {
        for kind in TransactionType::ALL {
            assert_eq!(kind.as_str().parse::<TransactionType>().unwrap(), kind);
        }
        let err = "refund".parse::<TransactionType>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown transaction type 'refund' (use deposit|withdrawal|transfer|external_transfer)"
        );
    }

    #[test]
    fn shape_rules_per_type() {
        assert!(sample(TransactionType::Deposit).check_shape().is_ok());

        let mut t = sample(TransactionType::Transfer);
        assert!(t.check_shape().is_err());
        t.counter_account_id = Some(AccountId(2));
        assert!(t.check_shape().is_ok());
        t.external_recipient = Some("ACME".into());
        assert!(t.check_shape().is_err());

        let mut x = sample(TransactionType::ExternalTransfer);
        assert!(x.check_shape().is_err());
        x.external_recipient = Some("ACME-001".into());
        assert!(x.check_shape().is_ok());
        x.counter_account_id = Some(AccountId(2));
        assert!(x.check_shape().is_err());

        let mut w = sample(TransactionType::Withdrawal);
        w.external_recipient = Some("x".into());
        assert!(w.check_shape().is_err());
    }
}
