// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use vaultbook::models::{
    AccountId, AccountTypeId, CategoryId, NewAccount, TransactionType, UserId,
};
use vaultbook::engine::MAX_AMOUNT;
use vaultbook::queries::TransactionFilter;
use vaultbook::{Ledger, LedgerError};

const ALICE: UserId = UserId(1);

fn usd(units: i64) -> Decimal {
    Decimal::new(units * 100, 2)
}

fn open(ledger: &Ledger, name: &str, initial: i64) -> AccountId {
    ledger
        .open_account(
            &NewAccount {
                owner_id: ALICE,
                account_type_id: AccountTypeId(1),
                name: name.to_string(),
                account_number: None,
                initial_deposit: Some(usd(initial)),
            },
            ALICE,
        )
        .unwrap()
}

fn balance(ledger: &Ledger, id: AccountId) -> Decimal {
    ledger.current_balance(id).unwrap()
}

#[test]
fn deposit_transfer_then_overdraw() {
    let ledger = Ledger::open_in_memory().unwrap();
    let a = open(&ledger, "A", 100);
    let b = open(&ledger, "B", 0);
    let base = ledger.transaction_count().unwrap();

    ledger.deposit(a, usd(50), None, "top up", ALICE).unwrap();
    assert_eq!(balance(&ledger, a), usd(150));
    assert_eq!(ledger.transaction_count().unwrap(), base + 1);

    let t = ledger.transfer(a, b, usd(30), "rent share", ALICE).unwrap();
    assert_eq!(balance(&ledger, a), usd(120));
    assert_eq!(balance(&ledger, b), usd(30));
    assert_eq!(ledger.transaction_count().unwrap(), base + 2);
    let row = ledger.get_transaction(t).unwrap().unwrap();
    assert_eq!(row.kind, TransactionType::Transfer);
    assert_eq!(row.account_id, a);
    assert_eq!(row.counter_account_id, Some(b));

    let err = ledger.withdraw(a, usd(200), None, "", ALICE).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InsufficientFunds { account, balance, requested }
            if account == a && balance == usd(120) && requested == usd(200)
    ));
    assert_eq!(balance(&ledger, a), usd(120));
    assert_eq!(balance(&ledger, b), usd(30));
    assert_eq!(ledger.transaction_count().unwrap(), base + 2);
}

#[test]
fn send_external_records_recipient_only() {
    let ledger = Ledger::open_in_memory().unwrap();
    let a = open(&ledger, "A", 120);
    let id = ledger
        .send_external(a, usd(20), None, "ACME-001", "invoice 7", ALICE)
        .unwrap();
    assert_eq!(balance(&ledger, a), usd(100));
    let row = ledger.get_transaction(id).unwrap().unwrap();
    assert_eq!(row.kind, TransactionType::ExternalTransfer);
    assert_eq!(row.external_recipient.as_deref(), Some("ACME-001"));
    assert_eq!(row.counter_account_id, None);
}

#[test]
fn transfer_conserves_the_pair_total() {
    let ledger = Ledger::open_in_memory().unwrap();
    let a = open(&ledger, "A", 75);
    let b = open(&ledger, "B", 25);
    let before = balance(&ledger, a) + balance(&ledger, b);
    ledger
        .transfer(a, b, Decimal::new(3333, 2), "", ALICE)
        .unwrap();
    ledger.transfer(b, a, Decimal::new(1, 2), "", ALICE).unwrap();
    assert_eq!(balance(&ledger, a) + balance(&ledger, b), before);
    assert_eq!(balance(&ledger, b), Decimal::new(5832, 2));
}

#[test]
fn each_success_writes_one_transaction_and_one_audit_row() {
    let ledger = Ledger::open_in_memory().unwrap();
    let a = open(&ledger, "A", 10);
    let b = open(&ledger, "B", 0);
    let (tx0, au0) = (
        ledger.transaction_count().unwrap(),
        ledger.audit_count().unwrap(),
    );

    let ids = [
        ledger.deposit(a, usd(5), None, "", ALICE).unwrap(),
        ledger.withdraw(a, usd(1), None, "", ALICE).unwrap(),
        ledger.transfer(a, b, usd(2), "", ALICE).unwrap(),
        ledger.send_external(a, usd(3), None, "X", "", ALICE).unwrap(),
    ];
    assert_eq!(ledger.transaction_count().unwrap(), tx0 + 4);
    assert_eq!(ledger.audit_count().unwrap(), au0 + 4);
    for id in ids {
        let entries = ledger.audit_entries_for_transaction(id).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_id, ALICE);
    }
}

#[test]
fn audit_details_describe_the_movement() {
    let ledger = Ledger::open_in_memory().unwrap();
    let a = open(&ledger, "Main", 100);
    let b = open(&ledger, "Rainy day", 0);
    let t = ledger.transfer(a, b, usd(30), "", UserId(42)).unwrap();
    let s = ledger.send_external(a, usd(20), None, "ACME-001", "", ALICE).unwrap();

    let entry = &ledger.audit_entries_for_transaction(t).unwrap()[0];
    assert_eq!(entry.action, TransactionType::Transfer);
    assert_eq!(entry.user_id, UserId(42));
    assert_eq!(
        entry.details,
        format!(
            "Transferred 30.00 from account Main (ID: {}) to account Rainy day (ID: {})",
            a, b
        )
    );
    let entry = &ledger.audit_entries_for_transaction(s).unwrap()[0];
    assert!(entry.details.ends_with("to external recipient: ACME-001"));

    let mine = ledger.audit_trail(Some(UserId(42)), 10).unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].transaction_id, t);
}

#[test]
fn validation_failures_change_nothing() {
    let ledger = Ledger::open_in_memory().unwrap();
    let a = open(&ledger, "A", 10);
    let tx0 = ledger.transaction_count().unwrap();
    let missing = AccountId(999);

    let errors = [
        ledger.deposit(missing, usd(1), None, "", ALICE).unwrap_err(),
        ledger.deposit(a, Decimal::ZERO, None, "", ALICE).unwrap_err(),
        ledger.withdraw(a, usd(-1), None, "", ALICE).unwrap_err(),
        ledger.deposit(a, Decimal::new(1001, 3), None, "", ALICE).unwrap_err(),
        ledger.transfer(a, a, usd(1), "", ALICE).unwrap_err(),
        ledger.send_external(a, usd(1), None, "   ", "", ALICE).unwrap_err(),
        ledger
            .deposit(a, usd(1), Some(CategoryId(999)), "", ALICE)
            .unwrap_err(),
    ];
    assert!(matches!(errors[0], LedgerError::AccountNotFound(AccountId(999))));
    assert!(matches!(errors[1], LedgerError::InvalidAmount { .. }));
    assert!(matches!(errors[2], LedgerError::InvalidAmount { .. }));
    assert!(matches!(errors[3], LedgerError::InvalidAmount { .. }));
    assert!(matches!(errors[4], LedgerError::SameAccount(_)));
    assert!(matches!(errors[5], LedgerError::MissingRecipient));
    assert!(matches!(errors[6], LedgerError::CategoryNotFound(CategoryId(999))));
    assert!(errors.iter().all(LedgerError::is_validation));
    assert_eq!(ledger.transaction_count().unwrap(), tx0);
    assert_eq!(balance(&ledger, a), usd(10));
}

#[test]
fn amounts_at_the_column_limit() {
    let ledger = Ledger::open_in_memory().unwrap();
    let a = open(&ledger, "A", 0);
    let b = open(&ledger, "B", 1);
    let cent = Decimal::new(1, 2);

    ledger.deposit(a, MAX_AMOUNT, None, "largest", ALICE).unwrap();
    assert_eq!(balance(&ledger, a), MAX_AMOUNT);
    let txs = ledger.transaction_count().unwrap();
    let audits = ledger.audit_count().unwrap();

    let rejected = [
        ledger.deposit(b, MAX_AMOUNT + cent, None, "", ALICE),
        ledger.deposit(b, Decimal::MAX, None, "", ALICE),
        ledger.deposit(a, cent, None, "would overflow", ALICE),
        ledger.transfer(b, a, cent, "would overflow", ALICE),
    ];
    for result in rejected {
        assert!(
            matches!(result, Err(LedgerError::InvalidAmount { .. })),
            "{:?}",
            result
        );
    }
    let too_big = ledger.open_account(
        &NewAccount {
            owner_id: ALICE,
            account_type_id: AccountTypeId(1),
            name: "C".into(),
            account_number: None,
            initial_deposit: Some(Decimal::MAX),
        },
        ALICE,
    );
    assert!(matches!(too_big, Err(LedgerError::InvalidAmount { .. })));

    assert_eq!(balance(&ledger, a), MAX_AMOUNT);
    assert_eq!(balance(&ledger, b), usd(1));
    assert_eq!(ledger.transaction_count().unwrap(), txs);
    assert_eq!(ledger.audit_count().unwrap(), audits);
    assert!(ledger.reconcile(a).unwrap().is_consistent());

    ledger.withdraw(a, MAX_AMOUNT, None, "", ALICE).unwrap();
    assert_eq!(balance(&ledger, a), Decimal::ZERO);
}

#[test]
fn validation_order_is_stable() {
    let ledger = Ledger::open_in_memory().unwrap();
    let a = open(&ledger, "A", 10);

    // missing account wins over a bad amount
    let err = ledger
        .transfer(a, AccountId(77), usd(-5), "", ALICE)
        .unwrap_err();
    assert!(matches!(err, LedgerError::AccountNotFound(AccountId(77))));

    // same-account wins over a bad amount
    let err = ledger.transfer(a, a, usd(-5), "", ALICE).unwrap_err();
    assert!(matches!(err, LedgerError::SameAccount(_)));

    // amount wins over a missing recipient
    let err = ledger
        .send_external(a, Decimal::ZERO, None, "", "", ALICE)
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount { .. }));

    // recipient wins over funds
    let err = ledger.send_external(a, usd(500), None, "", "", ALICE).unwrap_err();
    assert!(matches!(err, LedgerError::MissingRecipient));
}

#[test]
fn closed_accounts_reject_postings_until_reopened() {
    let ledger = Ledger::open_in_memory().unwrap();
    let a = open(&ledger, "A", 10);
    let b = open(&ledger, "B", 0);
    ledger.set_account_active(b, false).unwrap();

    let err = ledger.transfer(a, b, usd(1), "", ALICE).unwrap_err();
    assert!(matches!(err, LedgerError::AccountInactive(id) if id == b));
    assert_eq!(ledger.accounts(Some(ALICE), false).unwrap().len(), 1);
    assert_eq!(ledger.accounts(Some(ALICE), true).unwrap().len(), 2);

    ledger.set_account_active(b, true).unwrap();
    ledger.transfer(a, b, usd(1), "", ALICE).unwrap();
    assert_eq!(balance(&ledger, b), usd(1));
}

#[test]
fn opening_accounts_enforces_names_numbers_and_types() {
    let ledger = Ledger::open_in_memory().unwrap();
    let a = open(&ledger, "Checking", 0);
    assert_eq!(ledger.transaction_count().unwrap(), 0);
    assert_eq!(balance(&ledger, a), Decimal::ZERO);

    let dup = ledger.open_account(
        &NewAccount {
            owner_id: ALICE,
            account_type_id: AccountTypeId(1),
            name: "Checking".into(),
            account_number: None,
            initial_deposit: None,
        },
        ALICE,
    );
    assert!(matches!(dup, Err(LedgerError::DuplicateAccountName { .. })));

    // another owner may reuse the name
    let other = NewAccount {
        owner_id: UserId(2),
        account_type_id: AccountTypeId(2),
        name: "Checking".into(),
        account_number: Some("FR0000000001".into()),
        initial_deposit: Some(Decimal::new(1050, 2)),
    };
    let b = ledger.open_account(&other, UserId(2)).unwrap();
    assert_eq!(balance(&ledger, b), Decimal::new(1050, 2));
    let seeded = ledger.list_transactions(&Default::default()).unwrap();
    assert_eq!(seeded.len(), 1);
    assert_eq!(seeded[0].transaction.description, "Initial deposit");

    let taken = ledger.open_account(
        &NewAccount {
            name: "Other".into(),
            ..other.clone()
        },
        UserId(2),
    );
    assert!(matches!(taken, Err(LedgerError::DuplicateAccountNumber { .. })));

    let bad_type = ledger.open_account(
        &NewAccount {
            account_type_id: AccountTypeId(99),
            name: "X".into(),
            account_number: None,
            ..other
        },
        UserId(2),
    );
    assert!(matches!(bad_type, Err(LedgerError::AccountTypeNotFound(AccountTypeId(99)))));

    ledger.rename_account(a, "Daily").unwrap();
    assert_eq!(ledger.get_account(a).unwrap().name, "Daily");
}

#[test]
fn listings_filter_by_either_side_and_text() {
    let ledger = Ledger::open_in_memory().unwrap();
    let a = open(&ledger, "A", 100);
    let b = open(&ledger, "B", 0);
    ledger.transfer(a, b, usd(10), "split", ALICE).unwrap();
    ledger.send_external(a, usd(5), None, "ACME-001", "", ALICE).unwrap();

    let for_b = ledger
        .list_transactions(&TransactionFilter {
            account: Some(b),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(for_b.len(), 1);
    assert_eq!(for_b[0].counter_account_name.as_deref(), Some("B"));

    let acme = ledger
        .list_transactions(&TransactionFilter {
            search: Some("acme".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(acme.len(), 1);
    assert_eq!(acme[0].transaction.kind, TransactionType::ExternalTransfer);

    let big = ledger
        .list_transactions(&TransactionFilter {
            min_amount: Some(usd(10)),
            kind: Some(TransactionType::Deposit),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(big.len(), 1);
    assert_eq!(big[0].transaction.amount, usd(100));

    assert_eq!(ledger.total_balance_for_user(ALICE).unwrap(), usd(95));
}
