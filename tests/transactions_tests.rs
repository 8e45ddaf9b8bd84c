// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use std::sync::Arc;
use vaultbook::clock::FixedClock;
use vaultbook::models::{AccountId, AccountTypeId, NewAccount, TransactionType, UserId};
use vaultbook::{Ledger, cli, commands::doctor, commands::transactions};

fn setup() -> (Ledger, AccountId, AccountId) {
    let clock = Arc::new(FixedClock::new(
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap(),
    ));
    let ledger = Ledger::open_in_memory().unwrap().with_clock(clock.clone());
    let open = |name: &str, initial: i64| {
        ledger
            .open_account(
                &NewAccount {
                    owner_id: UserId(1),
                    account_type_id: AccountTypeId(1),
                    name: name.into(),
                    account_number: None,
                    initial_deposit: Some(Decimal::from(initial)),
                },
                UserId(1),
            )
            .unwrap()
    };
    let a = open("A1", 100);
    let b = open("B1", 0);
    for _ in 0..3 {
        clock.advance(Duration::days(1));
        ledger
            .withdraw(a, Decimal::from(10), None, "P", UserId(1))
            .unwrap();
    }
    clock.advance(Duration::days(1));
    ledger.transfer(a, b, Decimal::from(5), "move", UserId(1)).unwrap();
    (ledger, a, b)
}

fn list_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["vaultbook", "tx", "list"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("tx", tx_m)) => match tx_m.subcommand() {
            Some(("list", list_m)) => list_m.clone(),
            _ => panic!("no list subcommand"),
        },
        _ => panic!("no tx subcommand"),
    }
}

#[test]
fn list_limit_respected() {
    let (ledger, _, _) = setup();
    let rows = transactions::query_rows(&ledger, &list_matches(&["--limit", "2"])).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].transaction.kind, TransactionType::Transfer);
    assert_eq!(
        rows[1].transaction.occurred_at.date(),
        NaiveDate::from_ymd_opt(2025, 1, 4).unwrap()
    );
}

#[test]
fn list_filters_by_type_alias_dates_and_offset() {
    let (ledger, _, b) = setup();
    let rows = transactions::query_rows(
        &ledger,
        &list_matches(&["--type", "withdraw", "--from", "2025-01-03", "--to", "2025-01-04"]),
    )
    .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.transaction.kind == TransactionType::Withdrawal));

    let paged =
        transactions::query_rows(&ledger, &list_matches(&["--offset", "4"])).unwrap();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].transaction.description, "Initial deposit");

    let incoming = transactions::query_rows(
        &ledger,
        &list_matches(&["--account", &b.to_string()]),
    )
    .unwrap();
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].counter_account_name.as_deref(), Some("B1"));

    assert!(transactions::query_rows(&ledger, &list_matches(&["--type", "refund"])).is_err());
}

#[test]
fn posting_commands_drive_the_engine() {
    let (ledger, a, b) = setup();
    let matches = cli::build_cli().get_matches_from([
        "vaultbook",
        "--as-user",
        "7",
        "tx",
        "send",
        "--account",
        &a.to_string(),
        "--amount",
        "20.50",
        "--recipient",
        "ACME-001",
        "--category",
        "Shopping",
    ]);
    let actor = UserId(*matches.get_one::<i64>("as_user").unwrap());
    if let Some(("tx", tx_m)) = matches.subcommand() {
        transactions::handle(&ledger, actor, tx_m).unwrap();
    } else {
        panic!("no tx subcommand");
    }
    assert_eq!(ledger.current_balance(a).unwrap(), Decimal::new(4450, 2));
    let trail = ledger.audit_trail(Some(UserId(7)), 5).unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].action, TransactionType::ExternalTransfer);

    let overdraw = cli::build_cli().get_matches_from([
        "vaultbook", "tx", "transfer", "--from", &b.to_string(), "--to", &a.to_string(),
        "--amount", "500",
    ]);
    if let Some(("tx", tx_m)) = overdraw.subcommand() {
        let err = transactions::handle(&ledger, UserId(1), tx_m).unwrap_err();
        assert!(err.to_string().contains("insufficient funds"));
    }
    assert_eq!(ledger.current_balance(b).unwrap(), Decimal::from(5));
}

#[test]
fn doctor_is_clean_after_engine_writes() {
    let (ledger, _, _) = setup();
    assert!(doctor::diagnose(&ledger).unwrap().is_empty());
    doctor::handle(&ledger).unwrap();
}
