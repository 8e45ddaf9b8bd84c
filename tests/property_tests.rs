// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use proptest::prelude::*;
use rust_decimal::Decimal;
use vaultbook::models::{AccountId, AccountTypeId, NewAccount, UserId};
use vaultbook::{Ledger, LedgerError};

#[derive(Debug, Clone)]
enum Op {
    Deposit(usize, i64),
    Withdraw(usize, i64),
    Transfer(usize, usize, i64),
    Send(usize, i64),
}

fn op() -> impl Strategy<Value = Op> {
    let cents = 1i64..50_000;
    prop_oneof![
        (0..3usize, cents.clone()).prop_map(|(a, c)| Op::Deposit(a, c)),
        (0..3usize, cents.clone()).prop_map(|(a, c)| Op::Withdraw(a, c)),
        (0..3usize, 0..3usize, cents.clone()).prop_map(|(a, b, c)| Op::Transfer(a, b, c)),
        (0..3usize, cents).prop_map(|(a, c)| Op::Send(a, c)),
    ]
}

fn accounts(ledger: &Ledger) -> Vec<AccountId> {
    ["A", "B", "C"]
        .iter()
        .map(|name| {
            ledger
                .open_account(
                    &NewAccount {
                        owner_id: UserId(1),
                        account_type_id: AccountTypeId(1),
                        name: name.to_string(),
                        account_number: None,
                        initial_deposit: None,
                    },
                    UserId(1),
                )
                .unwrap()
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    })]

    /// Property: stored balances always equal the deltas of the operations that
    /// succeeded, replay agrees with them, and no balance goes negative.
    #[test]
    fn balances_track_applied_deltas(ops in prop::collection::vec(op(), 1..40)) {
        let ledger = Ledger::open_in_memory().unwrap();
        let ids = accounts(&ledger);
        let mut model = [Decimal::ZERO; 3];
        let mut posted = 0i64;

        for op in ops {
            let actor = UserId(1);
            match op {
                Op::Deposit(a, c) => {
                    let amt = Decimal::new(c, 2);
                    ledger.deposit(ids[a], amt, None, "", actor).unwrap();
                    model[a] += amt;
                    posted += 1;
                }
                Op::Withdraw(a, c) => {
                    let amt = Decimal::new(c, 2);
                    match ledger.withdraw(ids[a], amt, None, "", actor) {
                        Ok(_) => { model[a] -= amt; posted += 1; }
                        Err(e) => {
                            prop_assert!(amt > model[a]);
                            let is_funds = matches!(e, LedgerError::InsufficientFunds { .. });
                            prop_assert!(is_funds);
                        }
                    }
                }
                Op::Transfer(a, b, c) => {
                    let amt = Decimal::new(c, 2);
                    let before = model[a] + model[b];
                    match ledger.transfer(ids[a], ids[b], amt, "", actor) {
                        Ok(_) => {
                            prop_assert_ne!(a, b);
                            model[a] -= amt;
                            model[b] += amt;
                            posted += 1;
                            prop_assert_eq!(model[a] + model[b], before);
                        }
                        Err(LedgerError::SameAccount(_)) => prop_assert_eq!(a, b),
                        Err(e) => {
                            let is_funds = matches!(e, LedgerError::InsufficientFunds { .. });
                            prop_assert!(is_funds);
                            prop_assert!(amt > model[a]);
                        }
                    }
                }
                Op::Send(a, c) => {
                    let amt = Decimal::new(c, 2);
                    match ledger.send_external(ids[a], amt, None, "ACME-001", "", actor) {
                        Ok(_) => { model[a] -= amt; posted += 1; }
                        Err(_) => prop_assert!(amt > model[a]),
                    }
                }
            }
        }

        for (i, id) in ids.iter().enumerate() {
            let stored = ledger.current_balance(*id).unwrap();
            prop_assert_eq!(stored, model[i]);
            prop_assert!(stored >= Decimal::ZERO);
            prop_assert_eq!(ledger.replay_from_zero(*id).unwrap(), stored);
        }
        prop_assert_eq!(ledger.transaction_count().unwrap(), posted);
        prop_assert_eq!(ledger.audit_count().unwrap(), posted);
    }
}
