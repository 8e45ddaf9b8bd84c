// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::Ledger;
use crate::queries::TransactionFilter;
use crate::utils::pretty_table;
use anyhow::Result;
use rust_decimal::Decimal;

/// Integrity problems as `(issue, detail)` pairs; empty when the ledger is sound.
pub fn diagnose(ledger: &Ledger) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Stored balance disagrees with a replay of the history
    for r in ledger.reconcile_all()? {
        if !r.is_consistent() {
            rows.push(vec![
                "balance_mismatch".into(),
                format!("account {}: stored {} replayed {}", r.account, r.stored, r.replayed),
            ]);
        }
        if r.stored < Decimal::ZERO {
            rows.push(vec![
                "negative_balance".into(),
                format!("account {}: {}", r.account, r.stored),
            ]);
        }
    }

    // 2) Malformed transaction rows
    for v in ledger.list_transactions(&TransactionFilter::default())? {
        if let Err(why) = v.transaction.check_shape() {
            rows.push(vec![
                "bad_shape".into(),
                format!("transaction {}: {}", v.transaction.id, why),
            ]);
        }
    }

    // 3) Audit coverage
    for id in ledger.unaudited_transactions()? {
        rows.push(vec!["missing_audit".into(), format!("transaction {}", id)]);
    }

    Ok(rows)
}

pub fn handle(ledger: &Ledger) -> Result<()> {
    let rows = diagnose(ledger)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
