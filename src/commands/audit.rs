// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::Ledger;
use crate::models::{TransactionId, UserId};
use crate::utils::{maybe_print_json, parse_id, pretty_table};
use anyhow::Result;

pub fn handle(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("list", sub)) = m.subcommand() {
        let entries = match sub.get_one::<String>("transaction") {
            Some(t) => ledger
                .audit_entries_for_transaction(TransactionId(parse_id(t, "transaction")?))?,
            None => {
                let limit = sub.get_one::<usize>("limit").copied().unwrap_or(50);
                ledger.audit_trail(sub.get_one::<i64>("user").copied().map(UserId), limit)?
            }
        };
        if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &entries)? {
            let rows = entries
                .iter()
                .map(|e| {
                    vec![
                        e.id.to_string(),
                        e.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                        e.user_id.to_string(),
                        e.action.to_string(),
                        e.transaction_id.to_string(),
                        e.details.clone(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["ID", "When", "User", "Action", "Transaction", "Details"], rows)
            );
        }
    }
    Ok(())
}
