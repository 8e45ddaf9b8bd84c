// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::Ledger;
use crate::history::DateRange;
use crate::utils::{account_ref, arg, fmt_money, maybe_print_json, parse_date, pretty_table};
use anyhow::{Result, bail};

pub fn handle(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("series", sub)) => {
            let account = account_ref(arg(sub, "account")?)?;
            let range = range_from(sub)?;
            let points = ledger.balance_series(account, range)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &points)? {
                if points.is_empty() {
                    println!("Account {} has no transactions", account);
                    return Ok(());
                }
                let ccy = ledger.display_currency()?;
                let rows = points
                    .iter()
                    .map(|p| vec![p.date.to_string(), fmt_money(&p.balance, &ccy)])
                    .collect();
                println!("{}", pretty_table(&["Date", "Balance"], rows));
            }
        }
        Some(("at", sub)) => {
            let account = account_ref(arg(sub, "account")?)?;
            let date = parse_date(arg(sub, "date")?)?;
            let balance = ledger.balance_at(account, date)?;
            let ccy = ledger.display_currency()?;
            println!("Account {} on {}: {}", account, date, fmt_money(&balance, &ccy));
        }
        Some(("replay", sub)) => {
            let account = account_ref(arg(sub, "account")?)?;
            let r = ledger.reconcile(account)?;
            let ccy = ledger.display_currency()?;
            println!(
                "Account {}: stored {}, replayed {} ({})",
                account,
                fmt_money(&r.stored, &ccy),
                fmt_money(&r.replayed, &ccy),
                if r.is_consistent() { "consistent" } else { "MISMATCH" }
            );
        }
        _ => {}
    }
    Ok(())
}

/// `--from`/`--to` must be given together; neither means the account's full span.
pub fn range_from(sub: &clap::ArgMatches) -> Result<Option<DateRange>> {
    let from = sub.get_one::<String>("from").map(|d| parse_date(d)).transpose()?;
    let to = sub.get_one::<String>("to").map(|d| parse_date(d)).transpose()?;
    match (from, to) {
        (Some(from), Some(to)) => Ok(Some(DateRange::new(from, to)?)),
        (None, None) => Ok(None),
        _ => bail!("--from and --to must be given together"),
    }
}
