// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::Ledger;
use crate::models::UserId;
use crate::utils::{fmt_money, maybe_print_json, parse_date, pretty_table};
use anyhow::{Context, Result};

pub fn handle(ledger: &Ledger, actor: UserId, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("total", _)) => {
            let total = ledger.total_balance_for_user(actor)?;
            let ccy = ledger.display_currency()?;
            println!("Total balance for user {}: {}", actor, fmt_money(&total, &ccy));
        }
        Some(("spending", sub)) => spending(ledger, actor, sub)?,
        Some(("monthly", sub)) => monthly(ledger, actor, sub)?,
        _ => {}
    }
    Ok(())
}

fn spending(ledger: &Ledger, actor: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let from = sub.get_one::<String>("from").map(|d| parse_date(d)).transpose()?;
    let to = sub.get_one::<String>("to").map(|d| parse_date(d)).transpose()?;
    let is_expense = !sub.get_flag("income");
    let data = ledger.spending_by_category(actor, from, to, is_expense)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let ccy = ledger.display_currency()?;
        let rows = data
            .iter()
            .map(|c| {
                vec![
                    c.category.clone(),
                    c.count.to_string(),
                    fmt_money(&c.total, &ccy),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Category", "Count", "Total"], rows));
    }
    Ok(())
}

fn monthly(ledger: &Ledger, actor: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let year = *sub.get_one::<i32>("year").context("Missing --year")?;
    let data = ledger.monthly_summary(actor, year)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let ccy = ledger.display_currency()?;
        let rows = data
            .iter()
            .map(|m| {
                vec![
                    format!("{}-{:02}", year, m.month),
                    fmt_money(&m.income, &ccy),
                    fmt_money(&m.expense, &ccy),
                    fmt_money(&(m.income - m.expense), &ccy),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Month", "Income", "Expense", "Net"], rows));
    }
    Ok(())
}
