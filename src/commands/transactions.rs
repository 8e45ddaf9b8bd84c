// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::Ledger;
use crate::models::{CategoryId, TransactionId, TransactionType, UserId};
use crate::queries::{TransactionFilter, TransactionView};
use crate::utils::{
    account_ref, arg, category_ref, fmt_money, maybe_print_json, parse_date, parse_decimal,
    pretty_table,
};
use anyhow::Result;
use rust_decimal::Decimal;

pub fn handle(ledger: &Ledger, actor: UserId, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("deposit", sub)) => {
            let account = account_ref(arg(sub, "account")?)?;
            let amount = parse_decimal(arg(sub, "amount")?)?;
            let category = optional_category(ledger, sub)?;
            let id = ledger.deposit(account, amount, category, arg(sub, "description")?, actor)?;
            report(ledger, id, "Deposited", amount)?;
        }
        Some(("withdraw", sub)) => {
            let account = account_ref(arg(sub, "account")?)?;
            let amount = parse_decimal(arg(sub, "amount")?)?;
            let category = optional_category(ledger, sub)?;
            let id = ledger.withdraw(account, amount, category, arg(sub, "description")?, actor)?;
            report(ledger, id, "Withdrew", amount)?;
        }
        Some(("transfer", sub)) => {
            let from = account_ref(arg(sub, "from")?)?;
            let to = account_ref(arg(sub, "to")?)?;
            let amount = parse_decimal(arg(sub, "amount")?)?;
            let id = ledger.transfer(from, to, amount, arg(sub, "description")?, actor)?;
            report(ledger, id, "Transferred", amount)?;
        }
        Some(("send", sub)) => {
            let account = account_ref(arg(sub, "account")?)?;
            let amount = parse_decimal(arg(sub, "amount")?)?;
            let category = optional_category(ledger, sub)?;
            let id = ledger.send_external(
                account,
                amount,
                category,
                arg(sub, "recipient")?,
                arg(sub, "description")?,
                actor,
            )?;
            report(ledger, id, "Sent", amount)?;
        }
        Some(("list", sub)) => list(ledger, sub)?,
        _ => {}
    }
    Ok(())
}

fn optional_category(
    ledger: &Ledger,
    sub: &clap::ArgMatches,
) -> Result<Option<CategoryId>> {
    sub.get_one::<String>("category")
        .map(|c| category_ref(ledger, c))
        .transpose()
}

fn report(ledger: &Ledger, id: TransactionId, verb: &str, amount: Decimal) -> Result<()> {
    let ccy = ledger.display_currency()?;
    println!("{} {} (transaction {})", verb, fmt_money(&amount, &ccy), id);
    Ok(())
}

/// Builds a listing filter from `tx list` arguments.
pub fn filter_from(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<TransactionFilter> {
    let kind = sub
        .get_one::<String>("type")
        .map(|t| t.parse::<TransactionType>())
        .transpose()?;
    Ok(TransactionFilter {
        account: sub
            .get_one::<String>("account")
            .map(|a| account_ref(a))
            .transpose()?,
        owner: sub.get_one::<i64>("owner").copied().map(UserId),
        from: sub.get_one::<String>("from").map(|d| parse_date(d)).transpose()?,
        to: sub.get_one::<String>("to").map(|d| parse_date(d)).transpose()?,
        category: sub
            .get_one::<String>("category")
            .map(|c| category_ref(ledger, c))
            .transpose()?,
        kind,
        search: sub.get_one::<String>("search").cloned(),
        min_amount: sub.get_one::<String>("min").map(|v| parse_decimal(v)).transpose()?,
        max_amount: sub.get_one::<String>("max").map(|v| parse_decimal(v)).transpose()?,
        limit: sub.get_one::<usize>("limit").copied(),
        offset: sub.get_one::<usize>("offset").copied().unwrap_or(0),
    })
}

pub fn query_rows(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<Vec<TransactionView>> {
    let filter = filter_from(ledger, sub)?;
    Ok(ledger.list_transactions(&filter)?)
}

fn list(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(ledger, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let ccy = ledger.display_currency()?;
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|v| {
                let t = &v.transaction;
                let counterparty = v
                    .counter_account_name
                    .clone()
                    .or_else(|| t.external_recipient.clone())
                    .unwrap_or_default();
                vec![
                    t.id.to_string(),
                    t.occurred_at.format("%Y-%m-%d %H:%M").to_string(),
                    t.kind.to_string(),
                    v.account_name.clone(),
                    counterparty,
                    fmt_money(&t.amount, &ccy),
                    v.category_name.clone().unwrap_or_default(),
                    t.description.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "When", "Type", "Account", "Counterparty", "Amount", "Category", "Description"],
                rows,
            )
        );
    }
    Ok(())
}
