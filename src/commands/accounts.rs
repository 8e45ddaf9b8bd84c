// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::Ledger;
use crate::engine::generate_account_number;
use crate::models::{NewAccount, UserId};
use crate::utils::{
    account_ref, account_type_ref, arg, fmt_money, maybe_print_json, parse_decimal, pretty_table,
};
use anyhow::Result;

pub fn handle(ledger: &Ledger, actor: UserId, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("open", sub)) => {
            let name = arg(sub, "name")?;
            let account_type_id = account_type_ref(ledger, arg(sub, "type")?)?;
            let account_number = match sub.get_one::<String>("number") {
                Some(n) => n.clone(),
                None => generate_account_number(),
            };
            let initial_deposit = sub
                .get_one::<String>("initial")
                .map(|s| parse_decimal(s))
                .transpose()?;
            let id = ledger.open_account(
                &NewAccount {
                    owner_id: actor,
                    account_type_id,
                    name: name.to_string(),
                    account_number: Some(account_number.clone()),
                    initial_deposit,
                },
                actor,
            )?;
            println!("Opened account '{}' (ID: {}, number {})", name, id, account_number);
        }
        Some(("list", sub)) => {
            let data = ledger.accounts(Some(actor), sub.get_flag("all"))?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let ccy = ledger.display_currency()?;
                let rows = data
                    .iter()
                    .map(|v| {
                        vec![
                            v.account.id.to_string(),
                            v.account.name.clone(),
                            v.account_type.clone(),
                            v.account.account_number.clone().unwrap_or_default(),
                            fmt_money(&v.account.balance, &ccy),
                            if v.account.is_active { "open" } else { "closed" }.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Name", "Type", "Number", "Balance", "Status"], rows)
                );
            }
        }
        Some(("show", sub)) => {
            let account = ledger.get_account(account_ref(arg(sub, "account")?)?)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &account)? {
                let ccy = ledger.display_currency()?;
                let rows = vec![
                    vec!["ID".into(), account.id.to_string()],
                    vec!["Name".into(), account.name.clone()],
                    vec!["Owner".into(), account.owner_id.to_string()],
                    vec![
                        "Number".into(),
                        account.account_number.clone().unwrap_or_default(),
                    ],
                    vec!["Balance".into(), fmt_money(&account.balance, &ccy)],
                    vec!["Active".into(), account.is_active.to_string()],
                    vec!["Created".into(), account.created_at.to_string()],
                ];
                println!("{}", pretty_table(&["Field", "Value"], rows));
            }
        }
        Some(("rename", sub)) => {
            let id = account_ref(arg(sub, "account")?)?;
            let name = arg(sub, "name")?;
            ledger.rename_account(id, name)?;
            println!("Renamed account {} to '{}'", id, name.trim());
        }
        Some(("close", sub)) => {
            let id = account_ref(arg(sub, "account")?)?;
            ledger.set_account_active(id, false)?;
            println!("Closed account {}", id);
        }
        Some(("reopen", sub)) => {
            let id = account_ref(arg(sub, "account")?)?;
            ledger.set_account_active(id, true)?;
            println!("Reopened account {}", id);
        }
        _ => {}
    }
    Ok(())
}
