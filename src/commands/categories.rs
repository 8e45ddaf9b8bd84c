// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::Ledger;
use crate::utils::{arg, category_ref, maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?;
            let is_expense = !sub.get_flag("income");
            let parent = sub
                .get_one::<String>("parent")
                .map(|p| category_ref(ledger, p))
                .transpose()?;
            let id = ledger.create_category(
                name,
                is_expense,
                sub.get_one::<String>("icon").map(String::as_str),
                sub.get_one::<String>("color").map(String::as_str),
                parent,
            )?;
            println!(
                "Added {} category '{}' (ID: {})",
                if is_expense { "expense" } else { "income" },
                name.trim(),
                id
            );
        }
        Some(("list", sub)) => {
            let filter = if sub.get_flag("expense") {
                Some(true)
            } else if sub.get_flag("income") {
                Some(false)
            } else {
                None
            };
            let data = ledger.categories(filter)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|c| {
                        vec![
                            c.id.to_string(),
                            c.name.clone(),
                            if c.is_expense { "expense" } else { "income" }.to_string(),
                            c.parent_id.map(|p| p.to_string()).unwrap_or_default(),
                            c.icon.clone().unwrap_or_default(),
                            c.color.clone().unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Name", "Kind", "Parent", "Icon", "Color"], rows)
                );
            }
        }
        _ => {}
    }
    Ok(())
}

/// `vaultbook types`
pub fn list_types(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    let data = ledger.account_types()?;
    if !maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    t.name.clone(),
                    t.description.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["ID", "Name", "Description"], rows));
    }
    Ok(())
}
