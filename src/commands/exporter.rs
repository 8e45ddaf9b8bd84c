// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::Ledger;
use crate::queries::{TransactionFilter, TransactionView};
use crate::utils::arg;
use anyhow::{Context, Result, bail};
use std::path::Path;

pub fn handle(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let fmt = arg(sub, "format")?;
            let out = arg(sub, "out")?;
            let n = export_transactions(ledger, fmt, Path::new(out))?;
            println!("Exported {} transactions to {}", n, out);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Writes every transaction, oldest first, as `csv` or pretty `json`.
/// Returns the number of rows written.
pub fn export_transactions(ledger: &Ledger, format: &str, out: &Path) -> Result<usize> {
    let fmt = format.trim().to_lowercase();
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", format);
    }
    let mut rows = ledger.list_transactions(&TransactionFilter::default())?;
    rows.reverse();

    match fmt.as_str() {
        "csv" => write_csv(&rows, out)?,
        _ => std::fs::write(out, serde_json::to_string_pretty(&rows)?)
            .with_context(|| format!("Writing {}", out.display()))?,
    }
    Ok(rows.len())
}

fn write_csv(rows: &[TransactionView], out: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(out)
        .with_context(|| format!("Opening {}", out.display()))?;
    wtr.write_record([
        "id",
        "occurred_at",
        "kind",
        "account_id",
        "account",
        "counter_account_id",
        "counter_account",
        "external_recipient",
        "category",
        "amount",
        "description",
        "created_by",
    ])?;
    for v in rows {
        let t = &v.transaction;
        wtr.write_record([
            t.id.to_string(),
            t.occurred_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            t.kind.to_string(),
            t.account_id.to_string(),
            v.account_name.clone(),
            t.counter_account_id.map(|c| c.to_string()).unwrap_or_default(),
            v.counter_account_name.clone().unwrap_or_default(),
            t.external_recipient.clone().unwrap_or_default(),
            v.category_name.clone().unwrap_or_default(),
            t.amount.to_string(),
            t.description.clone(),
            t.created_by.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
