// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::Ledger;
use crate::models::{AccountId, AccountTypeId, CategoryId};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn parse_id(s: &str, what: &str) -> Result<i64> {
    s.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid {} id '{}'", what, s))
}

/// Value of an argument clap marks as required or defaulted.
pub fn arg<'a>(m: &'a clap::ArgMatches, id: &str) -> Result<&'a str> {
    m.get_one::<String>(id)
        .map(String::as_str)
        .with_context(|| format!("Missing --{}", id))
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {:.2}", ccy, d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn account_ref(s: &str) -> Result<AccountId> {
    Ok(AccountId(parse_id(s, "account")?))
}

/// Category given either as a numeric id or by name.
pub fn category_ref(ledger: &Ledger, s: &str) -> Result<CategoryId> {
    let s = s.trim();
    if let Ok(id) = s.parse::<i64>() {
        return Ok(CategoryId(id));
    }
    ledger
        .category_by_name(s)?
        .map(|c| c.id)
        .ok_or_else(|| anyhow!("Category '{}' not found", s))
}

/// Account type given either as a numeric id or by name.
pub fn account_type_ref(ledger: &Ledger, s: &str) -> Result<AccountTypeId> {
    let s = s.trim();
    if let Ok(id) = s.parse::<i64>() {
        return Ok(AccountTypeId(id));
    }
    ledger
        .account_type_by_name(s)?
        .ok_or_else(|| anyhow!("Account type '{}' not found", s))
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
