// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use vaultbook::config::StoreConfig;
use vaultbook::models::UserId;
use vaultbook::{Ledger, cli, commands, logging};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    logging::init_tracing(matches.get_flag("verbose"));

    let cfg = StoreConfig::resolve(matches.get_one::<String>("db").map(String::as_str))?;
    let ledger = Ledger::open(&cfg)?;
    let actor = UserId(matches.get_one::<i64>("as_user").copied().unwrap_or(1));

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", cfg.path.display());
        }
        Some(("account", sub)) => commands::accounts::handle(&ledger, actor, sub)?,
        Some(("category", sub)) => commands::categories::handle(&ledger, sub)?,
        Some(("types", sub)) => commands::categories::list_types(&ledger, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&ledger, actor, sub)?,
        Some(("history", sub)) => commands::history::handle(&ledger, sub)?,
        Some(("audit", sub)) => commands::audit::handle(&ledger, sub)?,
        Some(("report", sub)) => commands::reports::handle(&ledger, actor, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&ledger, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&ledger)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
