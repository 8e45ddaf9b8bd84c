// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON object per line"),
    )
}

fn account_arg() -> Arg {
    Arg::new("account").long("account").required(true).help("Account id")
}

fn amount_arg() -> Arg {
    Arg::new("amount").long("amount").required(true)
}

fn range_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("from").long("from").help("YYYY-MM-DD"))
        .arg(Arg::new("to").long("to").help("YYYY-MM-DD"))
}

pub fn build_cli() -> Command {
    Command::new("vaultbook")
        .about("Account ledger with an append-only audit trail")
        .version(clap::crate_version!())
        .subcommand_required(false)
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .help("SQLite database path (overrides VAULTBOOK_DB)"),
        )
        .arg(
            Arg::new("as_user")
                .long("as-user")
                .global(true)
                .default_value("1")
                .value_parser(value_parser!(i64))
                .help("Acting user id recorded on writes"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(Command::new("init").about("Create the database and seed catalogs"))
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("open")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .default_value("Checking")
                                .help("Account type id or name"),
                        )
                        .arg(Arg::new("number").long("number").help("Account number; generated when omitted"))
                        .arg(Arg::new("initial").long("initial").help("Initial deposit")),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(
                        Arg::new("all")
                            .long("all")
                            .action(ArgAction::SetTrue)
                            .help("Include closed accounts"),
                    ),
                ))
                .subcommand(json_flags(Command::new("show").arg(account_arg())))
                .subcommand(
                    Command::new("rename")
                        .arg(account_arg())
                        .arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(Command::new("close").arg(account_arg()))
                .subcommand(Command::new("reopen").arg(account_arg())),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("income")
                                .long("income")
                                .action(ArgAction::SetTrue)
                                .help("Income category (default is expense)"),
                        )
                        .arg(Arg::new("icon").long("icon"))
                        .arg(Arg::new("color").long("color"))
                        .arg(Arg::new("parent").long("parent").help("Parent id or name")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(
                            Arg::new("expense")
                                .long("expense")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("income"),
                        )
                        .arg(Arg::new("income").long("income").action(ArgAction::SetTrue)),
                )),
        )
        .subcommand(json_flags(Command::new("types").about("List account types")))
        .subcommand(
            Command::new("tx")
                .about("Post and list transactions")
                .subcommand(
                    Command::new("deposit")
                        .arg(account_arg())
                        .arg(amount_arg())
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("description").long("description").default_value("")),
                )
                .subcommand(
                    Command::new("withdraw")
                        .arg(account_arg())
                        .arg(amount_arg())
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("description").long("description").default_value("")),
                )
                .subcommand(
                    Command::new("transfer")
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true))
                        .arg(amount_arg())
                        .arg(Arg::new("description").long("description").default_value("")),
                )
                .subcommand(
                    Command::new("send")
                        .arg(account_arg())
                        .arg(amount_arg())
                        .arg(Arg::new("recipient").long("recipient").required(true))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("description").long("description").default_value("")),
                )
                .subcommand(json_flags(range_args(
                    Command::new("list")
                        .arg(Arg::new("account").long("account"))
                        .arg(Arg::new("owner").long("owner").value_parser(value_parser!(i64)))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("type").long("type"))
                        .arg(Arg::new("search").long("search"))
                        .arg(Arg::new("min").long("min"))
                        .arg(Arg::new("max").long("max"))
                        .arg(Arg::new("limit").long("limit").value_parser(value_parser!(usize)))
                        .arg(
                            Arg::new("offset")
                                .long("offset")
                                .default_value("0")
                                .value_parser(value_parser!(usize)),
                        ),
                ))),
        )
        .subcommand(
            Command::new("history")
                .about("Reconstruct balances from transaction history")
                .subcommand(json_flags(range_args(
                    Command::new("series").arg(account_arg()),
                )))
                .subcommand(
                    Command::new("at")
                        .arg(account_arg())
                        .arg(Arg::new("date").long("date").required(true)),
                )
                .subcommand(Command::new("replay").arg(account_arg())),
        )
        .subcommand(
            Command::new("audit").about("Read the audit trail").subcommand(json_flags(
                Command::new("list")
                    .arg(Arg::new("user").long("user").value_parser(value_parser!(i64)))
                    .arg(Arg::new("transaction").long("transaction"))
                    .arg(
                        Arg::new("limit")
                            .long("limit")
                            .default_value("50")
                            .value_parser(value_parser!(usize)),
                    ),
            )),
        )
        .subcommand(
            Command::new("report")
                .about("Summaries for the acting user")
                .subcommand(Command::new("total"))
                .subcommand(json_flags(range_args(
                    Command::new("spending").arg(
                        Arg::new("income")
                            .long("income")
                            .action(ArgAction::SetTrue)
                            .help("Total income categories instead"),
                    ),
                )))
                .subcommand(json_flags(
                    Command::new("monthly").arg(
                        Arg::new("year")
                            .long("year")
                            .required(true)
                            .value_parser(value_parser!(i32)),
                    ),
                )),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("csv")
                            .help("csv|json"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(Command::new("doctor").about("Reconcile balances and check ledger integrity"))
}
