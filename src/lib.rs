// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod audit;
pub mod catalog;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod db;
pub mod delta;
pub mod engine;
pub mod errors;
pub mod history;
pub mod logging;
pub mod models;
pub mod queries;
pub mod utils;

pub use db::Ledger;
pub use errors::{LedgerError, LedgerResult};
