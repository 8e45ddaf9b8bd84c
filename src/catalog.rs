// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::Ledger;
use crate::errors::{LedgerError, LedgerResult};
use crate::models::{AccountType, AccountTypeId, Category, CategoryId};
use rusqlite::{OptionalExtension, params};

impl Ledger {
    pub fn account_types(&self) -> LedgerResult<Vec<AccountType>> {
        self.read(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, description FROM account_types ORDER BY id")?;
            let rows = stmt.query_map([], |r| {
                Ok(AccountType {
                    id: r.get(0)?,
                    name: r.get(1)?,
                    description: r.get(2)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    pub fn account_type_by_name(&self, name: &str) -> LedgerResult<Option<AccountTypeId>> {
        self.read(|conn| {
            Ok(conn
                .query_row(
                    "SELECT id FROM account_types WHERE lower(name)=lower(?1)",
                    params![name.trim()],
                    |r| r.get(0),
                )
                .optional()?)
        })
    }

    /// All categories by name, optionally only expense (`Some(true)`) or income.
    pub fn categories(&self, is_expense: Option<bool>) -> LedgerResult<Vec<Category>> {
        self.read(|conn| {
            let sql = format!(
                "SELECT {} FROM categories WHERE (?1 IS NULL OR is_expense=?1) ORDER BY name",
                Category::COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![is_expense], Category::from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    pub fn subcategories(&self, parent: CategoryId) -> LedgerResult<Vec<Category>> {
        self.read(|conn| {
            let sql = format!(
                "SELECT {} FROM categories WHERE parent_id=?1 ORDER BY name",
                Category::COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![parent], Category::from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    pub fn category_by_name(&self, name: &str) -> LedgerResult<Option<Category>> {
        self.read(|conn| {
            let sql = format!(
                "SELECT {} FROM categories WHERE lower(name)=lower(?1)",
                Category::COLUMNS
            );
            Ok(conn
                .query_row(&sql, params![name.trim()], Category::from_row)
                .optional()?)
        })
    }

    /// Adds a category. A parent must exist and must itself be top-level.
    pub fn create_category(
        &self,
        name: &str,
        is_expense: bool,
        icon: Option<&str>,
        color: Option<&str>,
        parent: Option<CategoryId>,
    ) -> LedgerResult<CategoryId> {
        let name = name.trim();
        self.write(|conn| {
            let clash: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM categories WHERE lower(name)=lower(?1)",
                    params![name],
                    |r| r.get(0),
                )
                .optional()?;
            if clash.is_some() {
                return Err(LedgerError::DuplicateCategoryName {
                    name: name.to_string(),
                });
            }
            if let Some(pid) = parent {
                let grandparent: Option<Option<CategoryId>> = conn
                    .query_row(
                        "SELECT parent_id FROM categories WHERE id=?1",
                        params![pid],
                        |r| r.get(0),
                    )
                    .optional()?;
                match grandparent {
                    None => return Err(LedgerError::CategoryNotFound(pid)),
                    Some(Some(_)) => return Err(LedgerError::NestedCategory(pid)),
                    Some(None) => {}
                }
            }
            conn.execute(
                "INSERT INTO categories(name, is_expense, icon, color, parent_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![name, is_expense, icon, color, parent],
            )?;
            Ok(CategoryId(conn.last_insert_rowid()))
        })
    }
}
