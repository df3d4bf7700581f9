//! Builds the statement sequence that recreates one table.
//!
//! Records are collected first so the created schema is the union of every
//! column any record supplied. The sequence is then one `DROP TABLE IF
//! EXISTS`, one `CREATE TABLE` and one parameterized `INSERT` per record,
//! binding NULL where a record lacks a column.

use std::collections::HashSet;

use anyhow::{Result, bail};
use tracing::warn;

use super::records::{ColumnDecl, ColumnKind, Record, Value};

/// Columns every table may carry, in their preferred order.
pub const BASE_COLUMNS: &[(&str, &str)] = &[
    ("name", "TEXT NOT NULL UNIQUE"),
    ("shortname", "TEXT NOT NULL UNIQUE"),
    ("fulltext", "TEXT NOT NULL"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    fn bare(sql: String) -> Self {
        Self {
            sql,
            params: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextPolicy {
    #[default]
    Bind,
    /// Refuse text containing `'`, for consumers that splice stored text
    /// into SQL themselves.
    RejectQuotes,
}

#[derive(Debug)]
pub struct TableBuilder {
    table: String,
    policy: TextPolicy,
    registry: Vec<ColumnDecl>,
    present: HashSet<String>,
    rows: Vec<Vec<(String, Value)>>,
}

impl TableBuilder {
    pub fn new(table: &str, policy: TextPolicy) -> Result<Self> {
        let registry = BASE_COLUMNS
            .iter()
            .map(|(name, declaration)| ColumnDecl::new(*name, declaration))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            table: table.to_string(),
            policy,
            registry,
            present: HashSet::new(),
            rows: Vec::new(),
        })
    }

    pub fn record_count(&self) -> usize {
        self.rows.len()
    }

    pub fn push(&mut self, record: Record) -> Result<()> {
        for column in record.declared_columns() {
            if !self.registry.iter().any(|known| known.name == column.name) {
                self.registry.push(column.clone());
            }
        }

        let fields = record.fields();
        let mut seen = HashSet::new();
        for (column, value) in &fields {
            if !seen.insert(*column) {
                warn!(
                    table = %self.table,
                    column = *column,
                    "record supplies a column more than once; only the last value is stored"
                );
            }

            let Some(decl) = self.registry.iter().find(|known| known.name == *column) else {
                bail!("column {column} is not declared for table {}", self.table);
            };

            if self.policy == TextPolicy::RejectQuotes
                && decl.kind == ColumnKind::Text
                && matches!(value, Value::Text(text) if text.contains('\''))
            {
                bail!(
                    "text contains SQL quoting character (table {}, column {column})",
                    self.table
                );
            }
        }

        let row = fields
            .into_iter()
            .map(|(column, value)| {
                self.present.insert(column.to_string());
                (column.to_string(), value)
            })
            .collect();
        self.rows.push(row);

        Ok(())
    }

    /// Registry columns supplied by at least one record, in registry order.
    pub fn columns(&self) -> Vec<&ColumnDecl> {
        self.registry
            .iter()
            .filter(|column| self.present.contains(&column.name))
            .collect()
    }

    pub fn finish(self) -> Vec<Statement> {
        if self.rows.is_empty() {
            return Vec::new();
        }

        let table = quote_identifier(&self.table);
        let columns = self.columns();

        let mut statements = Vec::with_capacity(self.rows.len() + 2);
        statements.push(Statement::bare(format!("DROP TABLE IF EXISTS {table}")));

        let definitions = std::iter::once("id INTEGER PRIMARY KEY".to_string())
            .chain(
                columns
                    .iter()
                    .map(|column| format!("{} {}", quote_identifier(&column.name), column.declaration)),
            )
            .collect::<Vec<_>>()
            .join(", ");
        statements.push(Statement::bare(format!("CREATE TABLE {table} ({definitions})")));

        let column_list = columns
            .iter()
            .map(|column| quote_identifier(&column.name))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=columns.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let insert_sql = format!("INSERT INTO {table} ({column_list}) VALUES ({placeholders})");

        for row in &self.rows {
            let params = columns
                .iter()
                .map(|column| {
                    row.iter()
                        .rev()
                        .find(|(name, _)| *name == column.name)
                        .map(|(_, value)| value.clone())
                        .unwrap_or(Value::Null)
                })
                .collect();
            statements.push(Statement {
                sql: insert_sql.clone(),
                params,
            });
        }

        statements
    }
}

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
