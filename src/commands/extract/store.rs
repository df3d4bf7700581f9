use anyhow::{Context, Result};
use rusqlite::{Connection, params_from_iter};

use super::statements::{Statement, quote_identifier};

pub fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

/// Runs one table's statement sequence in order and commits once. Nothing is
/// kept if any statement fails, so the table is never left dropped.
pub fn execute_table(
    connection: &mut Connection,
    table: &str,
    statements: &[Statement],
) -> Result<usize> {
    let tx = connection
        .transaction()
        .with_context(|| format!("failed to begin transaction for {table}"))?;

    for (index, statement) in statements.iter().enumerate() {
        let mut prepared = tx
            .prepare_cached(&statement.sql)
            .with_context(|| format!("failed to prepare statement {index} for {table}"))?;
        prepared
            .execute(params_from_iter(statement.params.iter()))
            .with_context(|| format!("statement {index} failed for {table}: {}", statement.sql))?;
    }

    tx.commit()
        .with_context(|| format!("failed to commit {table}"))?;
    Ok(statements.len())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub declared_type: String,
}

#[derive(Debug, Clone)]
pub struct TableDescription {
    pub columns: Vec<ColumnInfo>,
    pub row_count: i64,
}

/// Column names/types and row count, or `None` when the table is absent.
pub fn describe_table(connection: &Connection, table: &str) -> Result<Option<TableDescription>> {
    let exists: i64 = connection
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )
        .with_context(|| format!("failed to look up table {table}"))?;
    if exists == 0 {
        return Ok(None);
    }

    let pragma_sql = format!("PRAGMA table_info({})", quote_identifier(table));
    let mut statement = connection
        .prepare(&pragma_sql)
        .with_context(|| format!("failed to inspect schema for table {table}"))?;

    let mut columns = Vec::new();
    let mut rows = statement.query([])?;
    while let Some(row) = rows.next()? {
        columns.push(ColumnInfo {
            name: row.get(1)?,
            declared_type: row.get(2)?,
        });
    }

    let count_sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
    let row_count = connection
        .query_row(&count_sql, [], |row| row.get(0))
        .with_context(|| format!("failed to count rows in {table}"))?;

    Ok(Some(TableDescription { columns, row_count }))
}
