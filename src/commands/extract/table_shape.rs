//! Turns the ability modifiers table into typed rows.
//!
//! The header row decides the columns: its first caption is a score range
//! stored as `<caption>_min`/`<caption>_max`, ordinal captions (`1st`,
//! `2nd`, ...) become `level_<digit>`, everything is INTEGER. Data cells are
//! coerced to integers where possible and rows that do not line up with the
//! header are dropped.

use std::rc::Rc;

use anyhow::{Context, Result, bail};
use tracing::debug;

use super::dom::{Document, NodeId};
use super::records::{ColumnDecl, Record, Value};
use super::scan_sections::{ENTRY_HEADING, collapse_whitespace, find_heading};

pub(super) const TABLE_CAPTION: &str = "ABILITY MODIFIERS";
const DASH_GLYPH: &str = "\u{2014}";
const SPAN_PLACEHOLDER: &str = "?";

#[derive(Debug, Default)]
pub(super) struct TableShape {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

pub fn scan_ability_modifiers<F>(doc: &Document, document: &str, mut emit: F) -> Result<usize>
where
    F: FnMut(Record) -> Result<()>,
{
    let mut cursor = doc.cursor();
    find_heading(&mut cursor, doc, ENTRY_HEADING, TABLE_CAPTION, document)?;
    let first_row = cursor
        .seek(|node| doc.is_tag(node, "tr"))
        .with_context(|| format!("no table rows after \"{TABLE_CAPTION}\" in {document}"))?;

    let shape = read_table(doc, first_row)?;
    let columns: Rc<[ColumnDecl]> = derive_columns(&shape.header)?.into();

    let mut emitted = 0;
    for row in &shape.rows {
        let values = materialize_row(row)?;
        let values = columns
            .iter()
            .map(|column| column.name.clone())
            .zip(values)
            .collect();
        emit(Record::ModifierRow {
            columns: Rc::clone(&columns),
            values,
        })?;
        emitted += 1;
    }

    Ok(emitted)
}

/// Reads `first_row` and its sibling rows. The last header row seen wins.
pub(super) fn read_table(doc: &Document, first_row: NodeId) -> Result<TableShape> {
    let mut shape = TableShape::default();

    for row in doc.siblings_from(first_row) {
        if !doc.is_tag(row, "tr") {
            continue;
        }

        if let Some(first_cell) = doc.find_descendant(row, "th") {
            shape.header.clear();
            for cell in element_siblings(doc, first_cell) {
                match colspan(doc, cell)? {
                    Some(span) => shape
                        .header
                        .extend((0..span).map(|_| SPAN_PLACEHOLDER.to_string())),
                    None => shape
                        .header
                        .push(collapse_whitespace(&doc.text(cell)).to_lowercase()),
                }
            }
        } else if let Some(first_cell) = doc.find_descendant(row, "td") {
            let mut line = Vec::new();
            for cell in element_siblings(doc, first_cell) {
                match colspan(doc, cell)? {
                    Some(span) if span != shape.header.len() => {
                        line.extend((0..span).map(|_| Value::Null));
                    }
                    Some(_) => {}
                    None => line.push(coerce_cell(&doc.text(cell))),
                }
            }

            if line.len() == shape.header.len() {
                shape.rows.push(line);
            } else {
                debug!(
                    cells = line.len(),
                    header = shape.header.len(),
                    "dropping table row that does not match the header"
                );
            }
        }
    }

    Ok(shape)
}

fn element_siblings(doc: &Document, first: NodeId) -> Vec<NodeId> {
    doc.siblings_from(first)
        .into_iter()
        .filter(|node| doc.tag(*node).is_some())
        .collect()
}

fn colspan(doc: &Document, cell: NodeId) -> Result<Option<usize>> {
    let Some(raw) = doc.attr(cell, "colspan") else {
        return Ok(None);
    };
    let span = raw
        .trim()
        .parse::<usize>()
        .with_context(|| format!("invalid colspan value: {raw}"))?;
    Ok(Some(span))
}

pub(super) fn coerce_cell(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed == DASH_GLYPH {
        return Value::Integer(0);
    }

    match trimmed.parse::<i64>() {
        Ok(value) => Value::Integer(value),
        Err(_) => Value::Text(trimmed.to_string()),
    }
}

pub(super) fn derive_columns(header: &[String]) -> Result<Vec<ColumnDecl>> {
    let Some((range, rest)) = header.split_first() else {
        bail!("table has no header row");
    };

    let mut columns = vec![
        ColumnDecl::integer(format!("{range}_min")),
        ColumnDecl::integer(format!("{range}_max")),
    ];

    for caption in rest {
        let Some(lead) = caption.chars().next() else {
            bail!("empty header caption in table");
        };
        let name = if lead.is_ascii_digit() {
            format!("level_{lead}")
        } else {
            caption.clone()
        };
        columns.push(ColumnDecl::integer(name));
    }

    Ok(columns)
}

/// Splits the leading range cell into bounds and appends the other cells.
pub(super) fn materialize_row(row: &[Value]) -> Result<Vec<Value>> {
    let Some((range, rest)) = row.split_first() else {
        bail!("table row has no cells");
    };

    let (low, high) = split_range(range)?;
    let mut values = Vec::with_capacity(row.len() + 1);
    values.push(Value::Integer(low));
    values.push(Value::Integer(high));
    values.extend(rest.iter().cloned());
    Ok(values)
}

pub(super) fn split_range(value: &Value) -> Result<(i64, i64)> {
    match value {
        Value::Integer(single) => Ok((*single, *single)),
        Value::Text(text) => {
            let parts: Vec<&str> = text.split('-').collect();
            let [low, high] = parts.as_slice() else {
                bail!("malformed range cell: {text}");
            };
            let low = low
                .trim()
                .parse::<i64>()
                .with_context(|| format!("malformed range cell: {text}"))?;
            let high = high
                .trim()
                .parse::<i64>()
                .with_context(|| format!("malformed range cell: {text}"))?;
            Ok((low, high))
        }
        Value::Null => bail!("malformed range cell: spanned placeholder"),
    }
}
