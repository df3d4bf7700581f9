use std::rc::Rc;

use anyhow::{Result, bail};
use rusqlite::ToSql;
use rusqlite::types::{Null, ToSqlOutput};

/// A single cell or field value bound into an insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Text(String),
    Null,
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Integer(value) => ToSqlOutput::from(*value),
            Value::Text(value) => ToSqlOutput::from(value.as_str()),
            Value::Null => ToSqlOutput::from(Null),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
}

/// A column name with its SQL type declaration, e.g. `TEXT NOT NULL UNIQUE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDecl {
    pub name: String,
    pub declaration: String,
    pub kind: ColumnKind,
}

impl ColumnDecl {
    pub fn new(name: impl Into<String>, declaration: &str) -> Result<Self> {
        let name = name.into();
        let kind = if declaration.starts_with("TEXT") {
            ColumnKind::Text
        } else if declaration.starts_with("INTEGER") {
            ColumnKind::Integer
        } else {
            bail!("data type '{declaration}' needs handling (column {name})");
        };

        Ok(Self {
            name,
            declaration: declaration.to_string(),
            kind,
        })
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declaration: "INTEGER".to_string(),
            kind: ColumnKind::Integer,
        }
    }
}

/// One extracted entry, shaped by the document it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    SpecialAbility {
        name: String,
        fulltext: String,
    },
    Condition {
        name: String,
        fulltext: String,
    },
    Ability {
        name: String,
        shortname: String,
        fulltext: String,
    },
    ModifierRow {
        columns: Rc<[ColumnDecl]>,
        values: Vec<(String, Value)>,
    },
}

impl Record {
    /// Field values in the order the scanner supplied them.
    pub fn fields(&self) -> Vec<(&str, Value)> {
        match self {
            Record::SpecialAbility { name, fulltext } | Record::Condition { name, fulltext } => {
                vec![
                    ("name", Value::Text(name.clone())),
                    ("fulltext", Value::Text(fulltext.clone())),
                ]
            }
            Record::Ability {
                name,
                shortname,
                fulltext,
            } => vec![
                ("name", Value::Text(name.clone())),
                ("shortname", Value::Text(shortname.clone())),
                ("fulltext", Value::Text(fulltext.clone())),
            ],
            Record::ModifierRow { values, .. } => values
                .iter()
                .map(|(column, value)| (column.as_str(), value.clone()))
                .collect(),
        }
    }

    /// Columns the record declares beyond the fixed base schema.
    pub fn declared_columns(&self) -> &[ColumnDecl] {
        match self {
            Record::ModifierRow { columns, .. } => columns,
            _ => &[],
        }
    }
}
