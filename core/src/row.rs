//! Rows returned by the execution collaborator.

use crate::error::{RelqError, Result};
use crate::schema::EntitySchema;
use crate::value::{FromSqlValue, SqlValue};

/// One result row: ordered `(column, value)` pairs keyed by physical column name.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

/// The rows of one executed query.
pub type RowSet = Vec<Row>;

impl Row {
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Builder-style column append.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) {
        self.columns.push((column.into(), value.into()));
    }

    /// Value of a physical column.
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Value of a logical field, resolved to its column through `schema`.
    pub fn value_of(&self, schema: &EntitySchema, field: &str) -> Result<&SqlValue> {
        let def = schema.require_field(field)?;
        self.get(def.column).ok_or_else(|| {
            RelqError::Mapping(format!(
                "row for `{}` has no column `{}`",
                schema.entity, def.column
            ))
        })
    }

    /// Reads a logical field and converts it to `T`.
    pub fn get_as<T: FromSqlValue>(&self, schema: &EntitySchema, field: &str) -> Result<T> {
        T::from_sql_value(self.value_of(schema, field)?)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<C: Into<String>, V: Into<SqlValue>> FromIterator<(C, V)> for Row {
    fn from_iter<T: IntoIterator<Item = (C, V)>>(iter: T) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(column, value)| (column.into(), value.into()))
                .collect(),
        }
    }
}
