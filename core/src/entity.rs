//! Capability traits implemented per entity type.
//!
//! These replace runtime reflection: each entity hands out its schema
//! descriptor, builds itself from a row and exposes its fields by name.

use crate::error::Result;
use crate::row::Row;
use crate::schema::EntitySchema;
use crate::value::SqlValue;

/// An entity type known to the schema registry.
pub trait Entity: Sized {
    /// Unique entity name, used as the registry key.
    const NAME: &'static str;

    /// Builds the schema descriptor. Called once per registry.
    fn schema() -> EntitySchema;

    /// Materializes one instance from a result row.
    fn from_row(row: &Row, schema: &EntitySchema) -> Result<Self>;

    /// Reads a stored field by logical name. `None` for unknown fields.
    fn get_field(&self, name: &str) -> Option<SqlValue>;
}

/// Typed setter for the navigation fields of `Self` that hold `R` values.
pub trait Navigate<R: Entity> {
    /// Assigns a single-valued navigation.
    fn set_reference(&mut self, field: &str, value: Option<R>) -> Result<()>;

    /// Assigns a collection-valued navigation.
    fn set_collection(&mut self, field: &str, values: Vec<R>) -> Result<()>;
}
