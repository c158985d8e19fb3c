//! The expression evaluator: clause model + schema → SQL text + parameters.
//!
//! Assembly order is fixed:
//!
//! ```text
//! SELECT/UPDATE projection → FROM/table → Reference joins → SET → WHERE
//!   → ORDER BY → GROUP BY → LIMIT
//! ```
//!
//! Fragments are evaluated in that same order so generated parameter names
//! appear in text order.

mod evaluator;
mod predicate;
mod projection;

pub use evaluator::Evaluator;

use core::fmt;

use crate::clause::Clauses;
use crate::error::Result;
use crate::params::ParamMap;
use crate::schema::SchemaRegistry;
use crate::value::SqlValue;

/// Kind of statement a compile produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statement {
    /// Returns rows.
    Select,
    /// Returns a single `COUNT` row.
    Count,
    /// Returns an affected-row count.
    Update,
}

/// SQL text plus its named parameter bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: ParamMap,
    /// Table bound to alias `a`.
    pub table: &'static str,
    pub statement: Statement,
}

impl CompiledQuery {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &ParamMap {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&SqlValue> {
        self.params.get(name)
    }

    /// SQL with every parameter replaced by its literal rendering.
    ///
    /// Meant for logs and debugging; always execute `sql` with `params`.
    pub fn inline(&self) -> String {
        // `@_a_1_` is a prefix of `@_a_1_0_`: substitute longer names first
        let mut params: Vec<_> = self.params.iter().collect();
        params.sort_by_key(|(name, _)| std::cmp::Reverse(name.len()));
        let mut text = self.sql.clone();
        for (name, value) in params {
            text = text.replace(name, &value.to_string());
        }
        text
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Compiles `clauses` into a query rooted at `root_entity`.
pub fn compile(
    clauses: &Clauses,
    root_entity: &str,
    registry: &SchemaRegistry,
) -> Result<CompiledQuery> {
    let compiled = Evaluator::new(root_entity, registry)?.compile(clauses)?;
    crate::relq_trace_query!(&compiled.sql, compiled.params.len());
    Ok(compiled)
}
