use crate::clause::{ClauseKind, ClauseNode, Clauses};
use crate::compile::{CompiledQuery, compile};
use crate::error::{RelqError, Result};
use crate::expr::{all, any_of, eq, field, lit};
use crate::schema::SchemaRegistry;

use super::NavigationOptions;

/// Clauses of the lookup: one OR of per-item ANDs over the foreign-key
/// fields, followed by the child constraints of the reference.
///
/// `None` when no item carries a key.
pub(crate) fn lookup_clauses(
    options: &NavigationOptions,
    children: &[ClauseNode],
) -> Result<Option<Clauses>> {
    let per_item = options.distinct_keys().into_iter().filter_map(|values| {
        all(options
            .foreign_key_fields
            .iter()
            .zip(values)
            .map(|(fk, value)| eq(field(*fk), lit(value.clone()))))
    });
    let Some(predicate) = any_of(per_item) else {
        return Ok(None);
    };

    let mut clauses = Clauses::new().with(ClauseNode::r#where(predicate));
    for child in children {
        match child.kind {
            ClauseKind::Where | ClauseKind::OrderBy | ClauseKind::OrderByDescending => {
                clauses.push(child.clone());
            }
            other => {
                return Err(RelqError::Compile(format!(
                    "{other:?} cannot constrain the `{}` reference",
                    options.reference_field
                )));
            }
        }
    }
    Ok(Some(clauses))
}

/// Compiles the lookup rooted at the target entity.
pub(crate) fn compile_lookup(
    options: &NavigationOptions,
    children: &[ClauseNode],
    registry: &SchemaRegistry,
) -> Result<Option<CompiledQuery>> {
    lookup_clauses(options, children)?
        .map(|clauses| compile(&clauses, options.reference_type, registry))
        .transpose()
}
