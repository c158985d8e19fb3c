//! Foreign-key navigation: batched loading of related entities.
//!
//! For one `Reference` clause over a set of source items the resolver
//!
//! 1. derives the key pairing between the source field and the target,
//! 2. compiles a single lookup over every distinct key tuple,
//! 3. executes it once and merges the rows back onto the items.
//!
//! ```ignore
//! let resolver = NavigationResolver::new(&registry);
//! resolver.resolve::<Order, Customer, _>(&ClauseNode::reference("customer"), &mut orders, &db)?;
//! ```

mod batch;
pub mod keys;
mod merge;
mod resolver;

pub use keys::{JoinKeys, derive_join_keys};
pub use resolver::{NavigationResolver, PreparedLookup};

use hashbrown::HashSet;

use crate::clause::{ClauseKind, ClauseNode};
use crate::entity::Entity;
use crate::error::{RelqError, Result};
use crate::expr::Expr;
use crate::schema::SchemaRegistry;
use crate::value::{KeyTuple, SqlValue};

/// Everything needed to load and attach one navigation for a batch of items.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationOptions {
    pub source_type: &'static str,
    pub reference_field: &'static str,
    pub reference_type: &'static str,
    pub is_collection: bool,
    /// Fields of the source holding the key values.
    pub reference_keys: Vec<&'static str>,
    /// Fields of the target matched against `reference_keys`.
    pub foreign_key_fields: Vec<&'static str>,
    /// Key values per source item, already converted to the types of
    /// `foreign_key_fields`. `None` when any component is absent or null.
    pub item_keys: Vec<Option<Vec<SqlValue>>>,
}

impl NavigationOptions {
    /// Derives the options for `node`, a `Reference` clause on `S`, over `items`.
    pub fn derive<S: Entity, R: Entity>(
        node: &ClauseNode,
        items: &[S],
        registry: &SchemaRegistry,
    ) -> Result<Self> {
        if node.kind != ClauseKind::Reference {
            return Err(RelqError::Compile(format!(
                "expected a Reference clause, found {:?}",
                node.kind
            )));
        }
        let Expr::Field(field) = &node.ast else {
            return Err(RelqError::Compile(
                "a Reference clause must name a navigation field".to_owned(),
            ));
        };
        if field.entity.is_some_and(|entity| entity != S::NAME) {
            return Err(RelqError::Compile(format!(
                "Reference `{}` does not belong to `{}`",
                field.name,
                S::NAME
            )));
        }

        let source = registry.get(S::NAME)?;
        let target = registry.get(R::NAME)?;
        let def = source.require_field(&field.name)?;
        let decl = source.navigation_decl(def.name)?;
        let keys = derive_join_keys(source, def.name, target)?;

        let key_types = keys
            .foreign_key_fields
            .iter()
            .map(|name| target.require_field(name).map(|f| f.ty))
            .collect::<Result<Vec<_>>>()?;

        let mut item_keys = Vec::with_capacity(items.len());
        for item in items {
            let mut values = Vec::with_capacity(keys.reference_keys.len());
            for (name, ty) in keys.reference_keys.iter().zip(&key_types) {
                // a value the foreign-key type cannot hold never matches a row
                match item.get_field(name).filter(|v| !v.is_null()).map(|v| v.coerce(*ty)) {
                    Some(Ok(value)) => values.push(value),
                    _ => break,
                }
            }
            item_keys.push((values.len() == keys.reference_keys.len()).then_some(values));
        }

        Ok(Self {
            source_type: S::NAME,
            reference_field: def.name,
            reference_type: R::NAME,
            is_collection: decl.is_collection,
            reference_keys: keys.reference_keys,
            foreign_key_fields: keys.foreign_key_fields,
            item_keys,
        })
    }

    /// Distinct key tuples in first-seen order.
    pub fn distinct_keys(&self) -> Vec<&[SqlValue]> {
        let mut seen = HashSet::new();
        self.item_keys
            .iter()
            .flatten()
            .filter(|values| seen.insert(key_tuple(values)))
            .map(Vec::as_slice)
            .collect()
    }

    /// Whether at least one item carries a complete key.
    pub fn has_keys(&self) -> bool {
        self.item_keys.iter().any(Option::is_some)
    }
}

/// Normalized key of one value list; equal numbers of different widths match.
pub fn key_tuple(values: &[SqlValue]) -> KeyTuple {
    values.iter().map(SqlValue::key_part).collect()
}
