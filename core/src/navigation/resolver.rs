use crate::clause::ClauseNode;
use crate::compile::CompiledQuery;
use crate::entity::{Entity, Navigate};
use crate::error::Result;
use crate::executor::{AsyncExecutor, Executor};
use crate::row::Row;
use crate::schema::SchemaRegistry;

use super::NavigationOptions;
use super::batch::compile_lookup;
use super::merge::merge_rows;

/// A compiled lookup waiting for its rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedLookup {
    pub options: NavigationOptions,
    /// `None` when no source item carries a key; nothing is executed then.
    pub query: Option<CompiledQuery>,
}

impl PreparedLookup {
    pub fn query(&self) -> Option<&CompiledQuery> {
        self.query.as_ref()
    }
}

/// Loads navigation fields for batches of items.
#[derive(Debug, Clone, Copy)]
pub struct NavigationResolver<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> NavigationResolver<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    /// Derives keys and compiles the single lookup for `node` over `items`.
    pub fn prepare<S: Entity, R: Entity>(
        &self,
        node: &ClauseNode,
        items: &[S],
    ) -> Result<PreparedLookup> {
        let options = NavigationOptions::derive::<S, R>(node, items, self.registry)?;
        let query = compile_lookup(&options, &node.children, self.registry)?;
        Ok(PreparedLookup { options, query })
    }

    /// Attaches the rows returned for `lookup` onto `items`.
    pub fn merge<S, R>(
        &self,
        lookup: &PreparedLookup,
        rows: &[Row],
        items: &mut [S],
    ) -> Result<()>
    where
        S: Navigate<R>,
        R: Entity + Clone,
    {
        let target = self.registry.get(lookup.options.reference_type)?;
        crate::relq_trace_resolve!(
            lookup.options.reference_field,
            items.len(),
            lookup.options.distinct_keys().len()
        );
        merge_rows::<S, R>(&lookup.options, target, rows, items)
    }

    /// Resolves `node` over `items` with one query on `executor`.
    pub fn resolve<S, R, E>(
        &self,
        node: &ClauseNode,
        items: &mut [S],
        executor: &E,
    ) -> Result<()>
    where
        S: Entity + Navigate<R>,
        R: Entity + Clone,
        E: Executor + ?Sized,
    {
        let lookup = self.prepare::<S, R>(node, items)?;
        let rows = match lookup.query() {
            Some(query) => executor.query(query)?,
            None => Vec::new(),
        };
        self.merge::<S, R>(&lookup, &rows, items)
    }

    /// Async variant of [`resolve`](Self::resolve). Items are only touched
    /// once the whole result set has arrived.
    pub async fn resolve_async<S, R, E>(
        &self,
        node: &ClauseNode,
        items: &mut [S],
        executor: &E,
    ) -> Result<()>
    where
        S: Entity + Navigate<R>,
        R: Entity + Clone,
        E: AsyncExecutor,
    {
        let lookup = self.prepare::<S, R>(node, items)?;
        let rows = match lookup.query() {
            Some(query) => executor.query(query).await?,
            None => Vec::new(),
        };
        self.merge::<S, R>(&lookup, &rows, items)
    }
}
