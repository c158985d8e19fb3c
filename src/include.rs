use std::marker::PhantomData;

use compact_str::CompactString;
use relq_core::{
    ClauseKind, ClauseNode, Entity, Expr, Navigate, NavigationResolver, PreparedLookup, Result,
    Row,
};

//------------------------------------------------------------------------------
// Nav - constraints on an included relation
//------------------------------------------------------------------------------

/// Builder for the constraints of one included navigation.
///
/// Predicates and orderings are written against the related entity `R`:
///
/// ```ignore
/// db.query::<Customer>()
///     .include_with::<Order>("orders", |nav| nav.r#where(field("paid").eq(true)))
/// ```
#[derive(Debug, Clone)]
pub struct Nav<R> {
    node: ClauseNode,
    _target: PhantomData<fn() -> R>,
}

impl<R: Entity> Nav<R> {
    pub(crate) fn new(field: impl Into<CompactString>) -> Self {
        Self {
            node: ClauseNode::reference(field),
            _target: PhantomData,
        }
    }

    pub fn r#where(mut self, predicate: impl Into<Expr>) -> Self {
        self.node
            .children
            .push(ClauseNode::r#where(predicate.into()));
        self
    }

    pub fn order_by(mut self, projection: impl Into<Expr>) -> Self {
        self.node
            .children
            .push(ClauseNode::order_by(projection.into()));
        self
    }

    pub fn order_by_desc(mut self, projection: impl Into<Expr>) -> Self {
        self.node
            .children
            .push(ClauseNode::order_by_desc(projection.into()));
        self
    }

    pub(crate) fn into_node(self) -> ClauseNode {
        self.node
    }
}

//------------------------------------------------------------------------------
// Loader - type-erased include
//------------------------------------------------------------------------------

/// One included navigation of a query over `S`, with its target type erased.
pub(crate) trait Loader<S>: Send + Sync {
    fn prepare(&self, resolver: &NavigationResolver<'_>, items: &[S]) -> Result<PreparedLookup>;

    fn merge(
        &self,
        resolver: &NavigationResolver<'_>,
        lookup: &PreparedLookup,
        rows: &[Row],
        items: &mut [S],
    ) -> Result<()>;
}

pub(crate) struct Include<R> {
    node: ClauseNode,
    _target: PhantomData<fn() -> R>,
}

impl<R> Include<R> {
    pub(crate) fn new(node: ClauseNode) -> Self {
        debug_assert_eq!(node.kind, ClauseKind::Reference);
        Self {
            node,
            _target: PhantomData,
        }
    }
}

impl<S, R> Loader<S> for Include<R>
where
    S: Entity + Navigate<R>,
    R: Entity + Clone,
{
    fn prepare(&self, resolver: &NavigationResolver<'_>, items: &[S]) -> Result<PreparedLookup> {
        resolver.prepare::<S, R>(&self.node, items)
    }

    fn merge(
        &self,
        resolver: &NavigationResolver<'_>,
        lookup: &PreparedLookup,
        rows: &[Row],
        items: &mut [S],
    ) -> Result<()> {
        resolver.merge::<S, R>(lookup, rows, items)
    }
}
