//! The clause model: an ordered, keyed collection of clause nodes.

use crate::expr::Expr;

/// Kind of a clause node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    Where,
    OrderBy,
    OrderByDescending,
    Set,
    GroupBy,
    DistinctBy,
    Limit,
    Count,
    Reference,
}

impl ClauseKind {
    /// Singleton kinds hold at most one node per query; `Where` and
    /// `Reference` accumulate.
    pub const fn is_singleton(self) -> bool {
        !matches!(self, ClauseKind::Where | ClauseKind::Reference)
    }
}

/// One unit of query intent plus any sub-constraints.
///
/// Children only appear on `Reference` nodes, where they constrain the
/// related entity rather than the source.
#[derive(Debug, Clone, PartialEq)]
pub struct ClauseNode {
    pub kind: ClauseKind,
    pub ast: Expr,
    pub children: Vec<ClauseNode>,
}

impl ClauseNode {
    pub fn new(kind: ClauseKind, ast: Expr) -> Self {
        Self {
            kind,
            ast,
            children: Vec::new(),
        }
    }

    pub fn r#where(predicate: Expr) -> Self {
        Self::new(ClauseKind::Where, predicate)
    }

    pub fn order_by(projection: Expr) -> Self {
        Self::new(ClauseKind::OrderBy, projection)
    }

    pub fn order_by_desc(projection: Expr) -> Self {
        Self::new(ClauseKind::OrderByDescending, projection)
    }

    pub fn group_by(projection: Expr) -> Self {
        Self::new(ClauseKind::GroupBy, projection)
    }

    pub fn distinct_by(projection: Expr) -> Self {
        Self::new(ClauseKind::DistinctBy, projection)
    }

    pub fn set(assignments: Expr) -> Self {
        Self::new(ClauseKind::Set, assignments)
    }

    pub fn limit(count: Expr) -> Self {
        Self::new(ClauseKind::Limit, count)
    }

    pub fn count(projection: Expr) -> Self {
        Self::new(ClauseKind::Count, projection)
    }

    /// A relationship reference through navigation field `field` of the
    /// root entity.
    pub fn reference(field: impl Into<compact_str::CompactString>) -> Self {
        Self::new(ClauseKind::Reference, crate::expr::field(field))
    }

    pub fn with_child(mut self, child: ClauseNode) -> Self {
        self.children.push(child);
        self
    }
}

/// Clause nodes of one query, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clauses {
    nodes: Vec<ClauseNode>,
}

impl Clauses {
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Registers a node. A singleton kind replaces the existing node of the
    /// same kind in place.
    pub fn push(&mut self, node: ClauseNode) {
        if node.kind.is_singleton() {
            if let Some(existing) = self.nodes.iter_mut().find(|n| n.kind == node.kind) {
                *existing = node;
                return;
            }
        }
        self.nodes.push(node);
    }

    pub fn with(mut self, node: ClauseNode) -> Self {
        self.push(node);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClauseNode> {
        self.nodes.iter()
    }

    pub fn of_kind(&self, kind: ClauseKind) -> impl Iterator<Item = &ClauseNode> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    pub fn first(&self, kind: ClauseKind) -> Option<&ClauseNode> {
        self.of_kind(kind).next()
    }

    pub fn has(&self, kind: ClauseKind) -> bool {
        self.first(kind).is_some()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Moves every node out, leaving an empty model behind.
    pub fn take(&mut self) -> Clauses {
        core::mem::take(self)
    }
}

impl Extend<ClauseNode> for Clauses {
    fn extend<T: IntoIterator<Item = ClauseNode>>(&mut self, iter: T) {
        for node in iter {
            self.push(node);
        }
    }
}

impl FromIterator<ClauseNode> for Clauses {
    fn from_iter<T: IntoIterator<Item = ClauseNode>>(iter: T) -> Self {
        let mut clauses = Clauses::new();
        clauses.extend(iter);
        clauses
    }
}
