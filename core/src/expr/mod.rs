//! The predicate DSL.
//!
//! A small closed AST covering exactly what the evaluator can translate:
//!
//! ```ignore
//! // Function style
//! and(eq(field("status"), "open"), gt(field("total"), 100))
//!
//! // Method and operator style
//! field("status").eq("open") & field("total").gt(100)
//! field("name").starts_with("Ac") | !field("archived")
//! ```

mod cmp;
mod logical;
mod null;
mod set;
mod string;

pub use cmp::*;
pub use logical::*;
pub use null::*;
pub use set::*;
pub use string::*;

use compact_str::CompactString;

use crate::entity::Entity;
use crate::value::SqlValue;

// =============================================================================
// AST
// =============================================================================

/// Reference to a logical field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    /// Owning entity; `None` is the entity the query is rooted at.
    pub entity: Option<&'static str>,
    pub name: CompactString,
}

impl FieldRef {
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            entity: None,
            name: name.into(),
        }
    }

    pub fn of(entity: &'static str, name: impl Into<CompactString>) -> Self {
        Self {
            entity: Some(entity),
            name: name.into(),
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    pub const fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Neq => "<>",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
        }
    }

    /// The operator with its operands swapped: `5 < x` is `x > 5`.
    pub const fn mirrored(self) -> Self {
        match self {
            CompareOp::Lt => CompareOp::Gt,
            CompareOp::Lte => CompareOp::Gte,
            CompareOp::Gt => CompareOp::Lt,
            CompareOp::Gte => CompareOp::Lte,
            other => other,
        }
    }
}

/// Method calls recognised in predicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Contains,
    Any,
    StartsWith,
    EndsWith,
    IsNullOrEmpty,
    IsNullOrWhiteSpace,
    /// A method with no SQL mapping, kept so the evaluator can name it.
    Named(CompactString),
}

impl Method {
    pub fn name(&self) -> &str {
        match self {
            Method::Contains => "Contains",
            Method::Any => "Any",
            Method::StartsWith => "StartsWith",
            Method::EndsWith => "EndsWith",
            Method::IsNullOrEmpty => "IsNullOrEmpty",
            Method::IsNullOrWhiteSpace => "IsNullOrWhiteSpace",
            Method::Named(name) => name,
        }
    }
}

/// A predicate or projection tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Field(FieldRef),
    Literal(SqlValue),
    /// A literal collection, used with `Contains`/`Any`.
    List(Vec<SqlValue>),
    /// An array of fields, used for compound ordering and grouping.
    Fields(Vec<FieldRef>),
    Compare {
        op: CompareOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Call {
        method: Method,
        target: Box<Expr>,
        args: Vec<Expr>,
    },
    /// Field assignments of a SET clause.
    Assign(Vec<(FieldRef, Expr)>),
    /// `*`, as in `COUNT(*)`.
    All,
}

// =============================================================================
// Leaf constructors
// =============================================================================

/// A field of the entity the query is rooted at.
pub fn field(name: impl Into<CompactString>) -> Expr {
    Expr::Field(FieldRef::new(name))
}

/// A field of another entity, for predicates over joined tables.
pub fn field_of<T: Entity>(name: impl Into<CompactString>) -> Expr {
    Expr::Field(FieldRef::of(T::NAME, name))
}

/// An array of root fields, for compound `OrderBy`/`GroupBy`/`DistinctBy`.
pub fn fields<I, S>(names: I) -> Expr
where
    I: IntoIterator<Item = S>,
    S: Into<CompactString>,
{
    Expr::Fields(names.into_iter().map(FieldRef::new).collect())
}

pub fn lit(value: impl Into<SqlValue>) -> Expr {
    Expr::Literal(value.into())
}

/// SET assignments from `(field, value)` pairs.
pub fn assign<I, S, E>(pairs: I) -> Expr
where
    I: IntoIterator<Item = (S, E)>,
    S: Into<CompactString>,
    E: Into<Expr>,
{
    Expr::Assign(
        pairs
            .into_iter()
            .map(|(name, value)| (FieldRef::new(name), value.into()))
            .collect(),
    )
}

impl From<FieldRef> for Expr {
    fn from(value: FieldRef) -> Self {
        Expr::Field(value)
    }
}

impl From<SqlValue> for Expr {
    fn from(value: SqlValue) -> Self {
        Expr::Literal(value)
    }
}

macro_rules! impl_literal_expr {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Expr {
                fn from(value: $ty) -> Self {
                    Expr::Literal(SqlValue::from(value))
                }
            }
        )*
    };
}

impl_literal_expr!(bool, i32, i64, u32, u64, f64, &str, String);

impl Expr {
    /// Whether this node is an `And`/`Or` connective.
    pub const fn is_connective(&self) -> bool {
        matches!(self, Expr::And(..) | Expr::Or(..))
    }
}
