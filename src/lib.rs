//! # relq
//!
//! Predicate trees compiled to parameterized SQL, with batched loading of
//! related entities.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use relq::prelude::*;
//!
//! let db = Relq::new(executor)
//!     .register::<Customer>()
//!     .register::<Order>();
//!
//! // SELECT a.id, a.customer_id, a.total, a.paid FROM orders a
//! //   WHERE (a.total > @_total_0_) AND (a.paid = @_paid_0_) ORDER BY a.total DESC LIMIT 20
//! let orders: Vec<Order> = db
//!     .query::<Order>()
//!     .r#where(field("total").gt(100) & field("paid"))
//!     .order_by_desc(field("total"))
//!     .take(20)
//!     .include::<Customer>("customer")
//!     .all()?;
//! ```
//!
//! Each `include` runs exactly one extra query, whatever the number of
//! returned items.
//!
//! ## Features
//!
//! | Feature   | Description                                   |
//! |-----------|-----------------------------------------------|
//! | `tracing` | `tracing` events for compiled SQL and lookups |
//! | `serde`   | Serialize/deserialize `SqlValue` and `Row`    |

mod include;
mod query;
mod relq;

pub use include::Nav;
pub use query::Query;
pub use relq::Relq;

// =============================================================================
// Root-level exports
// =============================================================================

/// Result type for relq operations
pub use relq_core::error::Result;

/// Error types
pub mod error {
    pub use relq_core::error::RelqError;
}

pub use relq_core::{
    AliasRegistry, AsyncExecutor, ClauseKind, ClauseNode, Clauses, CompiledQuery, Entity,
    EntitySchema, Evaluator, Executor, Expr, FieldDef, FieldRef, FieldType, ForeignKeyDef,
    FromSqlValue, KeyPart, KeyTuple, Navigate, NavigationDecl, NavigationOptions,
    NavigationResolver, ParamMap, PreparedLookup, RelqError, Row, RowSet, SchemaRegistry, SqlEnum,
    SqlValue, Statement, compile,
};

/// Predicate DSL.
///
/// ```rust,ignore
/// use relq::expr::{and, field, list};
///
/// and(field("status").eq("open"), list([1, 2, 3]).any(field("region")))
/// ```
pub use relq_core::expr;

/// Key derivation between navigations and their targets.
pub use relq_core::navigation::{JoinKeys, derive_join_keys};

/// Everything needed to declare entities and write queries.
pub mod prelude {
    pub use crate::{Nav, Query, Relq};

    pub use relq_core::expr::{
        and, any, assign, contains, ends_with, eq, field, field_of, fields, gt, gte, in_list,
        is_null_or_empty, is_null_or_white_space, list, lit, lt, lte, neq, not, or, starts_with,
    };
    pub use relq_core::{
        AsyncExecutor, ClauseNode, CompiledQuery, Entity, EntitySchema, Executor, Expr, FieldType,
        ForeignKeyDef, FromSqlValue, Navigate, NavigationDecl, RelqError, Row, RowSet,
        SqlEnum, SqlValue,
    };
}
