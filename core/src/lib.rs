//! Core of relq: the query compiler and the relation resolver.
//!
//! Queries are declared as [`Clauses`] holding predicate trees built from the
//! small [`Expr`] DSL. [`compile`] turns them into a [`CompiledQuery`] (SQL text
//! plus a [`ParamMap`]); the [`NavigationResolver`] loads related entities for
//! `Reference` clauses with one batched lookup per reference.

pub mod alias;
pub mod clause;
pub mod compile;
pub mod entity;
pub mod error;
pub mod executor;
pub mod expr;
pub mod navigation;
pub mod params;
pub mod row;
pub mod schema;
pub mod trace;
pub mod value;

// Re-export key types and traits
pub use alias::AliasRegistry;
pub use clause::{ClauseKind, ClauseNode, Clauses};
pub use compile::{CompiledQuery, Evaluator, Statement, compile};
pub use entity::{Entity, Navigate};
pub use error::{RelqError, Result};
pub use executor::{AsyncExecutor, Executor};
pub use expr::{CompareOp, Expr, FieldRef, Method};
pub use navigation::{NavigationOptions, NavigationResolver, PreparedLookup};
pub use params::ParamMap;
pub use row::{Row, RowSet};
pub use schema::{EntitySchema, FieldDef, ForeignKeyDef, NavigationDecl, SchemaRegistry};
pub use value::{FieldType, FromSqlValue, KeyPart, KeyTuple, SqlEnum, SqlValue};
