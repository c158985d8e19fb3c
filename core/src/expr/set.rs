//! Membership in literal collections, compiled to `FIND_IN_SET`.

use super::{Expr, Method, call};
use crate::value::SqlValue;

/// A literal collection.
pub fn list<I, V>(values: I) -> Expr
where
    I: IntoIterator<Item = V>,
    V: Into<SqlValue>,
{
    Expr::List(values.into_iter().map(Into::into).collect())
}

/// `values.Any(v => v == field)`: membership of `field` in the literal list.
pub fn any(values: impl Into<Expr>, field: impl Into<Expr>) -> Expr {
    call(Method::Any, values, vec![field.into()])
}

/// `values.Contains(field)`: membership of `field` in the literal list.
pub fn in_list(values: impl Into<Expr>, field: impl Into<Expr>) -> Expr {
    call(Method::Contains, values, vec![field.into()])
}

impl Expr {
    pub fn any(self, field: impl Into<Expr>) -> Expr {
        any(self, field)
    }
}
