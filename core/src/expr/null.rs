//! Null checks.

use super::{Expr, Method, call};

/// `target IS NULL`; `IS NOT NULL` under [`not`](super::not).
pub fn is_null_or_empty(target: impl Into<Expr>) -> Expr {
    call(Method::IsNullOrEmpty, target, Vec::new())
}

/// Same mapping as [`is_null_or_empty`].
pub fn is_null_or_white_space(target: impl Into<Expr>) -> Expr {
    call(Method::IsNullOrWhiteSpace, target, Vec::new())
}

impl Expr {
    pub fn is_null_or_empty(self) -> Expr {
        is_null_or_empty(self)
    }

    pub fn is_null_or_white_space(self) -> Expr {
        is_null_or_white_space(self)
    }
}
