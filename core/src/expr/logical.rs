//! Logical connectives (AND, OR, NOT).
//!
//! ```ignore
//! // Function style
//! and(condition1, condition2)
//! or(condition1, condition2)
//! not(condition)
//!
//! // Operator style (via std::ops traits)
//! condition1 & condition2   // BitAnd
//! condition1 | condition2   // BitOr
//! !condition                // Not
//! ```

use core::ops::{BitAnd, BitOr, Not};

use super::Expr;

pub fn and(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
    Expr::And(Box::new(lhs.into()), Box::new(rhs.into()))
}

pub fn or(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
    Expr::Or(Box::new(lhs.into()), Box::new(rhs.into()))
}

pub fn not(expr: impl Into<Expr>) -> Expr {
    Expr::Not(Box::new(expr.into()))
}

/// Left-deep AND of every condition; `None` when the iterator is empty.
pub fn all<I: IntoIterator<Item = Expr>>(conditions: I) -> Option<Expr> {
    conditions.into_iter().reduce(|l, r| and(l, r))
}

/// Left-deep OR of every condition; `None` when the iterator is empty.
pub fn any_of<I: IntoIterator<Item = Expr>>(conditions: I) -> Option<Expr> {
    conditions.into_iter().reduce(|l, r| or(l, r))
}

impl Expr {
    pub fn and(self, rhs: impl Into<Expr>) -> Expr {
        and(self, rhs)
    }

    pub fn or(self, rhs: impl Into<Expr>) -> Expr {
        or(self, rhs)
    }
}

impl BitAnd for Expr {
    type Output = Expr;

    fn bitand(self, rhs: Expr) -> Expr {
        and(self, rhs)
    }
}

impl BitOr for Expr {
    type Output = Expr;

    fn bitor(self, rhs: Expr) -> Expr {
        or(self, rhs)
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        not(self)
    }
}
