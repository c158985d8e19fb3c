//! Comparison constructors (`=`, `<>`, `<`, `<=`, `>`, `>=`).

use super::{CompareOp, Expr};

/// Builds a comparison node.
pub fn compare(op: CompareOp, lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
    Expr::Compare {
        op,
        lhs: Box::new(lhs.into()),
        rhs: Box::new(rhs.into()),
    }
}

/// Create an equality condition (=)
///
/// # Example
/// ```ignore
/// // a.status = @_status_0_
/// let open = eq(field("status"), "open");
/// ```
pub fn eq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
    compare(CompareOp::Eq, lhs, rhs)
}

/// Create a not-equal condition (<>)
pub fn neq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
    compare(CompareOp::Neq, lhs, rhs)
}

/// Create a less-than condition (<)
pub fn lt(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
    compare(CompareOp::Lt, lhs, rhs)
}

/// Create a less-than-or-equal condition (<=)
pub fn lte(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
    compare(CompareOp::Lte, lhs, rhs)
}

/// Create a greater-than condition (>)
pub fn gt(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
    compare(CompareOp::Gt, lhs, rhs)
}

/// Create a greater-than-or-equal condition (>=)
pub fn gte(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
    compare(CompareOp::Gte, lhs, rhs)
}

#[allow(clippy::should_implement_trait)]
impl Expr {
    pub fn eq(self, rhs: impl Into<Expr>) -> Expr {
        eq(self, rhs)
    }

    pub fn neq(self, rhs: impl Into<Expr>) -> Expr {
        neq(self, rhs)
    }

    pub fn lt(self, rhs: impl Into<Expr>) -> Expr {
        lt(self, rhs)
    }

    pub fn lte(self, rhs: impl Into<Expr>) -> Expr {
        lte(self, rhs)
    }

    pub fn gt(self, rhs: impl Into<Expr>) -> Expr {
        gt(self, rhs)
    }

    pub fn gte(self, rhs: impl Into<Expr>) -> Expr {
        gte(self, rhs)
    }
}
