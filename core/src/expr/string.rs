//! String predicates, compiled to `LIKE`.

use super::{Expr, Method};

/// Builds a method-call node on `target`.
pub fn call(method: Method, target: impl Into<Expr>, args: Vec<Expr>) -> Expr {
    Expr::Call {
        method,
        target: Box::new(target.into()),
        args,
    }
}

/// `target LIKE '%pattern%'` for a text field, or list membership when
/// `target` is a literal list (see [`list`](super::list)).
pub fn contains(target: impl Into<Expr>, arg: impl Into<Expr>) -> Expr {
    call(Method::Contains, target, vec![arg.into()])
}

/// `target LIKE 'pattern%'`
pub fn starts_with(target: impl Into<Expr>, prefix: impl Into<Expr>) -> Expr {
    call(Method::StartsWith, target, vec![prefix.into()])
}

/// `target LIKE '%pattern'`
pub fn ends_with(target: impl Into<Expr>, suffix: impl Into<Expr>) -> Expr {
    call(Method::EndsWith, target, vec![suffix.into()])
}

impl Expr {
    pub fn contains(self, arg: impl Into<Expr>) -> Expr {
        contains(self, arg)
    }

    pub fn starts_with(self, prefix: impl Into<Expr>) -> Expr {
        starts_with(self, prefix)
    }

    pub fn ends_with(self, suffix: impl Into<Expr>) -> Expr {
        ends_with(self, suffix)
    }

    /// A call to a method by name. Names with no SQL mapping are rejected
    /// when the predicate is compiled.
    pub fn method(self, name: &str, args: Vec<Expr>) -> Expr {
        let method = match name {
            "Contains" => Method::Contains,
            "Any" => Method::Any,
            "StartsWith" => Method::StartsWith,
            "EndsWith" => Method::EndsWith,
            "IsNullOrEmpty" => Method::IsNullOrEmpty,
            "IsNullOrWhiteSpace" => Method::IsNullOrWhiteSpace,
            other => Method::Named(other.into()),
        };
        call(method, self, args)
    }
}
