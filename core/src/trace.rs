//! Tracing utilities for query and relation-loading observability.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level tracing event with the SQL text and parameter count.
///
/// ```ignore
/// relq_trace_query!(&compiled.sql, compiled.params.len());
/// ```
#[macro_export]
macro_rules! relq_trace_query {
    ($sql:expr, $param_count:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(sql = %$sql, params = $param_count, "relq.query");
    };
}

/// Emit a debug-level tracing event for one relation lookup.
///
/// ```ignore
/// relq_trace_resolve!("customer", items.len(), keys.len());
/// ```
#[macro_export]
macro_rules! relq_trace_resolve {
    ($field:expr, $items:expr, $keys:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(field = %$field, items = $items, keys = $keys, "relq.resolve");
    };
}
