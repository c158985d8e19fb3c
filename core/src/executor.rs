//! The execution collaborator: runs compiled queries against a database.
//!
//! Drivers are out of scope for relq; anything able to run a
//! [`CompiledQuery`] with its named parameters can implement these traits.
//! Errors are returned unchanged to the caller.

use core::future::Future;

use crate::compile::CompiledQuery;
use crate::error::Result;
use crate::row::RowSet;

/// Blocking execution.
pub trait Executor {
    /// Runs a `Select`/`Count` query and returns every row.
    fn query(&self, query: &CompiledQuery) -> Result<RowSet>;

    /// Runs an `Update` and returns the affected-row count.
    fn execute(&self, query: &CompiledQuery) -> Result<u64>;
}

/// Async execution. Dropping a returned future cancels the call.
pub trait AsyncExecutor: Sync {
    fn query(&self, query: &CompiledQuery) -> impl Future<Output = Result<RowSet>> + Send;

    fn execute(&self, query: &CompiledQuery) -> impl Future<Output = Result<u64>> + Send;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn query(&self, query: &CompiledQuery) -> Result<RowSet> {
        (**self).query(query)
    }

    fn execute(&self, query: &CompiledQuery) -> Result<u64> {
        (**self).execute(query)
    }
}

impl<E: AsyncExecutor> AsyncExecutor for &E {
    fn query(&self, query: &CompiledQuery) -> impl Future<Output = Result<RowSet>> + Send {
        (**self).query(query)
    }

    fn execute(&self, query: &CompiledQuery) -> impl Future<Output = Result<u64>> + Send {
        (**self).execute(query)
    }
}
