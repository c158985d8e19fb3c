// src/relq.rs
use relq_core::{
    AsyncExecutor, ClauseNode, Entity, Executor, Navigate, NavigationResolver, Result,
    SchemaRegistry,
};

use crate::query::Query;

//------------------------------------------------------------------------------
// Relq - Main Connection Wrapper
//------------------------------------------------------------------------------

/// Entry point: an execution collaborator plus the schema registry of every
/// entity it serves.
#[derive(Debug, Clone)]
pub struct Relq<E> {
    registry: SchemaRegistry,
    executor: E,
}

impl<E> Relq<E> {
    pub fn new(executor: E) -> Self {
        Self {
            registry: SchemaRegistry::new(),
            executor,
        }
    }

    /// Registers `T`'s schema. Registering twice is a no-op.
    pub fn register<T: Entity>(mut self) -> Self {
        self.registry.register::<T>();
        self
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Gets a mutable reference to the underlying executor
    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    /// Starts a query rooted at `T`.
    pub fn query<T: Entity>(&self) -> Query<'_, T, E> {
        Query::new(self)
    }

    pub fn resolver(&self) -> NavigationResolver<'_> {
        NavigationResolver::new(&self.registry)
    }
}

impl<E: Executor> Relq<E> {
    /// Loads the navigation named by `node` onto items fetched elsewhere.
    pub fn resolve<S, R>(&self, node: &ClauseNode, items: &mut [S]) -> Result<()>
    where
        S: Entity + Navigate<R>,
        R: Entity + Clone,
    {
        self.resolver().resolve::<S, R, E>(node, items, &self.executor)
    }
}

impl<E: AsyncExecutor> Relq<E> {
    pub async fn resolve_async<S, R>(&self, node: &ClauseNode, items: &mut [S]) -> Result<()>
    where
        S: Entity + Navigate<R>,
        R: Entity + Clone,
    {
        self.resolver()
            .resolve_async::<S, R, E>(node, items, &self.executor)
            .await
    }
}
