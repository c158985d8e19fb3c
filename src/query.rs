use compact_str::CompactString;
use futures_util::future::try_join_all;
use relq_core::{
    AsyncExecutor, ClauseKind, ClauseNode, Clauses, CompiledQuery, Entity, Executor, Expr,
    Navigate, NavigationResolver, PreparedLookup, RelqError, Result, RowSet, Statement, compile,
    expr::lit,
};

use crate::include::{Include, Loader, Nav};
use crate::relq::Relq;

/// A query over entity `T`, built clause by clause.
///
/// Clauses are consumed by [`to_sql`](Self::to_sql): compiling twice
/// without declaring new clauses yields an unfiltered query.
pub struct Query<'db, T, E> {
    db: &'db Relq<E>,
    clauses: Clauses,
    last_compiled: Option<Clauses>,
    includes: Vec<Box<dyn Loader<T> + 'db>>,
}

impl<'db, T: Entity, E> Query<'db, T, E> {
    pub(crate) fn new(db: &'db Relq<E>) -> Self {
        Self {
            db,
            clauses: Clauses::new(),
            last_compiled: None,
            includes: Vec::new(),
        }
    }

    fn push(mut self, node: ClauseNode) -> Self {
        self.clauses.push(node);
        self
    }

    pub fn r#where(self, predicate: impl Into<Expr>) -> Self {
        self.push(ClauseNode::r#where(predicate.into()))
    }

    pub fn order_by(self, projection: impl Into<Expr>) -> Self {
        self.push(ClauseNode::order_by(projection.into()))
    }

    pub fn order_by_desc(self, projection: impl Into<Expr>) -> Self {
        self.push(ClauseNode::order_by_desc(projection.into()))
    }

    pub fn group_by(self, projection: impl Into<Expr>) -> Self {
        self.push(ClauseNode::group_by(projection.into()))
    }

    pub fn distinct_by(self, projection: impl Into<Expr>) -> Self {
        self.push(ClauseNode::distinct_by(projection.into()))
    }

    /// Field assignments for [`update`](Self::update).
    pub fn set(self, assignments: impl Into<Expr>) -> Self {
        self.push(ClauseNode::set(assignments.into()))
    }

    pub fn take(self, n: u64) -> Self {
        self.push(ClauseNode::limit(lit(n)))
    }

    /// Counts `projection` (`Expr::All` for `COUNT(*)`) instead of selecting rows.
    pub fn count(self, projection: impl Into<Expr>) -> Self {
        self.push(ClauseNode::count(projection.into()))
    }

    /// Current clause model.
    pub fn clauses(&self) -> &Clauses {
        &self.clauses
    }

    /// Clauses consumed by the last [`to_sql`](Self::to_sql).
    pub fn last_compiled(&self) -> Option<&Clauses> {
        self.last_compiled.as_ref()
    }

    /// Compiles the declared clauses and resets the model.
    pub fn to_sql(&mut self) -> Result<CompiledQuery> {
        let clauses = self.clauses.take();
        let compiled = compile(&clauses, T::NAME, self.db.registry());
        self.last_compiled = Some(clauses);
        compiled
    }

    fn compile_as(&mut self, expected: Statement) -> Result<CompiledQuery> {
        let query = self.to_sql()?;
        if query.statement != expected {
            return Err(RelqError::Compile(format!(
                "expected a {expected:?} statement, the clauses compile to {:?}",
                query.statement
            )));
        }
        Ok(query)
    }

    fn materialize(&self, rows: &RowSet) -> Result<Vec<T>> {
        let schema = self.db.registry().get(T::NAME)?;
        rows.iter().map(|row| T::from_row(row, schema)).collect()
    }

    fn resolver(&self) -> NavigationResolver<'db> {
        NavigationResolver::new(self.db.registry())
    }

    fn ensure_count(&mut self) {
        if !self.clauses.has(ClauseKind::Count) {
            self.clauses.push(ClauseNode::count(Expr::All));
        }
    }

    fn ensure_set(&self) -> Result<()> {
        if self.clauses.has(ClauseKind::Set) {
            Ok(())
        } else {
            Err(RelqError::Compile(
                "update requires a SET clause".to_owned(),
            ))
        }
    }
}

impl<'db, T, E> Query<'db, T, E>
where
    T: Entity + 'db,
{
    /// Loads navigation `field` of every returned item with one batched lookup.
    pub fn include<R>(self, field: impl Into<CompactString>) -> Self
    where
        T: Navigate<R>,
        R: Entity + Clone + 'db,
    {
        self.include_with::<R>(field, |nav| nav)
    }

    /// Like [`include`](Self::include), with extra constraints on the lookup.
    pub fn include_with<R>(
        mut self,
        field: impl Into<CompactString>,
        build: impl FnOnce(Nav<R>) -> Nav<R>,
    ) -> Self
    where
        T: Navigate<R>,
        R: Entity + Clone + 'db,
    {
        let node = build(Nav::new(field)).into_node();
        self.clauses.push(node.clone());
        self.includes.push(Box::new(Include::<R>::new(node)));
        self
    }
}

fn count_of(rows: &RowSet) -> Result<u64> {
    let value = rows
        .first()
        .and_then(|row| row.columns().next())
        .map(|(_, value)| value)
        .ok_or(RelqError::NotFound)?;
    value
        .as_integer()
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| RelqError::Mapping(format!("COUNT returned {value}")))
}

//------------------------------------------------------------------------------
// Blocking execution
//------------------------------------------------------------------------------

impl<T: Entity, E: Executor> Query<'_, T, E> {
    /// Runs the query, then every include in declaration order.
    ///
    /// A failing include stops the chain; earlier includes stay merged.
    pub fn all(mut self) -> Result<Vec<T>> {
        let query = self.compile_as(Statement::Select)?;
        let rows = self.db.executor().query(&query)?;
        let mut items = self.materialize(&rows)?;

        let resolver = self.resolver();
        for include in &self.includes {
            let lookup = include.prepare(&resolver, &items)?;
            let rows = match lookup.query() {
                Some(query) => self.db.executor().query(query)?,
                None => RowSet::new(),
            };
            include.merge(&resolver, &lookup, &rows, &mut items)?;
        }
        Ok(items)
    }

    /// First row, if any; replaces any `take`.
    pub fn first(self) -> Result<Option<T>> {
        Ok(self.take(1).all()?.into_iter().next())
    }

    /// Runs a `COUNT(*)`, or the declared [`count`](Self::count) projection.
    pub fn count_rows(mut self) -> Result<u64> {
        self.ensure_count();
        let query = self.compile_as(Statement::Count)?;
        count_of(&self.db.executor().query(&query)?)
    }

    /// Runs the declared SET and returns the affected-row count.
    pub fn update(mut self) -> Result<u64> {
        self.ensure_set()?;
        let query = self.compile_as(Statement::Update)?;
        self.db.executor().execute(&query)
    }
}

//------------------------------------------------------------------------------
// Async execution
//------------------------------------------------------------------------------

impl<T: Entity, E: AsyncExecutor> Query<'_, T, E> {
    /// Runs the query, then fetches every include lookup concurrently and
    /// merges them in declaration order.
    pub async fn all_async(mut self) -> Result<Vec<T>> {
        let query = self.compile_as(Statement::Select)?;
        let rows = self.db.executor().query(&query).await?;
        let mut items = self.materialize(&rows)?;

        let resolver = self.resolver();
        let lookups = self
            .includes
            .iter()
            .map(|include| include.prepare(&resolver, &items))
            .collect::<Result<Vec<PreparedLookup>>>()?;

        let executor = self.db.executor();
        let fetched = try_join_all(lookups.iter().map(|lookup| async move {
            match lookup.query() {
                Some(query) => executor.query(query).await,
                None => Ok(RowSet::new()),
            }
        }))
        .await?;

        for ((include, lookup), rows) in self.includes.iter().zip(&lookups).zip(&fetched) {
            include.merge(&resolver, lookup, rows, &mut items)?;
        }
        Ok(items)
    }

    pub async fn first_async(self) -> Result<Option<T>> {
        Ok(self.take(1).all_async().await?.into_iter().next())
    }

    pub async fn count_async(mut self) -> Result<u64> {
        self.ensure_count();
        let query = self.compile_as(Statement::Count)?;
        count_of(&self.db.executor().query(&query).await?)
    }

    pub async fn update_async(mut self) -> Result<u64> {
        self.ensure_set()?;
        let query = self.compile_as(Statement::Update)?;
        self.db.executor().execute(&query).await
    }
}
