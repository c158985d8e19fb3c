use crate::alias::AliasRegistry;
use crate::clause::{ClauseKind, ClauseNode, Clauses};
use crate::error::{RelqError, Result};
use crate::expr::{Expr, FieldRef};
use crate::navigation::keys::derive_join_keys;
use crate::params::ParamMap;
use crate::schema::{EntitySchema, FieldDef, SchemaRegistry};

use super::{CompiledQuery, Statement};

/// State of one compile pass.
///
/// Holds the alias registry, the shared parameter map and the per-keyword
/// "already started" flags. Never shared between compilations.
#[derive(Debug)]
pub struct Evaluator<'r> {
    pub(super) registry: &'r SchemaRegistry,
    pub(super) root: &'r EntitySchema,
    pub(super) aliases: AliasRegistry,
    pub(super) params: ParamMap,
    /// Non-root entities referenced so far, in first-seen order.
    pub(super) joined: Vec<&'r EntitySchema>,
    pub(super) where_started: bool,
    pub(super) where_conjoined: bool,
    pub(super) order_started: bool,
    pub(super) group_started: bool,
}

impl<'r> Evaluator<'r> {
    pub fn new(root_entity: &str, registry: &'r SchemaRegistry) -> Result<Self> {
        let root = registry.get(root_entity)?;
        Ok(Self {
            registry,
            root,
            aliases: AliasRegistry::new(root.table),
            params: ParamMap::new(),
            joined: Vec::new(),
            where_started: false,
            where_conjoined: true,
            order_started: false,
            group_started: false,
        })
    }

    pub fn root(&self) -> &'r EntitySchema {
        self.root
    }

    pub fn params(&self) -> &ParamMap {
        &self.params
    }

    pub fn aliases(&self) -> &AliasRegistry {
        &self.aliases
    }

    pub fn into_params(self) -> ParamMap {
        self.params
    }

    /// Whether predicates containing an OR are wrapped as a single group.
    ///
    /// On by default, since any later `evaluate_where` call is appended with
    /// ` AND `. Turn it off when exactly one predicate will be rendered.
    pub fn conjoin_where(&mut self, conjoined: bool) {
        self.where_conjoined = conjoined;
    }

    /// Resolves a field to `<alias>.<column>`, assigning the owning table an
    /// alias on first use.
    pub(super) fn column(&mut self, field: &FieldRef) -> Result<(String, &'r FieldDef)> {
        let registry = self.registry;
        let schema = match field.entity {
            Some(entity) if entity != self.root.entity => registry.get(entity)?,
            _ => self.root,
        };
        let def = schema.require_field(&field.name)?;
        if def.is_virtual {
            return Err(RelqError::Compile(format!(
                "`{}.{}` is a virtual field and has no column",
                schema.entity, def.name
            )));
        }
        if schema.entity != self.root.entity
            && !self.joined.iter().any(|j| j.entity == schema.entity)
        {
            self.joined.push(schema);
        }
        let alias = self.aliases.alias_for(schema.table, registry)?;
        Ok((format!("{alias}.{}", def.column), def))
    }

    /// Compiles a whole clause model.
    pub fn compile(mut self, clauses: &Clauses) -> Result<CompiledQuery> {
        let set = clauses.first(ClauseKind::Set);
        let count = clauses.first(ClauseKind::Count);
        if set.is_some() && count.is_some() {
            return Err(RelqError::Compile(
                "SET cannot be combined with COUNT".to_owned(),
            ));
        }
        if set.is_some()
            && (clauses.has(ClauseKind::GroupBy) || clauses.has(ClauseKind::DistinctBy))
        {
            return Err(RelqError::Compile(
                "SET cannot be combined with GROUP BY or DISTINCT BY".to_owned(),
            ));
        }

        let statement = match (set, count) {
            (Some(_), _) => Statement::Update,
            (_, Some(_)) => Statement::Count,
            _ => Statement::Select,
        };
        let table = self.root.table;
        let primary = self.aliases.primary().to_owned();

        let head = match (set, count) {
            (Some(_), _) => format!("UPDATE {table} {primary}"),
            (_, Some(node)) => {
                format!("{} FROM {table} {primary}", self.evaluate_count(&node.ast)?)
            }
            _ => format!("{} FROM {table} {primary}", self.select_list()),
        };

        let set_sql = set.map(|node| self.evaluate_set(&node.ast)).transpose()?;

        let predicates: Vec<&ClauseNode> = clauses.of_kind(ClauseKind::Where).collect();
        self.conjoin_where(predicates.len() > 1);
        let mut where_sql = String::new();
        for node in predicates {
            where_sql.push_str(&self.evaluate_where(&node.ast)?);
        }

        let mut order_sql = String::new();
        for node in clauses.iter() {
            match node.kind {
                ClauseKind::OrderBy => {
                    order_sql.push_str(&self.evaluate_order_by(&node.ast, false)?)
                }
                ClauseKind::OrderByDescending => {
                    order_sql.push_str(&self.evaluate_order_by(&node.ast, true)?)
                }
                _ => {}
            }
        }

        let mut group_sql = String::new();
        for node in clauses.iter() {
            match node.kind {
                ClauseKind::GroupBy => group_sql.push_str(&self.evaluate_group_by(&node.ast)?),
                ClauseKind::DistinctBy => {
                    group_sql.push_str(&self.evaluate_distinct_by(&node.ast)?)
                }
                _ => {}
            }
        }

        let limit_sql = clauses
            .first(ClauseKind::Limit)
            .map(|node| self.evaluate_limit(&node.ast))
            .transpose()?;

        let references = self.reference_fields(clauses)?;
        let joins = self.render_joins(&references)?;

        let mut sql = head;
        for part in joins
            .iter()
            .map(String::as_str)
            .chain(set_sql.as_deref())
            .chain([where_sql.as_str(), order_sql.as_str(), group_sql.as_str()])
            .chain(limit_sql.as_deref())
            .filter(|part| !part.is_empty())
        {
            sql.push(' ');
            sql.push_str(part);
        }

        Ok(CompiledQuery {
            sql,
            params: self.params,
            table,
            statement,
        })
    }

    /// Default projection: every stored field of the root, in declaration order.
    fn select_list(&self) -> String {
        let alias = self.aliases.primary();
        let columns: Vec<String> = self
            .root
            .stored_fields()
            .map(|f| format!("{alias}.{}", f.column))
            .collect();
        if columns.is_empty() {
            format!("SELECT {alias}.*")
        } else {
            format!("SELECT {}", columns.join(", "))
        }
    }

    /// Navigation fields named by `Reference` nodes, validated against the root.
    fn reference_fields(&self, clauses: &Clauses) -> Result<Vec<&'r str>> {
        let mut fields = Vec::new();
        for node in clauses.of_kind(ClauseKind::Reference) {
            let Expr::Field(field) = &node.ast else {
                return Err(RelqError::Compile(
                    "a Reference clause must name a navigation field".to_owned(),
                ));
            };
            if field.entity.is_some_and(|e| e != self.root.entity) {
                return Err(RelqError::Compile(format!(
                    "Reference `{}` does not belong to `{}`",
                    field.name, self.root.entity
                )));
            }
            let def = self.root.require_field(&field.name)?;
            if def.navigation.is_none() {
                return Err(RelqError::Schema(format!(
                    "field `{}.{}` is not a navigation field",
                    self.root.entity, def.name
                )));
            }
            fields.push(def.name);
        }
        Ok(fields)
    }

    /// `LEFT JOIN` for every non-root table a predicate or projection touched.
    fn render_joins(&self, references: &[&'r str]) -> Result<Vec<String>> {
        let primary = self.aliases.primary();
        let mut joins = Vec::with_capacity(self.joined.len());
        for target in &self.joined {
            let field = self.navigation_to(target, references)?;
            let keys = derive_join_keys(self.root, field, target)?;
            let alias = self.aliases.get(target.table).ok_or_else(|| {
                RelqError::Compile(format!("table `{}` has no alias", target.table))
            })?;
            let mut on = Vec::with_capacity(keys.foreign_key_fields.len());
            for (fk, rk) in keys.foreign_key_fields.iter().zip(&keys.reference_keys) {
                let fk_column = target.require_field(fk)?.column;
                let rk_column = self.root.require_field(rk)?.column;
                on.push(format!("{alias}.{fk_column} = {primary}.{rk_column}"));
            }
            joins.push(format!(
                "LEFT JOIN {} {alias} ON {}",
                target.table,
                on.join(" AND ")
            ));
        }
        Ok(joins)
    }

    /// The root navigation field leading to `target`. A `Reference` clause
    /// naming one wins; otherwise the root must have exactly one.
    fn navigation_to(&self, target: &EntitySchema, references: &[&'r str]) -> Result<&'r str> {
        let root = self.root;
        let candidates: Vec<&'r str> = root
            .navigations_to(target.entity)
            .map(|(def, _)| def.name)
            .collect();
        if let Some(field) = references.iter().find(|f| candidates.contains(*f)) {
            return Ok(*field);
        }
        match candidates.as_slice() {
            [field] => Ok(*field),
            [] => Err(RelqError::Compile(format!(
                "`{}` has no navigation to `{}`",
                root.entity, target.entity
            ))),
            _ => Err(RelqError::AmbiguousNavigation {
                entity: root.entity.to_owned(),
                target: target.entity.to_owned(),
                candidates: candidates.iter().map(|c| (*c).to_owned()).collect(),
            }),
        }
    }
}
