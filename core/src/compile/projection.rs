//! ORDER BY / GROUP BY / COUNT / SET / LIMIT rendering.

use crate::error::{RelqError, Result};
use crate::expr::{CompareOp, Expr, FieldRef};
use crate::value::SqlValue;

use super::Evaluator;

impl Evaluator<'_> {
    /// Columns of a single field or a `Fields` array.
    fn projected_columns(&mut self, projection: &Expr, clause: &str) -> Result<Vec<String>> {
        let fields: Vec<&FieldRef> = match projection {
            Expr::Field(field) => vec![field],
            Expr::Fields(fields) if !fields.is_empty() => fields.iter().collect(),
            other => {
                return Err(RelqError::Compile(format!(
                    "{clause} expects a field or an array of fields, found {other:?}"
                )));
            }
        };
        fields
            .into_iter()
            .map(|field| self.column(field).map(|(column, _)| column))
            .collect()
    }

    /// `ORDER BY a.x[ DESC]`, or `, a.x[ DESC]` once ordering has started.
    pub fn evaluate_order_by(&mut self, projection: &Expr, descending: bool) -> Result<String> {
        let suffix = if descending { " DESC" } else { "" };
        let columns: Vec<String> = self
            .projected_columns(projection, "ORDER BY")?
            .into_iter()
            .map(|column| format!("{column}{suffix}"))
            .collect();
        Ok(self.keyword_list("ORDER BY", Started::Order, &columns))
    }

    pub fn evaluate_group_by(&mut self, projection: &Expr) -> Result<String> {
        let columns = self.projected_columns(projection, "GROUP BY")?;
        Ok(self.keyword_list("GROUP BY", Started::Group, &columns))
    }

    /// One row per distinct key, rendered as `GROUP BY` and sharing its
    /// keyword with [`evaluate_group_by`](Self::evaluate_group_by).
    pub fn evaluate_distinct_by(&mut self, projection: &Expr) -> Result<String> {
        let columns = self.projected_columns(projection, "DISTINCT BY")?;
        Ok(self.keyword_list("GROUP BY", Started::Group, &columns))
    }

    pub fn evaluate_count(&mut self, projection: &Expr) -> Result<String> {
        match projection {
            Expr::All => Ok("SELECT COUNT(*)".to_owned()),
            Expr::Field(field) => {
                let (column, _) = self.column(field)?;
                Ok(format!("SELECT COUNT({column})"))
            }
            other => Err(RelqError::Compile(format!(
                "COUNT expects `*` or a field, found {other:?}"
            ))),
        }
    }

    /// `SET a.x = @_x_0_, a.y = a.z`. Targets must be stored fields of the
    /// root entity; literals are converted to the target's declared type.
    pub fn evaluate_set(&mut self, assignments: &Expr) -> Result<String> {
        let pairs: Vec<(&FieldRef, &Expr)> = match assignments {
            Expr::Assign(pairs) if !pairs.is_empty() => {
                pairs.iter().map(|(target, value)| (target, value)).collect()
            }
            Expr::Compare {
                op: CompareOp::Eq,
                lhs,
                rhs,
            } => match lhs.as_ref() {
                Expr::Field(target) => vec![(target, rhs.as_ref())],
                _ => return Err(invalid_set(assignments)),
            },
            _ => return Err(invalid_set(assignments)),
        };

        let root = self.root.entity;
        let mut rendered = Vec::with_capacity(pairs.len());
        for (target, value) in pairs {
            if target.entity.is_some_and(|entity| entity != root) {
                return Err(RelqError::Compile(format!(
                    "SET target `{}` is not a field of `{root}`",
                    target.name
                )));
            }
            let (column, def) = self.column(target)?;
            let value = match value {
                Expr::Literal(literal) => {
                    let bound = literal.coerce(def.ty)?.bound();
                    self.params.bind(def.column, bound).to_string()
                }
                Expr::Field(source) => self.column(source)?.0,
                other => {
                    return Err(RelqError::Compile(format!(
                        "SET `{}` expects a literal or a field, found {other:?}",
                        def.name
                    )));
                }
            };
            rendered.push(format!("{column} = {value}"));
        }
        Ok(format!("SET {}", rendered.join(", ")))
    }

    /// `LIMIT n`, inlined. Only a non-negative integer literal is accepted.
    pub fn evaluate_limit(&mut self, count: &Expr) -> Result<String> {
        match count {
            Expr::Literal(value) if !matches!(value, SqlValue::Bool(_)) => {
                match value.as_integer().filter(|n| *n >= 0) {
                    Some(n) => Ok(format!("LIMIT {n}")),
                    None => Err(RelqError::Compile(format!(
                        "LIMIT expects a non-negative integer, found {value}"
                    ))),
                }
            }
            other => Err(RelqError::Compile(format!(
                "LIMIT expects an integer literal, found {other:?}"
            ))),
        }
    }

    fn keyword_list(&mut self, keyword: &str, started: Started, columns: &[String]) -> String {
        let flag = match started {
            Started::Order => &mut self.order_started,
            Started::Group => &mut self.group_started,
        };
        let list = columns.join(", ");
        if *flag {
            format!(", {list}")
        } else {
            *flag = true;
            format!("{keyword} {list}")
        }
    }
}

#[derive(Clone, Copy)]
enum Started {
    Order,
    Group,
}

fn invalid_set(expr: &Expr) -> RelqError {
    RelqError::Compile(format!("SET expects field assignments, found {expr:?}"))
}
