//! WHERE rendering.

use crate::error::{RelqError, Result};
use crate::expr::{CompareOp, Expr, FieldRef, Method};
use crate::value::{FieldType, SqlValue};

use super::Evaluator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connective {
    And,
    Or,
}

impl Connective {
    const fn as_sql(self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }
}

/// One sibling of a flattened chain and the connective joining it to the
/// sibling before it.
#[derive(Debug)]
struct Segment {
    connective: Connective,
    sql: String,
}

/// `(s0) AND (s1) OR (s2)`; the first connective is never printed.
fn render(segments: &[Segment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push(' ');
            out.push_str(segment.connective.as_sql());
            out.push(' ');
        }
        out.push('(');
        out.push_str(&segment.sql);
        out.push(')');
    }
    out
}

fn not_a_predicate(expr: &Expr) -> RelqError {
    RelqError::Compile(format!("expression is not a predicate: {expr:?}"))
}

impl Evaluator<'_> {
    /// Renders one `Where` node.
    ///
    /// The first call opens `WHERE`, later calls append with ` AND `. Nested
    /// `And`/`Or` chains are flattened into siblings, so a mixed chain
    /// follows SQL precedence rather than the tree's grouping.
    pub fn evaluate_where(&mut self, predicate: &Expr) -> Result<String> {
        let mut segments = Vec::new();
        self.chain(predicate, false, Connective::And, &mut segments)?;

        let has_or = segments
            .iter()
            .skip(1)
            .any(|s| s.connective == Connective::Or);
        if has_or && (self.where_conjoined || self.where_started) {
            let sql = render(&segments);
            segments = vec![Segment {
                connective: Connective::And,
                sql,
            }];
        }

        let rendered = render(&segments);
        if self.where_started {
            Ok(format!(" AND {rendered}"))
        } else {
            self.where_started = true;
            Ok(format!("WHERE {rendered}"))
        }
    }

    fn chain(
        &mut self,
        expr: &Expr,
        negated: bool,
        connective: Connective,
        out: &mut Vec<Segment>,
    ) -> Result<()> {
        let (lhs, rhs, op) = match expr {
            Expr::And(lhs, rhs) => (lhs, rhs, Connective::And),
            Expr::Or(lhs, rhs) => (lhs, rhs, Connective::Or),
            Expr::Not(inner) => return self.chain(inner, !negated, connective, out),
            atom => {
                let sql = self.atom(atom, negated)?;
                out.push(Segment { connective, sql });
                return Ok(());
            }
        };

        if negated {
            let mut group = Vec::new();
            self.chain(lhs, false, Connective::And, &mut group)?;
            self.chain(rhs, false, op, &mut group)?;
            out.push(Segment {
                connective,
                sql: format!("NOT ({})", render(&group)),
            });
        } else {
            self.chain(lhs, false, connective, out)?;
            self.chain(rhs, false, op, out)?;
        }
        Ok(())
    }

    fn atom(&mut self, expr: &Expr, negated: bool) -> Result<String> {
        match expr {
            Expr::Compare { op, lhs, rhs } => match (lhs.as_ref(), rhs.as_ref()) {
                (Expr::Field(field), Expr::Literal(value)) => {
                    self.compare_literal(field, *op, value, negated)
                }
                (Expr::Literal(value), Expr::Field(field)) => {
                    self.compare_literal(field, op.mirrored(), value, negated)
                }
                (Expr::Field(left), Expr::Field(right)) => {
                    let (left, _) = self.column(left)?;
                    let (right, _) = self.column(right)?;
                    Ok(negate(format!("{left} {} {right}", op.as_sql()), negated))
                }
                (Expr::Literal(_), Expr::Literal(_)) => Err(RelqError::Compile(
                    "comparison between two literals".to_owned(),
                )),
                _ => Err(RelqError::Compile(format!(
                    "unsupported comparison operands: {lhs:?} {} {rhs:?}",
                    op.as_sql()
                ))),
            },
            Expr::Field(field) => {
                let (column, def) = self.column(field)?;
                if def.ty != FieldType::Bool {
                    return Err(RelqError::Compile(format!(
                        "field `{}` is not boolean and cannot stand alone as a predicate",
                        def.name
                    )));
                }
                let name = self
                    .params
                    .bind(def.column, SqlValue::Int32(i32::from(!negated)));
                Ok(format!("{column} = {name}"))
            }
            Expr::Literal(SqlValue::Bool(b)) => Ok(if *b != negated {
                "1 = 1".to_owned()
            } else {
                "1 = 0".to_owned()
            }),
            Expr::Call {
                method,
                target,
                args,
            } => self.call(method, target, args, negated),
            other => Err(not_a_predicate(other)),
        }
    }

    fn compare_literal(
        &mut self,
        field: &FieldRef,
        op: CompareOp,
        value: &SqlValue,
        negated: bool,
    ) -> Result<String> {
        let (column, def) = self.column(field)?;
        if value.is_null() {
            let is_null = match op {
                CompareOp::Eq => !negated,
                CompareOp::Neq => negated,
                _ => {
                    return Err(RelqError::Compile(format!(
                        "`{}` cannot compare against NULL",
                        op.as_sql()
                    )));
                }
            };
            return Ok(null_check(&column, is_null));
        }
        let name = self.params.bind(def.column, value.clone().bound());
        Ok(negate(format!("{column} {} {name}", op.as_sql()), negated))
    }

    fn call(
        &mut self,
        method: &Method,
        target: &Expr,
        args: &[Expr],
        negated: bool,
    ) -> Result<String> {
        let unsupported = || RelqError::UnsupportedPredicate {
            method: method.name().to_owned(),
        };
        match (method, target, args) {
            (Method::Contains | Method::Any, Expr::List(values), [Expr::Field(field)]) => {
                let (column, def) = self.column(field)?;
                let mut items = Vec::with_capacity(values.len());
                for value in values {
                    let item = value
                        .list_item()
                        .filter(|item| !item.contains(','))
                        .ok_or_else(|| {
                            RelqError::Compile(format!(
                                "{value} cannot be a member of a FIND_IN_SET list"
                            ))
                        })?;
                    items.push(item);
                }
                let name = self.params.bind(def.column, SqlValue::Text(items.join(",")));
                let not = if negated { "NOT " } else { "" };
                Ok(format!("{not}FIND_IN_SET({column}, {name})"))
            }
            (
                Method::Contains | Method::StartsWith | Method::EndsWith,
                Expr::Field(field),
                [Expr::Literal(SqlValue::Text(text))],
            ) => {
                let pattern = match method {
                    Method::Contains => format!("%{text}%"),
                    Method::StartsWith => format!("{text}%"),
                    _ => format!("%{text}"),
                };
                let (column, def) = self.column(field)?;
                let name = self.params.bind(def.column, SqlValue::Text(pattern));
                let not = if negated { "NOT " } else { "" };
                Ok(format!("{column} {not}LIKE {name}"))
            }
            (Method::IsNullOrEmpty | Method::IsNullOrWhiteSpace, Expr::Field(field), [])
            | (Method::IsNullOrEmpty | Method::IsNullOrWhiteSpace, _, [Expr::Field(field)]) => {
                let (column, _) = self.column(field)?;
                Ok(null_check(&column, !negated))
            }
            _ => Err(unsupported()),
        }
    }
}

fn null_check(column: &str, is_null: bool) -> String {
    if is_null {
        format!("{column} IS NULL")
    } else {
        format!("{column} IS NOT NULL")
    }
}

fn negate(sql: String, negated: bool) -> String {
    if negated { format!("NOT ({sql})") } else { sql }
}

#[cfg(test)]
mod tests {
    use crate::expr::{field, field_of, in_list, is_null_or_empty, list, not};
    use crate::schema::{EntitySchema, ForeignKeyDef, NavigationDecl, SchemaRegistry};
    use crate::value::FieldType;
    use crate::{RelqError, SqlValue};

    use super::Evaluator;

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry.insert(
            EntitySchema::new("User", "users")
                .key("id", FieldType::Int64)
                .field("age", FieldType::Int32)
                .mapped("name", "user_name", FieldType::Text)
                .field("active", FieldType::Bool)
                .field("email", FieldType::Text)
                .field("teamId", FieldType::Int64)
                .navigation("team", NavigationDecl::one("Team"))
                .foreign_key(
                    ForeignKeyDef::new("Team", &["teamId"], &["id"]).navigation_field("team"),
                ),
        );
        registry.insert(
            EntitySchema::new("Team", "teams")
                .key("id", FieldType::Int64)
                .field("title", FieldType::Text),
        );
        registry
    }

    struct Team;

    impl crate::Entity for Team {
        const NAME: &'static str = "Team";

        fn schema() -> EntitySchema {
            EntitySchema::new("Team", "teams")
        }

        fn from_row(_: &crate::Row, _: &EntitySchema) -> crate::Result<Self> {
            Ok(Team)
        }

        fn get_field(&self, _: &str) -> Option<SqlValue> {
            None
        }
    }

    #[test]
    fn comparison_binds_a_parameter() {
        let registry = registry();
        let mut ev = Evaluator::new("User", &registry).unwrap();
        let sql = ev.evaluate_where(&field("age").gt(21)).unwrap();
        assert_eq!(sql, "WHERE (a.age > @_age_0_)");
        assert_eq!(ev.params().get("@_age_0_"), Some(&SqlValue::Int32(21)));
    }

    #[test]
    fn parameters_are_named_after_the_column() {
        let registry = registry();
        let mut ev = Evaluator::new("User", &registry).unwrap();
        let sql = ev.evaluate_where(&field("name").eq("ada")).unwrap();
        assert_eq!(sql, "WHERE (a.user_name = @_user_name_0_)");
    }

    #[test]
    fn repeated_fields_get_distinct_parameters() {
        let registry = registry();
        let mut ev = Evaluator::new("User", &registry).unwrap();
        let sql = ev
            .evaluate_where(&field("age").gte(18).and(field("age").lt(65)))
            .unwrap();
        assert_eq!(sql, "WHERE (a.age >= @_age_0_) AND (a.age < @_age_1_)");
        assert_eq!(ev.params().get("@_age_0_"), Some(&SqlValue::Int32(18)));
        assert_eq!(ev.params().get("@_age_1_"), Some(&SqlValue::Int32(65)));
    }

    #[test]
    fn literal_on_the_left_is_mirrored() {
        let registry = registry();
        let mut ev = Evaluator::new("User", &registry).unwrap();
        let sql = ev
            .evaluate_where(&crate::expr::lt(crate::expr::lit(5), field("age")))
            .unwrap();
        assert_eq!(sql, "WHERE (a.age > @_age_0_)");
    }

    #[test]
    fn booleans_bind_as_integers() {
        let registry = registry();
        let mut ev = Evaluator::new("User", &registry).unwrap();
        let sql = ev
            .evaluate_where(&field("active").eq(true).and(!field("active")))
            .unwrap();
        assert_eq!(
            sql,
            "WHERE (a.active = @_active_0_) AND (a.active = @_active_1_)"
        );
        assert_eq!(ev.params().get("@_active_0_"), Some(&SqlValue::Int32(1)));
        assert_eq!(ev.params().get("@_active_1_"), Some(&SqlValue::Int32(0)));
    }

    #[test]
    fn null_literals_render_null_checks() {
        let registry = registry();
        let mut ev = Evaluator::new("User", &registry).unwrap();
        ev.conjoin_where(false);
        let sql = ev
            .evaluate_where(&field("email").eq(SqlValue::Null).or(field("email").neq(SqlValue::Null)))
            .unwrap();
        assert_eq!(sql, "WHERE (a.email IS NULL) OR (a.email IS NOT NULL)");
        assert!(ev.params().is_empty());

        let err = ev.evaluate_where(&field("age").lt(SqlValue::Null)).unwrap_err();
        assert!(matches!(err, RelqError::Compile(_)));
    }

    #[test]
    fn mixed_connectives_flatten_into_siblings() {
        // (age > 1 OR age < 2) AND active: the tree grouping is not kept.
        let registry = registry();
        let mut ev = Evaluator::new("User", &registry).unwrap();
        ev.conjoin_where(false);
        let predicate = field("age").gt(1).or(field("age").lt(2)).and(field("active"));
        let sql = ev.evaluate_where(&predicate).unwrap();
        assert_eq!(
            sql,
            "WHERE (a.age > @_age_0_) OR (a.age < @_age_1_) AND (a.active = @_active_0_)"
        );
    }

    #[test]
    fn negated_groups_render_not() {
        let registry = registry();
        let mut ev = Evaluator::new("User", &registry).unwrap();
        let sql = ev
            .evaluate_where(&not(field("age").gt(1).or(field("age").lt(2))))
            .unwrap();
        assert_eq!(sql, "WHERE (NOT ((a.age > @_age_0_) OR (a.age < @_age_1_)))");
    }

    #[test]
    fn later_calls_conjoin() {
        let registry = registry();
        let mut ev = Evaluator::new("User", &registry).unwrap();
        ev.evaluate_where(&field("age").gt(1)).unwrap();
        let sql = ev
            .evaluate_where(&field("email").eq("x").or(field("email").eq("y")))
            .unwrap();
        assert_eq!(
            sql,
            " AND ((a.email = @_email_0_) OR (a.email = @_email_1_))"
        );
    }

    #[test]
    fn a_leading_or_chain_is_grouped_before_later_calls() {
        let registry = registry();
        let mut ev = Evaluator::new("User", &registry).unwrap();
        let first = ev
            .evaluate_where(&field("age").lt(5).or(field("age").gt(50)))
            .unwrap();
        let second = ev.evaluate_where(&field("active").eq(true)).unwrap();
        assert_eq!(
            format!("{first}{second}"),
            "WHERE ((a.age < @_age_0_) OR (a.age > @_age_1_)) AND (a.active = @_active_0_)"
        );
    }

    #[test]
    fn list_members_may_not_contain_commas() {
        let registry = registry();
        let mut ev = Evaluator::new("User", &registry).unwrap();
        let err = ev
            .evaluate_where(&list(["ada", "lovelace, countess"]).any(field("name")))
            .unwrap_err();
        assert!(matches!(err, RelqError::Compile(_)));
        assert!(ev.params().is_empty());
    }

    #[test]
    fn membership_renders_find_in_set() {
        let registry = registry();
        let mut ev = Evaluator::new("User", &registry).unwrap();
        let sql = ev
            .evaluate_where(&list([1, 2, 3]).any(field("age")))
            .unwrap();
        assert_eq!(sql, "WHERE (FIND_IN_SET(a.age, @_age_0_))");
        assert_eq!(
            ev.params().get("@_age_0_"),
            Some(&SqlValue::Text("1,2,3".into()))
        );

        let sql = ev
            .evaluate_where(&not(in_list(list(["x", "y"]), field("email"))))
            .unwrap();
        assert_eq!(sql, " AND (NOT FIND_IN_SET(a.email, @_email_0_))");
    }

    #[test]
    fn string_calls_render_like() {
        let registry = registry();
        let mut ev = Evaluator::new("User", &registry).unwrap();
        let sql = ev
            .evaluate_where(
                &field("email")
                    .contains("acme")
                    .and(field("name").starts_with("Ad"))
                    .and(!field("name").ends_with("son")),
            )
            .unwrap();
        assert_eq!(
            sql,
            "WHERE (a.email LIKE @_email_0_) AND (a.user_name LIKE @_user_name_0_) \
             AND (a.user_name NOT LIKE @_user_name_1_)"
        );
        assert_eq!(
            ev.params().get("@_email_0_"),
            Some(&SqlValue::Text("%acme%".into()))
        );
        assert_eq!(
            ev.params().get("@_user_name_0_"),
            Some(&SqlValue::Text("Ad%".into()))
        );
        assert_eq!(
            ev.params().get("@_user_name_1_"),
            Some(&SqlValue::Text("%son".into()))
        );
    }

    #[test]
    fn null_or_empty_renders_is_null() {
        let registry = registry();
        let mut ev = Evaluator::new("User", &registry).unwrap();
        let sql = ev
            .evaluate_where(&is_null_or_empty(field("email")).and(!field("name").is_null_or_white_space()))
            .unwrap();
        assert_eq!(sql, "WHERE (a.email IS NULL) AND (a.user_name IS NOT NULL)");
    }

    #[test]
    fn unknown_methods_are_named_in_the_error() {
        let registry = registry();
        let mut ev = Evaluator::new("User", &registry).unwrap();
        let err = ev
            .evaluate_where(&field("name").method("ToUpper", Vec::new()))
            .unwrap_err();
        match err {
            RelqError::UnsupportedPredicate { method } => assert_eq!(method, "ToUpper"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn fields_of_other_entities_get_their_own_alias() {
        let registry = registry();
        let mut ev = Evaluator::new("User", &registry).unwrap();
        let sql = ev
            .evaluate_where(&field_of::<Team>("title").eq("core"))
            .unwrap();
        assert_eq!(sql, "WHERE (b.title = @_title_0_)");
        assert_eq!(ev.aliases().get("teams"), Some("b"));
    }

    #[test]
    fn non_predicates_are_rejected() {
        let registry = registry();
        let mut ev = Evaluator::new("User", &registry).unwrap();
        assert!(matches!(
            ev.evaluate_where(&field("age")),
            Err(RelqError::Compile(_))
        ));
        assert!(matches!(
            ev.evaluate_where(&crate::expr::lit(1).eq(2)),
            Err(RelqError::Compile(_))
        ));
        assert!(matches!(
            ev.evaluate_where(&field("team").eq(1)),
            Err(RelqError::Compile(_))
        ));
    }
}
