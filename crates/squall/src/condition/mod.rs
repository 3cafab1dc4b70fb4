//! Condition clauses: `WHERE`, `HAVING`, `EXISTS`, `ORDER BY`, `GROUP BY`.
//!
//! All clauses render through [`SqlRender`] and compose into statements via
//! [`Clause`]. A [`Where`] chain nests further `Where` clauses; the nested
//! clause's leading `WHERE` is replaced by the parent's [`Conjunction`]:
//!
//! ```
//! use squall::{SqlRender, Value, Where};
//!
//! let w = Where::new("x", "=", Value::new(1))?
//!     .chain(Where::new("y", ">", Value::new(2))?)?;
//! assert_eq!(w.render(), "WHERE x = 1 AND y > 2");
//! # Ok::<(), squall::SqlError>(())
//! ```

mod exists;
mod order;
mod where_clause;

pub use exists::Exists;
pub use order::{Group, Order, Sort};
pub use where_clause::{Having, InList, Where};

use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::render::{SqlRender, display_via_render, join_parts};
use crate::statement::{Select, Statement};
use crate::value::Value;
use std::fmt;
use std::str::FromStr;

/// Comparison operators accepted by [`Condition::new`], across every backend.
const OPERATORS: &[&str] = &[
    // comparison
    "=", "==", "!=", "<>", "<", "<=", ">", ">=",
    // pattern matching
    "LIKE", "NOT LIKE", "ILIKE", "NOT ILIKE", "GLOB", "NOT GLOB", "REGEXP", "NOT REGEXP", "MATCH",
    "NOT MATCH", "SIMILAR TO", "NOT SIMILAR TO", "~", "~*", "!~", "!~*",
    // membership and ranges
    "IN", "NOT IN", "BETWEEN", "NOT BETWEEN",
    // identity
    "IS", "IS NOT", "IS DISTINCT FROM", "IS NOT DISTINCT FROM",
    // PostgreSQL containment
    "@>", "<@", "&&",
];

/// Right-hand side of a [`Condition`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionValue {
    /// Emitted as-is (column references, `NULL`, expressions).
    Raw(String),
    /// A literal.
    Value(Value),
    /// A nested query, rendered parenthesised.
    Subquery(Box<Select>),
    /// A parenthesised `IN` list.
    List(InList),
}

impl SqlRender for ConditionValue {
    fn render_with(&self, dialect: &dyn Dialect) -> String {
        match self {
            ConditionValue::Raw(sql) => sql.clone(),
            ConditionValue::Value(v) => v.render_with(dialect),
            ConditionValue::Subquery(q) => format!("({})", q.render_with(dialect)),
            ConditionValue::List(list) => list.render_with(dialect),
        }
    }
}

/// Conversion into a [`ConditionValue`].
///
/// Only `Select` is accepted among statements; any other statement fails
/// with [`SqlError::InvalidWhereClause`].
pub trait IntoConditionValue {
    fn into_condition_value(self) -> SqlResult<ConditionValue>;
}

impl IntoConditionValue for ConditionValue {
    fn into_condition_value(self) -> SqlResult<ConditionValue> {
        Ok(self)
    }
}

impl IntoConditionValue for &str {
    fn into_condition_value(self) -> SqlResult<ConditionValue> {
        Ok(ConditionValue::Raw(self.to_string()))
    }
}

impl IntoConditionValue for String {
    fn into_condition_value(self) -> SqlResult<ConditionValue> {
        Ok(ConditionValue::Raw(self))
    }
}

impl IntoConditionValue for Value {
    fn into_condition_value(self) -> SqlResult<ConditionValue> {
        Ok(ConditionValue::Value(self))
    }
}

impl IntoConditionValue for Select {
    fn into_condition_value(self) -> SqlResult<ConditionValue> {
        Ok(ConditionValue::Subquery(Box::new(self)))
    }
}

impl IntoConditionValue for InList {
    fn into_condition_value(self) -> SqlResult<ConditionValue> {
        Ok(ConditionValue::List(self))
    }
}

impl IntoConditionValue for Statement {
    fn into_condition_value(self) -> SqlResult<ConditionValue> {
        match self {
            Statement::Select(select) => select.into_condition_value(),
            other => Err(SqlError::InvalidWhereClause(format!(
                "only SELECT may be used as a condition value, got: {}",
                other.render()
            ))),
        }
    }
}

/// A `<field> <operator> <value>` triple.
///
/// Two conditions are equal when they render to the same text.
#[derive(Debug, Clone)]
pub struct Condition {
    field: String,
    operator: String,
    value: ConditionValue,
}

impl Condition {
    pub fn new(
        field: impl Into<String>,
        operator: &str,
        value: impl IntoConditionValue,
    ) -> SqlResult<Self> {
        let field = field.into();
        if field.trim().is_empty() {
            return Err(SqlError::invalid_condition("condition field is blank"));
        }
        let operator = normalize_operator(operator)?;
        Ok(Self {
            field,
            operator,
            value: value.into_condition_value()?,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// The operator in its canonical upper-case form.
    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn value(&self) -> &ConditionValue {
        &self.value
    }
}

fn normalize_operator(operator: &str) -> SqlResult<String> {
    let normalized = operator
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase();
    if OPERATORS.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(SqlError::invalid_condition(format!(
            "unsupported operator '{operator}'"
        )))
    }
}

impl SqlRender for Condition {
    fn render_with(&self, dialect: &dyn Dialect) -> String {
        format!(
            "{} {} {}",
            self.field,
            self.operator,
            self.value.render_with(dialect)
        )
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.render() == other.render()
    }
}

/// Keyword joining a chained clause to its parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

impl Conjunction {
    pub fn as_str(self) -> &'static str {
        match self {
            Conjunction::And => "AND",
            Conjunction::Or => "OR",
        }
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Conjunction {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(Conjunction::And),
            "OR" => Ok(Conjunction::Or),
            _ => Err(SqlError::invalid_condition(format!("unsupported operand '{s}'"))),
        }
    }
}

/// Any clause that can be attached to a statement or chained into another clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Where(Where),
    Having(Having),
    Exists(Exists),
    Order(Order),
    Group(Group),
}

impl Clause {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Clause::Where(_) => "WHERE",
            Clause::Having(_) => "HAVING",
            Clause::Exists(_) => "EXISTS",
            Clause::Order(_) => "ORDER BY",
            Clause::Group(_) => "GROUP BY",
        }
    }
}

impl SqlRender for Clause {
    fn render_with(&self, dialect: &dyn Dialect) -> String {
        match self {
            Clause::Where(c) => c.render_with(dialect),
            Clause::Having(c) => c.render_with(dialect),
            Clause::Exists(c) => c.render_with(dialect),
            Clause::Order(c) => c.render_with(dialect),
            Clause::Group(c) => c.render_with(dialect),
        }
    }
}

macro_rules! clause_from {
    ($($variant:ident),+) => {
        $(
            impl From<$variant> for Clause {
                fn from(c: $variant) -> Self {
                    Clause::$variant(c)
                }
            }
        )+
    };
}

clause_from!(Where, Having, Exists, Order, Group);

display_via_render!(ConditionValue, Condition, Clause);

/// The clause slots a filtered statement carries, rendered in SQL order:
/// `WHERE`, `GROUP BY`, `ORDER BY`. An `EXISTS` guard is kept apart and
/// embedded by the owning statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ClauseSet {
    filter: Option<Where>,
    group: Option<Group>,
    order: Option<Order>,
    exists: Option<Box<Exists>>,
}

impl ClauseSet {
    /// Attach a clause, replacing any earlier clause of the same kind.
    pub(crate) fn push(&mut self, clause: Clause, allow_exists: bool) -> SqlResult<()> {
        match clause {
            Clause::Where(w) => self.filter = Some(w),
            Clause::Group(g) => self.group = Some(g),
            Clause::Order(o) => self.order = Some(o),
            Clause::Exists(e) if allow_exists => self.exists = Some(Box::new(e)),
            Clause::Exists(_) => {
                return Err(SqlError::invalid_condition(
                    "EXISTS cannot be nested in this position",
                ));
            }
            Clause::Having(_) => {
                return Err(SqlError::invalid_condition(
                    "HAVING may only be attached to GROUP BY",
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.filter.is_none() && self.group.is_none() && self.order.is_none() && self.exists.is_none()
    }

    pub(crate) fn exists(&self) -> Option<&Exists> {
        self.exists.as_deref()
    }

    /// This set with `other`'s clauses folded in: `WHERE`s are joined with
    /// `AND`, other slots are taken from `other` when set.
    pub(crate) fn merged(&self, other: &ClauseSet) -> ClauseSet {
        let filter = match (&self.filter, &other.filter) {
            (Some(a), Some(b)) => Some(a.clone().and_where(b.clone())),
            (a, b) => a.clone().or_else(|| b.clone()),
        };
        ClauseSet {
            filter,
            group: other.group.clone().or_else(|| self.group.clone()),
            order: other.order.clone().or_else(|| self.order.clone()),
            exists: None,
        }
    }

    /// Render the slots, with `predicate` (if any) joined into the `WHERE`.
    pub(crate) fn render_with_predicate(
        &self,
        dialect: &dyn Dialect,
        predicate: Option<&str>,
    ) -> String {
        let filter = match (&self.filter, predicate) {
            (Some(w), Some(p)) => format!("{} AND {p}", w.render_with(dialect)),
            (Some(w), None) => w.render_with(dialect),
            (None, Some(p)) => format!("WHERE {p}"),
            (None, None) => String::new(),
        };
        let group = self
            .group
            .as_ref()
            .map(|g| g.render_with(dialect))
            .unwrap_or_default();
        let order = self
            .order
            .as_ref()
            .map(|o| o.render_with(dialect))
            .unwrap_or_default();
        join_parts([filter.as_str(), group.as_str(), order.as_str()])
    }

    pub(crate) fn render_with(&self, dialect: &dyn Dialect) -> String {
        self.render_with_predicate(dialect, None)
    }
}

#[cfg(test)]
mod tests;
