use super::{Clause, Condition, Conjunction, IntoConditionValue};
use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::render::{SqlRender, display_via_render};
use crate::statement::Select;
use crate::value::Value;

/// Shared body of `WHERE` and `HAVING`: one condition plus nested `Where`s.
#[derive(Debug, Clone, PartialEq)]
struct Chain {
    condition: Condition,
    conditions: Vec<Where>,
    operand: Conjunction,
}

impl Chain {
    fn new(condition: Condition) -> Self {
        Self {
            condition,
            conditions: Vec::new(),
            operand: Conjunction::default(),
        }
    }

    fn push(&mut self, clause: Clause) -> SqlResult<()> {
        match clause {
            Clause::Where(w) => {
                self.conditions.push(w);
                Ok(())
            }
            Clause::Having(_) => Err(SqlError::invalid_condition(
                "HAVING may only be attached to GROUP BY",
            )),
            other => Err(SqlError::invalid_condition(format!(
                "{} cannot be chained into a condition",
                other.kind()
            ))),
        }
    }

    fn render(&self, keyword: &str, dialect: &dyn Dialect) -> String {
        let mut sql = format!("{keyword} {}", self.condition.render_with(dialect));
        for nested in &self.conditions {
            let rendered = nested.render_with(dialect);
            // Only the leading keyword is rewritten.
            let tail = rendered.strip_prefix("WHERE").unwrap_or(&rendered);
            sql.push(' ');
            sql.push_str(self.operand.as_str());
            if !tail.starts_with(' ') {
                sql.push(' ');
            }
            sql.push_str(tail);
        }
        sql.trim().to_string()
    }
}

/// `WHERE <field> <op> <value> [<operand> <nested>...]`
#[derive(Debug, Clone, PartialEq)]
pub struct Where {
    chain: Chain,
}

impl Where {
    pub fn new(
        field: impl Into<String>,
        operator: &str,
        value: impl IntoConditionValue,
    ) -> SqlResult<Self> {
        Ok(Self::from_condition(Condition::new(field, operator, value)?))
    }

    pub fn from_condition(condition: Condition) -> Self {
        Self {
            chain: Chain::new(condition),
        }
    }

    /// `WHERE <field> IN (<list>)`
    pub fn is_in(field: impl Into<String>, list: InList) -> SqlResult<Self> {
        Self::new(field, "IN", list)
    }

    /// `WHERE <field> NOT IN (<list>)`
    pub fn not_in(field: impl Into<String>, list: InList) -> SqlResult<Self> {
        Self::new(field, "NOT IN", list)
    }

    /// Nest a clause under this one. Only `Where` clauses may be nested.
    pub fn chain(mut self, clause: impl Into<Clause>) -> SqlResult<Self> {
        self.chain.push(clause.into())?;
        Ok(self)
    }

    pub fn with_conditions<I, C>(mut self, clauses: I) -> SqlResult<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<Clause>,
    {
        for clause in clauses {
            self.chain.push(clause.into())?;
        }
        Ok(self)
    }

    /// Nest another `Where`; infallible form of [`Where::chain`].
    pub fn and_where(mut self, other: Where) -> Self {
        self.chain.conditions.push(other);
        self
    }

    pub fn with_operand(mut self, operand: Conjunction) -> Self {
        self.chain.operand = operand;
        self
    }

    pub fn set_operand(&mut self, operand: Conjunction) {
        self.chain.operand = operand;
    }

    pub fn operand(&self) -> Conjunction {
        self.chain.operand
    }

    /// The head condition, without the nested chain.
    pub fn condition(&self) -> &Condition {
        &self.chain.condition
    }

    pub fn conditions(&self) -> &[Where] {
        &self.chain.conditions
    }
}

impl SqlRender for Where {
    fn render_with(&self, dialect: &dyn Dialect) -> String {
        self.chain.render("WHERE", dialect)
    }
}

/// `HAVING <field> <op> <value> [...]`, attached through [`Group`](super::Group).
#[derive(Debug, Clone, PartialEq)]
pub struct Having {
    chain: Chain,
}

impl Having {
    pub fn new(
        field: impl Into<String>,
        operator: &str,
        value: impl IntoConditionValue,
    ) -> SqlResult<Self> {
        Ok(Self {
            chain: Chain::new(Condition::new(field, operator, value)?),
        })
    }

    pub fn chain(mut self, clause: impl Into<Clause>) -> SqlResult<Self> {
        self.chain.push(clause.into())?;
        Ok(self)
    }

    pub fn with_operand(mut self, operand: Conjunction) -> Self {
        self.chain.operand = operand;
        self
    }

    pub fn set_operand(&mut self, operand: Conjunction) {
        self.chain.operand = operand;
    }

    pub fn condition(&self) -> &Condition {
        &self.chain.condition
    }
}

impl SqlRender for Having {
    fn render_with(&self, dialect: &dyn Dialect) -> String {
        self.chain.render("HAVING", dialect)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ListKind {
    Values(Vec<Value>),
    Tuple(Value),
    Subquery(Box<Select>),
}

/// The parenthesised right-hand side of `IN` / `NOT IN`.
#[derive(Debug, Clone, PartialEq)]
pub struct InList {
    kind: ListKind,
}

impl InList {
    /// A list of values. Fails with [`SqlError::InvalidValue`] when empty.
    pub fn values<I, V>(values: I) -> SqlResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(SqlError::invalid_value("IN list is empty"));
        }
        Ok(Self {
            kind: ListKind::Values(values),
        })
    }

    pub fn tuple(value: Value) -> Self {
        Self {
            kind: ListKind::Tuple(value),
        }
    }

    pub fn subquery(select: Select) -> Self {
        Self {
            kind: ListKind::Subquery(Box::new(select)),
        }
    }
}

impl SqlRender for InList {
    fn render_with(&self, dialect: &dyn Dialect) -> String {
        match &self.kind {
            ListKind::Values(values) => format!(
                "({})",
                values
                    .iter()
                    .map(|v| v.render_with(dialect))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            ListKind::Tuple(value) => format!("({})", value.render_list(dialect)),
            ListKind::Subquery(select) => format!("({})", select.render_with(dialect)),
        }
    }
}

display_via_render!(Where, Having, InList);
