use super::render_guarded;
use crate::condition::{Clause, ClauseSet};
use crate::dialect::{Dialect, ExistsForm};
use crate::error::SqlResult;
use crate::fields::Fields;
use crate::render::{SqlRender, display_via_render, join_parts};
use crate::table::Table;

/// `SELECT <fields> FROM <table> [WHERE ...] [GROUP BY ...] [ORDER BY ...]`
///
/// An empty field list selects `*`.
///
/// ```
/// use squall::{Fields, Select, SqlRender, Value, Where};
///
/// let q = Select::new("users", Fields::new(["id", "name"])?)
///     .condition(Where::new("id", "=", Value::new(7))?)?;
/// assert_eq!(q.render(), "SELECT id, name FROM users WHERE id = 7");
/// # Ok::<(), squall::SqlError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    table: Table,
    fields: Fields,
    clauses: ClauseSet,
}

impl Select {
    pub fn new(table: impl Into<Table>, fields: Fields) -> Self {
        Self {
            table: table.into(),
            fields,
            clauses: ClauseSet::default(),
        }
    }

    /// `SELECT * FROM <table>`
    pub fn all(table: impl Into<Table>) -> Self {
        Self::new(table, Fields::all())
    }

    /// Attach a clause. A later clause of the same kind replaces the earlier one.
    ///
    /// A bare `HAVING` fails with [`SqlError::InvalidCondition`](crate::SqlError::InvalidCondition).
    pub fn condition(mut self, clause: impl Into<Clause>) -> SqlResult<Self> {
        self.clauses.push(clause.into(), true)?;
        Ok(self)
    }

    pub fn with_conditions<I, C>(mut self, clauses: I) -> SqlResult<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<Clause>,
    {
        for clause in clauses {
            self.clauses.push(clause.into(), true)?;
        }
        Ok(self)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    fn head(&self, dialect: &dyn Dialect) -> String {
        let fields = if self.fields.is_empty() {
            "*".to_string()
        } else {
            self.fields.render_with(dialect)
        };
        format!("SELECT {fields} FROM {}", self.table.name())
    }
}

impl SqlRender for Select {
    fn render_with(&self, dialect: &dyn Dialect) -> String {
        let head = self.head(dialect);
        let Some(exists) = self.clauses.exists() else {
            return join_parts([head.as_str(), self.clauses.render_with(dialect).as_str()]);
        };
        if exists.subquery_ref().is_some() {
            return render_guarded(&head, &self.clauses, dialect);
        }

        // No subquery: check this select, narrowed by the guard's conditions.
        let narrowed = self.clauses.merged(exists.conditions());
        let lookup = join_parts([head.as_str(), narrowed.render_with(dialect).as_str()]);
        match dialect.exists_form() {
            ExistsForm::Inline => format!("SELECT {}({lookup})", exists.keyword()),
            ExistsForm::Wrap => format!(
                "SELECT CASE WHEN {}({lookup}) THEN 1 ELSE 0 END",
                exists.keyword()
            ),
        }
    }
}

display_via_render!(Select);
