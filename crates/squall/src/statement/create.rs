use super::{Command, table_guard};
use crate::condition::Exists;
use crate::dialect::{Dialect, ExistsForm};
use crate::error::{SqlError, SqlResult};
use crate::render::{SqlRender, display_via_render};
use crate::table::{Column, Constraint, Table};

/// `CREATE TABLE <table>(<columns>[, <constraint>...])`
///
/// ```
/// use squall::{Column, Constraint, Create, SqlRender};
///
/// let create = Create::new("t", [Column::new("x").sql_type("INTEGER"), Column::new("y")])?
///     .constraint(Constraint::primary_key(["x"]))
///     .if_not_exists();
/// assert_eq!(
///     create.render(),
///     "CREATE TABLE IF NOT EXISTS t(x INTEGER, y, PRIMARY KEY(x))"
/// );
/// # Ok::<(), squall::SqlError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Create {
    table: Table,
    columns: Vec<Column>,
    constraints: Vec<Constraint>,
    exists: Option<Exists>,
}

impl Create {
    /// Fails with [`SqlError::InvalidFieldFormat`] when no columns are given.
    pub fn new<I, C>(table: impl Into<Table>, columns: I) -> SqlResult<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        let columns: Vec<Column> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(SqlError::invalid_field_format(
                "CREATE TABLE needs at least one column",
            ));
        }
        Ok(Self {
            table: table.into(),
            columns,
            constraints: Vec::new(),
            exists: None,
        })
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_constraints(mut self, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        self.constraints.extend(constraints);
        self
    }

    /// Guard the create with a table-existence check.
    ///
    /// Only a plain [`Exists::not_exists`] is accepted; anything else fails
    /// with [`SqlError::InvalidCondition`].
    pub fn exists(mut self, exists: Exists) -> SqlResult<Self> {
        self.exists = Some(table_guard(exists, Command::Create)?);
        Ok(self)
    }

    /// `CREATE TABLE IF NOT EXISTS`
    pub fn if_not_exists(mut self) -> Self {
        self.exists = Some(Exists::not_exists());
        self
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    fn body(&self, dialect: &dyn Dialect) -> String {
        let mut body = self
            .columns
            .iter()
            .map(|c| c.render_with(dialect))
            .collect::<Vec<_>>()
            .join(", ");
        for constraint in &self.constraints {
            body.push_str(", ");
            body.push_str(&constraint.render_with(dialect));
        }
        format!("{}({body})", self.table.name())
    }
}

impl SqlRender for Create {
    fn render_with(&self, dialect: &dyn Dialect) -> String {
        let body = self.body(dialect);
        match &self.exists {
            None => format!("CREATE TABLE {body}"),
            Some(exists) => match dialect.exists_form() {
                ExistsForm::Inline => format!("CREATE TABLE {} {body}", exists.render_with(dialect)),
                ExistsForm::Wrap => format!(
                    "IF {}({}) CREATE TABLE {body}",
                    exists.keyword(),
                    dialect.table_lookup(self.table.name())
                ),
            },
        }
    }
}

display_via_render!(Create);
