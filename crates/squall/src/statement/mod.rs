//! Statement objects.
//!
//! Each statement renders itself from its table, fields, values and clauses.
//! Rendering is pure; statements never touch a connection.
//!
//! ## Existence guards
//!
//! Statements embed an [`Exists`](crate::Exists) guard according to the
//! dialect's [`ExistsForm`]:
//!
//! - `Inline`: `DROP TABLE IF EXISTS t`, `... WHERE EXISTS (<subquery>)`
//! - `Wrap`: `IF EXISTS(<subquery>) <statement>`

pub mod create;
pub mod delete;
pub mod drop;
pub mod insert;
pub mod select;
pub mod update;
pub mod verbatim;

pub use create::Create;
pub use delete::Delete;
pub use drop::DropTable;
pub use insert::Insert;
pub use select::Select;
pub use update::Update;
pub use verbatim::Verbatim;

use crate::condition::{Clause, ClauseSet, Exists};
use crate::dialect::{Dialect, ExistsForm};
use crate::error::{SqlError, SqlResult};
use crate::render::{SqlRender, display_via_render, join_parts};
use std::fmt;
use std::str::FromStr;

/// The fixed set of command tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Drop,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Select => "SELECT",
            Command::Insert => "INSERT",
            Command::Update => "UPDATE",
            Command::Delete => "DELETE",
            Command::Create => "CREATE",
            Command::Drop => "DROP",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SELECT" => Ok(Command::Select),
            "INSERT" => Ok(Command::Insert),
            "UPDATE" => Ok(Command::Update),
            "DELETE" => Ok(Command::Delete),
            "CREATE" => Ok(Command::Create),
            "DROP" => Ok(Command::Drop),
            _ => Err(SqlError::InvalidSqlCommand(s.to_string())),
        }
    }
}

/// Any runnable statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(Select),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
    Create(Create),
    Drop(DropTable),
    Verbatim(Verbatim),
}

impl Statement {
    /// The command tag, when the statement has one.
    ///
    /// Verbatim SQL reports the tag of its first keyword if it is one of the
    /// known commands.
    pub fn command(&self) -> Option<Command> {
        match self {
            Statement::Select(_) => Some(Command::Select),
            Statement::Insert(_) => Some(Command::Insert),
            Statement::Update(_) => Some(Command::Update),
            Statement::Delete(_) => Some(Command::Delete),
            Statement::Create(_) => Some(Command::Create),
            Statement::Drop(_) => Some(Command::Drop),
            Statement::Verbatim(v) => v.first_keyword().and_then(|kw| kw.parse().ok()),
        }
    }

    /// Whether running this statement returns rows.
    pub fn is_query(&self) -> bool {
        match self {
            Statement::Select(_) => true,
            Statement::Verbatim(v) => v.is_query(),
            _ => false,
        }
    }

    /// Check that the statement can be queued.
    pub fn validate(&self) -> SqlResult<()> {
        match self {
            Statement::Verbatim(v) if v.is_blank() => Err(SqlError::InvalidSquallObject(
                "verbatim SQL is blank".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl SqlRender for Statement {
    fn render_with(&self, dialect: &dyn Dialect) -> String {
        match self {
            Statement::Select(s) => s.render_with(dialect),
            Statement::Insert(s) => s.render_with(dialect),
            Statement::Update(s) => s.render_with(dialect),
            Statement::Delete(s) => s.render_with(dialect),
            Statement::Create(s) => s.render_with(dialect),
            Statement::Drop(s) => s.render_with(dialect),
            Statement::Verbatim(s) => s.render_with(dialect),
        }
    }
}

macro_rules! statement_from {
    ($($variant:ident),+) => {
        $(
            impl From<$variant> for Statement {
                fn from(s: $variant) -> Self {
                    Statement::$variant(s)
                }
            }
        )+
    };
}

statement_from!(Select, Insert, Update, Delete, Create, Verbatim);

impl From<DropTable> for Statement {
    fn from(s: DropTable) -> Self {
        Statement::Drop(s)
    }
}

impl From<&str> for Statement {
    fn from(sql: &str) -> Self {
        Statement::Verbatim(Verbatim::new(sql))
    }
}

impl From<String> for Statement {
    fn from(sql: String) -> Self {
        Statement::Verbatim(Verbatim::new(sql))
    }
}

display_via_render!(Statement);

/// Attach a clause to a mutating statement: an `EXISTS` guard needs a subquery.
pub(crate) fn push_mutation_clause(clauses: &mut ClauseSet, clause: Clause) -> SqlResult<()> {
    if matches!(&clause, Clause::Exists(e) if e.subquery_ref().is_none()) {
        return Err(SqlError::invalid_condition(
            "EXISTS on a mutating statement needs a subquery",
        ));
    }
    clauses.push(clause, true)
}

/// Check a `CREATE`/`DROP` table guard: it must have the polarity the command
/// understands (`IF NOT EXISTS` for create, `IF EXISTS` for drop) and check
/// the table itself, so it cannot carry a subquery or conditions.
pub(crate) fn table_guard(exists: Exists, command: Command) -> SqlResult<Exists> {
    let wanted = command == Command::Drop;
    if exists.is_exists() != wanted {
        return Err(SqlError::invalid_condition(format!(
            "{command} TABLE only accepts IF {}",
            if wanted { "EXISTS" } else { "NOT EXISTS" }
        )));
    }
    if exists.subquery_ref().is_some() || !exists.conditions().is_empty() {
        return Err(SqlError::invalid_condition(format!(
            "{command} TABLE guards check the table itself and take no subquery or conditions"
        )));
    }
    Ok(exists)
}

/// Render `head` followed by `clauses`, embedding a subquery `EXISTS` guard.
pub(crate) fn render_guarded(head: &str, clauses: &ClauseSet, dialect: &dyn Dialect) -> String {
    let Some((exists, subquery)) = clauses
        .exists()
        .and_then(|e| e.subquery_ref().map(|q| (e, q)))
    else {
        return join_parts([head, clauses.render_with(dialect).as_str()]);
    };
    let subquery = subquery.render_with(dialect);
    match dialect.exists_form() {
        ExistsForm::Inline => {
            let predicate = format!("{} ({subquery})", exists.keyword());
            join_parts([
                head,
                clauses
                    .render_with_predicate(dialect, Some(&predicate))
                    .as_str(),
            ])
        }
        ExistsForm::Wrap => {
            let body = join_parts([head, clauses.render_with(dialect).as_str()]);
            format!("IF {}({subquery}) {body}", exists.keyword())
        }
    }
}

#[cfg(test)]
mod tests;
