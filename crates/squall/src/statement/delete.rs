use super::{push_mutation_clause, render_guarded};
use crate::condition::{Clause, ClauseSet};
use crate::dialect::Dialect;
use crate::error::SqlResult;
use crate::render::{SqlRender, display_via_render};
use crate::table::Table;

/// `DELETE FROM <table> [WHERE ...]`
///
/// No filter means every row is deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    table: Table,
    clauses: ClauseSet,
}

impl Delete {
    pub fn new(table: impl Into<Table>) -> Self {
        Self {
            table: table.into(),
            clauses: ClauseSet::default(),
        }
    }

    pub fn condition(mut self, clause: impl Into<Clause>) -> SqlResult<Self> {
        push_mutation_clause(&mut self.clauses, clause.into())?;
        Ok(self)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }
}

impl SqlRender for Delete {
    fn render_with(&self, dialect: &dyn Dialect) -> String {
        let head = format!("DELETE FROM {}", self.table.name());
        render_guarded(&head, &self.clauses, dialect)
    }
}

display_via_render!(Delete);
