use super::{push_mutation_clause, render_guarded};
use crate::condition::{Clause, ClauseSet};
use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::fields::Fields;
use crate::render::{SqlRender, display_via_render};
use crate::table::Table;
use crate::value::Value;

/// `UPDATE <table> SET <f1> = <v1>, ... [WHERE ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    table: Table,
    fields: Fields,
    values: Vec<Value>,
    clauses: ClauseSet,
}

impl Update {
    /// Fields and values pair up by position.
    ///
    /// Fails with [`SqlError::InvalidValue`] on a count mismatch or a tuple
    /// value, and with [`SqlError::InvalidFieldFormat`] on `*`.
    pub fn new<I, V>(table: impl Into<Table>, fields: Fields, values: I) -> SqlResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        if fields.is_wildcard() {
            return Err(SqlError::invalid_field_format("UPDATE cannot SET '*'"));
        }
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() || fields.len() != values.len() {
            return Err(SqlError::invalid_value(format!(
                "UPDATE has {} fields but {} values",
                fields.len(),
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_scalar()) {
            return Err(SqlError::invalid_value("UPDATE values must be scalars"));
        }
        Ok(Self {
            table: table.into(),
            fields,
            values,
            clauses: ClauseSet::default(),
        })
    }

    pub fn condition(mut self, clause: impl Into<Clause>) -> SqlResult<Self> {
        push_mutation_clause(&mut self.clauses, clause.into())?;
        Ok(self)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }
}

impl SqlRender for Update {
    fn render_with(&self, dialect: &dyn Dialect) -> String {
        let assignments = self
            .fields
            .names()
            .iter()
            .zip(&self.values)
            .map(|(field, value)| format!("{field} = {}", value.render_with(dialect)))
            .collect::<Vec<_>>()
            .join(", ");
        let head = format!("UPDATE {} SET {assignments}", self.table.name());
        render_guarded(&head, &self.clauses, dialect)
    }
}

display_via_render!(Update);
