use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::fields::Fields;
use crate::render::{SqlRender, display_via_render};
use crate::table::Table;
use crate::value::Value;

/// `INSERT INTO <table>[(<fields>)] VALUES (<values>)`
///
/// The field list is omitted when it is empty or `*`.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    table: Table,
    fields: Fields,
    values: Vec<Value>,
}

impl Insert {
    /// Fails with [`SqlError::InvalidValue`] when no values are given, when a
    /// value is a tuple, or when an explicit field list and the values differ
    /// in length.
    pub fn new<I, V>(table: impl Into<Table>, fields: Fields, values: I) -> SqlResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(SqlError::invalid_value("INSERT needs at least one value"));
        }
        if values.iter().any(|v| !v.is_scalar()) {
            return Err(SqlError::invalid_value("INSERT values must be scalars"));
        }
        if fields.is_explicit() && fields.len() != values.len() {
            return Err(SqlError::invalid_value(format!(
                "INSERT has {} fields but {} values",
                fields.len(),
                values.len()
            )));
        }
        Ok(Self {
            table: table.into(),
            fields,
            values,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl SqlRender for Insert {
    fn render_with(&self, dialect: &dyn Dialect) -> String {
        let values = self
            .values
            .iter()
            .map(|v| v.render_with(dialect))
            .collect::<Vec<_>>()
            .join(", ");
        if self.fields.is_explicit() {
            format!(
                "INSERT INTO {}({}) VALUES ({values})",
                self.table.name(),
                self.fields.plain()
            )
        } else {
            format!("INSERT INTO {} VALUES ({values})", self.table.name())
        }
    }
}

display_via_render!(Insert);
