//! Table names, column definitions and table constraints.

use crate::condition::Sort;
use crate::dialect::Dialect;
use crate::render::{SqlRender, display_via_render};

/// A table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl SqlRender for Table {
    fn render_with(&self, _dialect: &dyn Dialect) -> String {
        self.name.clone()
    }
}

impl From<&str> for Table {
    fn from(name: &str) -> Self {
        Table::new(name)
    }
}

impl From<String> for Table {
    fn from(name: String) -> Self {
        Table::new(name)
    }
}

/// A column definition for `CREATE TABLE`.
///
/// ```
/// use squall::{Column, SqlRender};
///
/// let col = Column::new("qty").sql_type("INTEGER").not_null();
/// assert_eq!(col.render(), "qty INTEGER NOT NULL");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    sql_type: Option<String>,
    nullable: Option<bool>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: None,
            nullable: None,
        }
    }

    /// Force a SQL type annotation.
    pub fn sql_type(mut self, sql_type: impl Into<String>) -> Self {
        self.sql_type = Some(sql_type.into());
        self
    }

    /// Append an explicit `NULL`.
    pub fn null(mut self) -> Self {
        self.nullable = Some(true);
        self
    }

    /// Append an explicit `NOT NULL`.
    pub fn not_null(mut self) -> Self {
        self.nullable = Some(false);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl SqlRender for Column {
    fn render_with(&self, _dialect: &dyn Dialect) -> String {
        let mut sql = self.name.clone();
        if let Some(ty) = &self.sql_type {
            sql.push(' ');
            sql.push_str(ty);
        }
        match self.nullable {
            Some(true) => sql.push_str(" NULL"),
            Some(false) => sql.push_str(" NOT NULL"),
            None => {}
        }
        sql
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Column::new(name)
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Column::new(name)
    }
}

/// A table-level constraint for `CREATE TABLE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// `PRIMARY KEY(<columns>[ ASC|DESC])`
    PrimaryKey {
        columns: Vec<String>,
        sort: Option<Sort>,
    },
    /// `UNIQUE(<columns>)`
    Unique(Vec<String>),
    /// `FOREIGN KEY(<column>) REFERENCES <table>(<references>)`
    ForeignKey {
        column: String,
        table: String,
        references: String,
    },
    /// Raw constraint text, emitted as-is.
    Raw(String),
}

impl Constraint {
    pub fn primary_key<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Constraint::PrimaryKey {
            columns: columns.into_iter().map(Into::into).collect(),
            sort: None,
        }
    }

    pub fn unique<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Constraint::Unique(columns.into_iter().map(Into::into).collect())
    }

    pub fn foreign_key(
        column: impl Into<String>,
        table: impl Into<String>,
        references: impl Into<String>,
    ) -> Self {
        Constraint::ForeignKey {
            column: column.into(),
            table: table.into(),
            references: references.into(),
        }
    }

    /// Set the key order of a primary key. No effect on other constraints.
    pub fn sorted(self, order: Sort) -> Self {
        match self {
            Constraint::PrimaryKey { columns, .. } => Constraint::PrimaryKey {
                columns,
                sort: Some(order),
            },
            other => other,
        }
    }
}

impl SqlRender for Constraint {
    fn render_with(&self, _dialect: &dyn Dialect) -> String {
        match self {
            Constraint::PrimaryKey { columns, sort } => match sort {
                Some(sort) => format!("PRIMARY KEY({} {})", columns.join(", "), sort.as_str()),
                None => format!("PRIMARY KEY({})", columns.join(", ")),
            },
            Constraint::Unique(columns) => format!("UNIQUE({})", columns.join(", ")),
            Constraint::ForeignKey {
                column,
                table,
                references,
            } => format!("FOREIGN KEY({column}) REFERENCES {table}({references})"),
            Constraint::Raw(sql) => sql.clone(),
        }
    }
}

display_via_render!(Table, Column, Constraint);
