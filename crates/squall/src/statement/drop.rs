use super::{Command, table_guard};
use crate::condition::Exists;
use crate::dialect::{Dialect, ExistsForm};
use crate::error::SqlResult;
use crate::render::{SqlRender, display_via_render};
use crate::table::Table;

/// `DROP TABLE [IF EXISTS] <table>`
#[derive(Debug, Clone, PartialEq)]
pub struct DropTable {
    table: Table,
    exists: Option<Exists>,
}

impl DropTable {
    pub fn new(table: impl Into<Table>) -> Self {
        Self {
            table: table.into(),
            exists: None,
        }
    }

    /// Only a plain [`Exists::exists`] is accepted; anything else fails with
    /// [`SqlError::InvalidCondition`](crate::SqlError::InvalidCondition).
    pub fn exists(mut self, exists: Exists) -> SqlResult<Self> {
        self.exists = Some(table_guard(exists, Command::Drop)?);
        Ok(self)
    }

    /// `DROP TABLE IF EXISTS`
    pub fn if_exists(mut self) -> Self {
        self.exists = Some(Exists::exists());
        self
    }

    pub fn table(&self) -> &Table {
        &self.table
    }
}

impl SqlRender for DropTable {
    fn render_with(&self, dialect: &dyn Dialect) -> String {
        let table = self.table.name();
        match &self.exists {
            None => format!("DROP TABLE {table}"),
            Some(exists) => match dialect.exists_form() {
                ExistsForm::Inline => format!("DROP TABLE {} {table}", exists.render_with(dialect)),
                ExistsForm::Wrap => format!(
                    "IF {}({}) DROP TABLE {table}",
                    exists.keyword(),
                    dialect.table_lookup(table)
                ),
            },
        }
    }
}

display_via_render!(DropTable);
