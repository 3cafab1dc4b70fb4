use crate::dialect::Dialect;
use crate::render::{SqlRender, display_via_render};

/// Raw SQL passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verbatim {
    sql: String,
}

impl Verbatim {
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn is_blank(&self) -> bool {
        self.sql.trim().is_empty()
    }

    pub(crate) fn first_keyword(&self) -> Option<&str> {
        self.sql.split_whitespace().next()
    }

    /// Row-returning statements: `SELECT`, `WITH`, `VALUES`, `PRAGMA`.
    pub fn is_query(&self) -> bool {
        self.first_keyword().is_some_and(|kw| {
            let kw = kw.trim_start_matches('(');
            ["SELECT", "WITH", "VALUES", "PRAGMA"]
                .iter()
                .any(|q| kw.eq_ignore_ascii_case(q))
        })
    }
}

impl SqlRender for Verbatim {
    fn render_with(&self, _dialect: &dyn Dialect) -> String {
        self.sql.clone()
    }
}

display_via_render!(Verbatim);
