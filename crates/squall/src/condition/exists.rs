use super::{Clause, ClauseSet};
use crate::dialect::Dialect;
use crate::error::SqlResult;
use crate::render::{SqlRender, display_via_render};
use crate::statement::Select;

/// An existence guard.
///
/// Standalone it renders `IF EXISTS` / `IF NOT EXISTS`. When attached to a
/// statement, the statement embeds it according to the dialect's
/// [`ExistsForm`](crate::ExistsForm). Without a subquery the guard checks
/// the statement itself, narrowed by the guard's own conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct Exists {
    exists: bool,
    subquery: Option<Box<Select>>,
    conditions: ClauseSet,
}

impl Exists {
    pub fn new(exists: bool) -> Self {
        Self {
            exists,
            subquery: None,
            conditions: ClauseSet::default(),
        }
    }

    /// `IF EXISTS`
    pub fn exists() -> Self {
        Self::new(true)
    }

    /// `IF NOT EXISTS`
    pub fn not_exists() -> Self {
        Self::new(false)
    }

    pub fn subquery(mut self, select: Select) -> Self {
        self.subquery = Some(Box::new(select));
        self
    }

    /// Narrow the synthesized lookup. `HAVING` and nested `EXISTS` are rejected.
    pub fn with_conditions<I, C>(mut self, clauses: I) -> SqlResult<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<Clause>,
    {
        for clause in clauses {
            self.conditions.push(clause.into(), false)?;
        }
        Ok(self)
    }

    pub fn is_exists(&self) -> bool {
        self.exists
    }

    pub fn subquery_ref(&self) -> Option<&Select> {
        self.subquery.as_deref()
    }

    pub(crate) fn conditions(&self) -> &ClauseSet {
        &self.conditions
    }

    /// `EXISTS` or `NOT EXISTS`
    pub(crate) fn keyword(&self) -> &'static str {
        if self.exists { "EXISTS" } else { "NOT EXISTS" }
    }
}

impl SqlRender for Exists {
    fn render_with(&self, _dialect: &dyn Dialect) -> String {
        format!("IF {}", self.keyword())
    }
}

display_via_render!(Exists);
