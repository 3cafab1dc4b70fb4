//! Column lists with optional `DISTINCT` subsets.

use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::render::{SqlRender, display_via_render};

const WILDCARD: &str = "*";

/// An ordered list of column names.
///
/// - no names renders as the empty string (bare positional `INSERT`)
/// - a `*` anywhere collapses the list to `*`
/// - a distinct subset renders as `DISTINCT (<distinct>), <rest>`
///
/// ```
/// use squall::{Fields, SqlRender};
///
/// assert_eq!(Fields::new(["a", "b", "c"])?.render(), "a, b, c");
/// assert_eq!(
///     Fields::new(["a", "b", "c"])?.distinct(["a"])?.render(),
///     "DISTINCT (a), b, c"
/// );
/// # Ok::<(), squall::SqlError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    names: Vec<String>,
    distinct: Vec<String>,
}

impl Fields {
    /// Build a field list. Blank names fail with [`SqlError::InvalidFieldFormat`].
    pub fn new<I, S>(names: I) -> SqlResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if let Some(pos) = names.iter().position(|n| n.trim().is_empty()) {
            return Err(SqlError::invalid_field_format(format!(
                "field at position {pos} is blank"
            )));
        }
        let names = if names.iter().any(|n| n == WILDCARD) {
            vec![WILDCARD.to_string()]
        } else {
            names
        };
        Ok(Self {
            names,
            distinct: Vec::new(),
        })
    }

    /// No fields at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// `*`
    pub fn all() -> Self {
        Self {
            names: vec![WILDCARD.to_string()],
            distinct: Vec::new(),
        }
    }

    /// Mark a subset of the fields as `DISTINCT`.
    pub fn distinct<I, S>(mut self, distinct: I) -> SqlResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_distinct(distinct)?;
        Ok(self)
    }

    /// Replace the distinct subset in place.
    ///
    /// Every distinct name must already be in the field list.
    pub fn set_distinct<I, S>(&mut self, distinct: I) -> SqlResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let distinct: Vec<String> = distinct.into_iter().map(Into::into).collect();
        if let Some(unknown) = distinct.iter().find(|d| !self.names.contains(d)) {
            return Err(SqlError::invalid_field_format(format!(
                "distinct field '{unknown}' is not in the field list"
            )));
        }
        self.distinct = distinct;
        Ok(())
    }

    /// Column names in the order given.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of listed columns; `*` counts as one.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when no column was given.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// True for the single `*` list.
    pub fn is_wildcard(&self) -> bool {
        self.names.len() == 1 && self.names[0] == WILDCARD
    }

    /// Whether the list names explicit columns (not empty, not `*`).
    pub(crate) fn is_explicit(&self) -> bool {
        !self.is_empty() && !self.is_wildcard()
    }

    /// Plain comma list of the names, ignoring `DISTINCT`.
    pub(crate) fn plain(&self) -> String {
        self.names.join(", ")
    }
}

impl SqlRender for Fields {
    fn render_with(&self, _dialect: &dyn Dialect) -> String {
        if self.distinct.is_empty() {
            return self.plain();
        }
        let rest: Vec<&str> = self
            .names
            .iter()
            .filter(|n| !self.distinct.contains(n))
            .map(String::as_str)
            .collect();
        if rest.is_empty() {
            format!("DISTINCT ({})", self.plain())
        } else {
            format!("DISTINCT ({}), {}", self.distinct.join(", "), rest.join(", "))
        }
    }
}

display_via_render!(Fields);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_list() {
        let f = Fields::new(["a", "b", "c"]).unwrap();
        assert_eq!(f.render(), "a, b, c");
    }

    #[test]
    fn empty_list_renders_empty() {
        assert_eq!(Fields::empty().render(), "");
        assert_eq!(Fields::new(Vec::<String>::new()).unwrap().render(), "");
    }

    #[test]
    fn wildcard_collapses() {
        let f = Fields::new(["a", "*", "c"]).unwrap();
        assert!(f.is_wildcard());
        assert_eq!(f.render(), "*");
    }

    #[test]
    fn distinct_subset_and_all() {
        let mut f = Fields::new(["a", "b", "c"]).unwrap().distinct(["a"]).unwrap();
        assert_eq!(f.render(), "DISTINCT (a), b, c");
        f.set_distinct(["a", "b", "c"]).unwrap();
        assert_eq!(f.render(), "DISTINCT (a, b, c)");
    }

    #[test]
    fn rendering_is_idempotent() {
        let f = Fields::new(["x", "y"]).unwrap().distinct(["y"]).unwrap();
        assert_eq!(f.render(), f.render());
    }

    #[test]
    fn invalid_inputs() {
        assert!(matches!(
            Fields::new(["a", " "]),
            Err(SqlError::InvalidFieldFormat(_))
        ));
        let f = Fields::new(["a"]).unwrap();
        assert!(matches!(
            f.distinct(["z"]),
            Err(SqlError::InvalidFieldFormat(_))
        ));
    }
}
