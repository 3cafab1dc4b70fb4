use super::Having;
use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::fields::Fields;
use crate::render::{SqlRender, display_via_render, join_parts};
use std::fmt;
use std::str::FromStr;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sort {
    Asc,
    Desc,
}

impl Sort {
    pub fn as_str(self) -> &'static str {
        match self {
            Sort::Asc => "ASC",
            Sort::Desc => "DESC",
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sort {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Sort::Asc),
            "DESC" => Ok(Sort::Desc),
            _ => Err(SqlError::invalid_condition(format!("invalid sort order '{s}'"))),
        }
    }
}

/// `ORDER BY <fields> [COLLATE <name>] [ASC|DESC]`
///
/// ```
/// use squall::{Fields, Order, Sort, SqlRender};
///
/// let order = Order::new(Fields::new(["name"])?).nocase().sort(Sort::Desc);
/// assert_eq!(order.render(), "ORDER BY name COLLATE NOCASE DESC");
/// # Ok::<(), squall::SqlError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Order {
    fields: Fields,
    columns: Vec<String>,
    collate: Option<String>,
    nocase: bool,
    sort: Option<Sort>,
}

impl Order {
    pub fn new(fields: Fields) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// Order by plain column names.
    pub fn by<I, S>(names: I) -> SqlResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::new(Fields::new(names)?))
    }

    /// Append extra columns after the field list.
    pub fn columns<I, S>(mut self, columns: I) -> SqlResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            let column = column.into();
            if column.trim().is_empty() {
                return Err(SqlError::invalid_field_format("order column is blank"));
            }
            self.columns.push(column);
        }
        Ok(self)
    }

    pub fn collate(mut self, collation: impl Into<String>) -> Self {
        self.collate = Some(collation.into());
        self
    }

    /// `COLLATE NOCASE`, unless an explicit collation is set.
    pub fn nocase(mut self) -> Self {
        self.nocase = true;
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn set_sort(&mut self, sort: Sort) {
        self.sort = Some(sort);
    }

    /// Parse and set the sort order.
    pub fn set_sort_str(&mut self, sort: &str) -> SqlResult<()> {
        self.sort = Some(sort.parse()?);
        Ok(())
    }
}

impl SqlRender for Order {
    fn render_with(&self, dialect: &dyn Dialect) -> String {
        let mut list = self.fields.render_with(dialect);
        for column in &self.columns {
            if !list.is_empty() {
                list.push_str(", ");
            }
            list.push_str(column);
        }
        let collate = match (&self.collate, self.nocase) {
            (Some(name), _) => format!("COLLATE {name}"),
            (None, true) => "COLLATE NOCASE".to_string(),
            (None, false) => String::new(),
        };
        let sort = self.sort.map(Sort::as_str).unwrap_or_default();
        join_parts(["ORDER BY", list.as_str(), collate.as_str(), sort])
    }
}

/// `GROUP BY <fields> [HAVING ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    fields: Fields,
    having: Option<Having>,
}

impl Group {
    pub fn new(fields: Fields) -> Self {
        Self {
            fields,
            having: None,
        }
    }

    pub fn by<I, S>(names: I) -> SqlResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::new(Fields::new(names)?))
    }

    pub fn having(mut self, having: Having) -> Self {
        self.having = Some(having);
        self
    }
}

impl SqlRender for Group {
    fn render_with(&self, dialect: &dyn Dialect) -> String {
        let fields = self.fields.render_with(dialect);
        let having = self
            .having
            .as_ref()
            .map(|h| h.render_with(dialect))
            .unwrap_or_default();
        join_parts(["GROUP BY", fields.as_str(), having.as_str()])
    }
}

display_via_render!(Order, Group);
