//! Literal values.
//!
//! A [`Value`] wraps one [`Scalar`] (or, for `IN` lists, an ordered tuple of
//! scalars) and owns the conversion rules into SQL text:
//!
//! - text is wrapped in single quotes; embedded quotes are **not** escaped
//!   unless the value was built with [`Value::sanitized`]
//! - dates and date/times use the dialect's literal format
//! - everything else uses its natural string form
//!
//! Literal rendering is not an injection defence. Values that come from
//! untrusted input belong in a parameterized driver call.
//!
//! # Example
//! ```
//! use squall::{SqlRender, Value};
//!
//! assert_eq!(Value::new(5).render(), "5");
//! assert_eq!(Value::new("hello world").render(), "'hello world'");
//! assert_eq!(Value::tuple([1, 2, 3])?.render(), "(1, 2, 3)");
//! # Ok::<(), squall::SqlError>(())
//! ```

use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::render::{SqlRender, display_via_render};
use chrono::{NaiveDate, NaiveDateTime};

/// Placeholder substituted for `'` in sanitized text values.
pub const QUOTE_PLACEHOLDER: &str = "U+0027";

/// A single SQL literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    /// Always rendered with a fraction or exponent; NaN and infinities render `NULL`.
    Real(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Scalar {
    fn sanitize(self) -> Self {
        match self {
            Scalar::Text(s) => Scalar::Text(s.replace('\'', QUOTE_PLACEHOLDER)),
            other => other,
        }
    }
}

impl SqlRender for Scalar {
    fn render_with(&self, dialect: &dyn Dialect) -> String {
        match self {
            Scalar::Null => "NULL".to_string(),
            Scalar::Bool(b) => dialect.bool_literal(*b).to_string(),
            Scalar::Integer(i) => i.to_string(),
            // `{:?}` keeps the fraction (`1.0`), so the literal reads back as a real.
            Scalar::Real(r) if r.is_finite() => format!("{r:?}"),
            Scalar::Real(_) => "NULL".to_string(),
            Scalar::Text(s) => format!("'{s}'"),
            Scalar::Date(d) => dialect.date_literal(d),
            Scalar::DateTime(dt) => dialect.datetime_literal(dt),
        }
    }
}

macro_rules! scalar_from_int {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Scalar {
                fn from(v: $ty) -> Self {
                    Scalar::Integer(i64::from(v))
                }
            }
        )+
    };
}

scalar_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Scalar {
    fn from(v: f32) -> Self {
        Scalar::Real(f64::from(v))
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Real(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

impl From<NaiveDate> for Scalar {
    fn from(v: NaiveDate) -> Self {
        Scalar::Date(v)
    }
}

impl From<NaiveDateTime> for Scalar {
    fn from(v: NaiveDateTime) -> Self {
        Scalar::DateTime(v)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map_or(Scalar::Null, Into::into)
    }
}

/// A literal value: one scalar, or a non-empty tuple of scalars.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    scalars: Vec<Scalar>,
}

impl Value {
    /// Wrap a single scalar.
    pub fn new(value: impl Into<Scalar>) -> Self {
        Self {
            scalars: vec![value.into()],
        }
    }

    /// SQL `NULL`.
    pub fn null() -> Self {
        Self::new(Scalar::Null)
    }

    /// Wrap a single scalar, replacing every `'` in text with [`QUOTE_PLACEHOLDER`].
    pub fn sanitized(value: impl Into<Scalar>) -> Self {
        Self::new(value).sanitize()
    }

    /// Wrap an ordered tuple of scalars (rendered as `(a, b, ...)`).
    ///
    /// Fails with [`SqlError::InvalidValue`] when `values` is empty.
    pub fn tuple<I, T>(values: I) -> SqlResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        let scalars: Vec<Scalar> = values.into_iter().map(Into::into).collect();
        if scalars.is_empty() {
            return Err(SqlError::invalid_value(
                "a value needs at least one scalar",
            ));
        }
        Ok(Self { scalars })
    }

    /// Apply quote sanitizing to every text scalar.
    pub fn sanitize(mut self) -> Self {
        self.scalars = self.scalars.into_iter().map(Scalar::sanitize).collect();
        self
    }

    /// Whether this value holds exactly one scalar.
    pub fn is_scalar(&self) -> bool {
        self.scalars.len() == 1
    }

    pub fn scalars(&self) -> &[Scalar] {
        &self.scalars
    }

    /// Render the scalars as a bare comma list, without parentheses.
    pub(crate) fn render_list(&self, dialect: &dyn Dialect) -> String {
        self.scalars
            .iter()
            .map(|s| s.render_with(dialect))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl SqlRender for Value {
    fn render_with(&self, dialect: &dyn Dialect) -> String {
        if self.is_scalar() {
            self.render_list(dialect)
        } else {
            format!("({})", self.render_list(dialect))
        }
    }
}

macro_rules! value_from {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::new(v)
                }
            }
        )+
    };
}

value_from!(
    i8, i16, i32, i64, u8, u16, u32, f32, f64, bool, &str, String, NaiveDate, NaiveDateTime, Scalar
);

impl<T: Into<Scalar>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        Value::new(v)
    }
}

display_via_render!(Scalar, Value);
