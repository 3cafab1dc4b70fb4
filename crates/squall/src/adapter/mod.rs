//! Backend adapters.
//!
//! An [`Adapter`] owns one live connection and is the only thing that mutates
//! it. Statements are rendered with the adapter's [`Dialect`] and handed over
//! as SQL text.
//!
//! | adapter | feature | driver |
//! |---|---|---|
//! | [`SqliteAdapter`] | `sqlite` (default) | `rusqlite` |
//! | [`PostgresAdapter`] | `postgres` (default) | `tokio-postgres` |
//! | [`SqlServerAdapter`] | `sqlserver` | `odbc-api` |

#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "sqlite")]
mod sqlite;
#[cfg(feature = "sqlserver")]
mod sqlserver;

#[cfg(feature = "postgres")]
pub use postgres::PostgresAdapter;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteAdapter;
#[cfg(feature = "sqlserver")]
pub use sqlserver::SqlServerAdapter;

use crate::config::ConnectionConfig;
use crate::dialect::Dialect;
use crate::error::SqlResult;
use serde::Serialize;
use std::fmt;
use std::ops::Deref;

/// One fetched column value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Datum {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Datum {
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Datum::Integer(v) => Some(*v),
            Datum::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Datum::Real(v) => Some(*v),
            Datum::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Datum::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Null => f.write_str("NULL"),
            Datum::Bool(b) => write!(f, "{b}"),
            Datum::Integer(v) => write!(f, "{v}"),
            Datum::Real(v) => write!(f, "{v}"),
            Datum::Text(s) => f.write_str(s),
            Datum::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<i64> for Datum {
    fn from(v: i64) -> Self {
        Datum::Integer(v)
    }
}

impl From<&str> for Datum {
    fn from(v: &str) -> Self {
        Datum::Text(v.to_string())
    }
}

impl From<String> for Datum {
    fn from(v: String) -> Self {
        Datum::Text(v)
    }
}

/// One fetched row, columns in select order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row(pub Vec<Datum>);

impl Row {
    pub fn new(columns: Vec<Datum>) -> Self {
        Self(columns)
    }

    pub fn into_inner(self) -> Vec<Datum> {
        self.0
    }
}

impl Deref for Row {
    type Target = [Datum];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Datum>> for Row {
    fn from(columns: Vec<Datum>) -> Self {
        Self(columns)
    }
}

/// A backend connection.
///
/// Executing before [`connect`](Adapter::connect) (or after
/// [`disconnect`](Adapter::disconnect)) fails with
/// [`SqlError::NotConnected`](crate::SqlError::NotConnected).
pub trait Adapter {
    /// Registry key of the backend.
    fn name(&self) -> &'static str;

    /// Rendering rules for statements run on this backend.
    fn dialect(&self) -> &'static dyn Dialect;

    fn connect(&mut self, config: &ConnectionConfig) -> SqlResult<()>;

    /// Close the connection, committing any work still pending on it.
    ///
    /// Call [`rollback`](Adapter::rollback) first to discard that work. A
    /// second disconnect is a no-op.
    fn disconnect(&mut self) -> SqlResult<()>;

    fn is_connected(&self) -> bool;

    /// Run a statement that returns no rows. Returns the affected row count.
    fn execute(&mut self, sql: &str) -> SqlResult<u64>;

    /// Run a query and fetch every row.
    fn execute_and_fetch(&mut self, sql: &str) -> SqlResult<Vec<Row>>;

    /// Commit the open transaction, if any.
    fn commit(&mut self) -> SqlResult<()>;

    /// Undo the open transaction.
    ///
    /// A successful rollback still returns
    /// [`SqlError::RollbackSignaled`](crate::SqlError::RollbackSignaled); any
    /// other error means the rollback itself failed.
    fn rollback(&mut self) -> SqlResult<()>;
}

impl<A: Adapter + ?Sized> Adapter for Box<A> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn dialect(&self) -> &'static dyn Dialect {
        (**self).dialect()
    }

    fn connect(&mut self, config: &ConnectionConfig) -> SqlResult<()> {
        (**self).connect(config)
    }

    fn disconnect(&mut self) -> SqlResult<()> {
        (**self).disconnect()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn execute(&mut self, sql: &str) -> SqlResult<u64> {
        (**self).execute(sql)
    }

    fn execute_and_fetch(&mut self, sql: &str) -> SqlResult<Vec<Row>> {
        (**self).execute_and_fetch(sql)
    }

    fn commit(&mut self) -> SqlResult<()> {
        (**self).commit()
    }

    fn rollback(&mut self) -> SqlResult<()> {
        (**self).rollback()
    }
}
