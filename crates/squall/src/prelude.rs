//! Convenient imports for typical `squall` usage.
//!
//! ```
//! use squall::prelude::*;
//! ```

pub use crate::{
    Adapter, Clause, Column, Condition, Constraint, Create, Delete, DropTable, Exists, Fields,
    Group, Having, InList, Insert, Order, Select, Sort, SqlError, SqlRender, SqlResult, Statement,
    Transaction, Update, Value, Verbatim, Where,
};

pub use crate::{AdapterRegistry, ConnectionConfig, Force, RunOptions};

#[cfg(feature = "sqlite")]
pub use crate::SqliteAdapter;

#[cfg(feature = "postgres")]
pub use crate::PostgresAdapter;
