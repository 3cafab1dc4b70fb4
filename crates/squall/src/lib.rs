//! # squall
//!
//! Database-agnostic SQL statements with a transaction runner.
//!
//! ## Features
//!
//! - **Objects, not strings**: `Select`, `Insert`, `Update`, `Delete`, `Create`
//!   and `Drop` render themselves to SQL text through [`SqlRender`]
//! - **Validated at construction**: malformed operators, field/value count
//!   mismatches and misplaced clauses fail before anything reaches a database
//! - **Backend dialects**: date literals and `EXISTS` guards follow the target
//!   backend (SQLite, PostgreSQL, SQL Server)
//! - **Transactions**: a FIFO queue of statements run as one unit against an
//!   [`Adapter`], committed once or rolled back on the first failure
//! - **Hooks**: observe every statement as it runs ([`TracingHook`] logs them)
//!
//! ## Example
//!
//! ```
//! use squall::{Fields, Order, Select, Sort, SqlRender, Value, Where};
//!
//! let select = Select::new("users", Fields::new(["id", "name"])?)
//!     .condition(Where::new("age", ">=", Value::new(18))?)?
//!     .condition(Order::by(["name"])?.sort(Sort::Desc))?;
//!
//! assert_eq!(
//!     select.render(),
//!     "SELECT id, name FROM users WHERE age >= 18 ORDER BY name DESC"
//! );
//! # Ok::<(), squall::SqlError>(())
//! ```
//!
//! Running statements:
//!
//! ```
//! # #[cfg(feature = "sqlite")]
//! # fn main() -> squall::SqlResult<()> {
//! use squall::{AdapterRegistry, ConnectionConfig, Transaction};
//!
//! let mut registry = AdapterRegistry::with_defaults();
//! let adapter = registry.connect(&ConnectionConfig::new("sqlite3").database(":memory:"))?;
//!
//! let mut tx = Transaction::new(adapter);
//! tx.add("SELECT 1")?;
//! let results = tx.run()?;
//! assert_eq!(results["SELECT 1"][0][0].as_i64(), Some(1));
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "sqlite"))]
//! # fn main() {}
//! ```

pub mod adapter;
pub mod condition;
pub mod config;
pub mod dialect;
pub mod error;
pub mod fields;
pub mod hook;
pub mod prelude;
pub mod registry;
pub mod render;
pub mod statement;
pub mod table;
pub mod transaction;
pub mod value;

pub use adapter::{Adapter, Datum, Row};
pub use condition::{
    Clause, Condition, ConditionValue, Conjunction, Exists, Group, Having, InList,
    IntoConditionValue, Order, Sort, Where,
};
pub use config::ConnectionConfig;
pub use dialect::{
    AnsiDialect, Dialect, ExistsForm, PostgresDialect, SqlServerDialect, SqliteDialect,
    dialect_for,
};
pub use error::{SqlError, SqlResult};
pub use fields::Fields;
pub use hook::{CompositeHook, ExecHook, ExecResult, HookContext, TracingHook};
pub use registry::{AdapterConstructor, AdapterRegistry};
pub use render::SqlRender;
pub use statement::{Command, Create, Delete, DropTable, Insert, Select, Statement, Update, Verbatim};
pub use table::{Column, Constraint, Table};
pub use transaction::{Force, Outcome, QueryResults, RunOptions, Transaction};
pub use value::{QUOTE_PLACEHOLDER, Scalar, Value};

#[cfg(feature = "postgres")]
pub use adapter::PostgresAdapter;
#[cfg(feature = "sqlite")]
pub use adapter::SqliteAdapter;
#[cfg(feature = "sqlserver")]
pub use adapter::SqlServerAdapter;
