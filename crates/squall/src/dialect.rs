//! Backend-specific rendering rules.
//!
//! Statement objects are backend-agnostic; a [`Dialect`] decides how the
//! backend-sensitive pieces come out: date/time literals, booleans, and how an
//! [`Exists`](crate::Exists) guard is embedded into a statement.
//!
//! Each adapter picks its dialect once at construction, and every statement
//! queued on a [`Transaction`](crate::Transaction) is rendered with it.

use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

/// How a statement embeds an existence guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistsForm {
    /// The guard is part of the statement's own grammar:
    /// `DROP TABLE IF EXISTS t`, `SELECT EXISTS(...)`.
    Inline,
    /// The guard wraps the whole statement:
    /// `IF EXISTS(<lookup>) DROP TABLE t`.
    Wrap,
}

/// Rendering rules for one backend.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Backend name, also used as the registry key of its adapter.
    fn name(&self) -> &'static str;

    /// strftime pattern for date literals.
    fn date_format(&self) -> &'static str {
        "%Y-%m-%d"
    }

    /// strftime pattern for date/time literals.
    fn datetime_format(&self) -> &'static str {
        "%Y-%m-%d %H:%M:%S"
    }

    fn date_literal(&self, date: &NaiveDate) -> String {
        format!("'{}'", date.format(self.date_format()))
    }

    fn datetime_literal(&self, datetime: &NaiveDateTime) -> String {
        format!("'{}'", datetime.format(self.datetime_format()))
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "TRUE" } else { "FALSE" }
    }

    fn exists_form(&self) -> ExistsForm {
        ExistsForm::Inline
    }

    /// Lookup query used by [`ExistsForm::Wrap`] when a guard names no subquery.
    fn table_lookup(&self, table: &str) -> String {
        format!("SELECT * FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_NAME = '{table}'")
    }
}

/// Backend-neutral rendering, used by `Display` and [`SqlRender::render`](crate::SqlRender::render).
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiDialect;

impl Dialect for AnsiDialect {
    fn name(&self) -> &'static str {
        "ansi"
    }
}

/// The embedded file-based engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite3"
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn datetime_format(&self) -> &'static str {
        "%Y-%m-%d %H:%M:%S%.f"
    }

    fn date_literal(&self, date: &NaiveDate) -> String {
        format!("DATE '{}'", date.format(self.date_format()))
    }

    fn datetime_literal(&self, datetime: &NaiveDateTime) -> String {
        format!("TIMESTAMP '{}'", datetime.format(self.datetime_format()))
    }
}

/// SQL Server (T-SQL) reached over ODBC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDialect;

impl Dialect for SqlServerDialect {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    // Unseparated and ISO 8601 forms are the only ones T-SQL reads the same
    // way under every DATEFORMAT/language setting.
    fn date_format(&self) -> &'static str {
        "%Y%m%d"
    }

    fn datetime_format(&self) -> &'static str {
        "%Y-%m-%dT%H:%M:%S"
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    fn exists_form(&self) -> ExistsForm {
        ExistsForm::Wrap
    }
}

/// Look up a built-in dialect by backend name.
pub fn dialect_for(name: &str) -> Option<&'static dyn Dialect> {
    match name.trim().to_ascii_lowercase().as_str() {
        "ansi" => Some(&AnsiDialect),
        "sqlite" | "sqlite3" => Some(&SqliteDialect),
        "postgres" | "postgresql" => Some(&PostgresDialect),
        "sqlserver" | "mssql" => Some(&SqlServerDialect),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2004, 1, 1)
            .and_then(|d| d.and_hms_opt(2, 34, 56))
            .expect("valid datetime")
    }

    #[test]
    fn datetime_literals_per_backend() {
        let dt = sample();
        assert_eq!(SqliteDialect.datetime_literal(&dt), "'2004-01-01 02:34:56'");
        assert_eq!(SqlServerDialect.datetime_literal(&dt), "'2004-01-01T02:34:56'");
        assert_eq!(
            PostgresDialect.datetime_literal(&dt),
            "TIMESTAMP '2004-01-01 02:34:56'"
        );
    }

    #[test]
    fn date_literals_per_backend() {
        let d = sample().date();
        assert_eq!(AnsiDialect.date_literal(&d), "'2004-01-01'");
        assert_eq!(SqlServerDialect.date_literal(&d), "'20040101'");
        assert_eq!(PostgresDialect.date_literal(&d), "DATE '2004-01-01'");
    }

    #[test]
    fn exists_form_is_chosen_per_backend() {
        assert_eq!(SqliteDialect.exists_form(), ExistsForm::Inline);
        assert_eq!(PostgresDialect.exists_form(), ExistsForm::Inline);
        assert_eq!(SqlServerDialect.exists_form(), ExistsForm::Wrap);
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(dialect_for("SQLite3").map(|d| d.name()), Some("sqlite3"));
        assert_eq!(dialect_for("mssql").map(|d| d.name()), Some("sqlserver"));
        assert!(dialect_for("firebird").is_none());
    }
}
