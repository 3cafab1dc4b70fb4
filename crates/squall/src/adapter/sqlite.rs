use super::{Adapter, Datum, Row};
use crate::config::ConnectionConfig;
use crate::dialect::{Dialect, SqliteDialect};
use crate::error::{SqlError, SqlResult};
use rusqlite::Connection;
use rusqlite::types::ValueRef;

const NAME: &str = "sqlite3";
const IN_MEMORY: &str = ":memory:";

/// Adapter for the embedded engine.
///
/// A transaction is opened implicitly by the first statement after a commit
/// or rollback, so everything a [`Transaction`](crate::Transaction) runs can
/// still be undone until [`commit`](Adapter::commit).
#[derive(Debug, Default)]
pub struct SqliteAdapter {
    conn: Option<Connection>,
}

impl SqliteAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect to a database file (or `:memory:`) without a full config.
    pub fn open(database: &str) -> SqlResult<Self> {
        let mut adapter = Self::new();
        adapter.connect(&ConnectionConfig::new(NAME).database(database))?;
        Ok(adapter)
    }

    pub fn in_memory() -> SqlResult<Self> {
        Self::open(IN_MEMORY)
    }

    fn conn(&mut self) -> SqlResult<&mut Connection> {
        self.conn
            .as_mut()
            .ok_or_else(|| SqlError::NotConnected(NAME.to_string()))
    }

    fn begin(&mut self) -> SqlResult<&mut Connection> {
        let conn = self.conn()?;
        if conn.is_autocommit() {
            conn.execute_batch("BEGIN")?;
        }
        Ok(conn)
    }
}

fn datum_from_ref(index: usize, value: ValueRef<'_>) -> SqlResult<Datum> {
    Ok(match value {
        ValueRef::Null => Datum::Null,
        ValueRef::Integer(v) => Datum::Integer(v),
        ValueRef::Real(v) => Datum::Real(v),
        ValueRef::Text(bytes) => Datum::Text(
            std::str::from_utf8(bytes)
                .map_err(|e| SqlError::decode(index.to_string(), e.to_string()))?
                .to_string(),
        ),
        ValueRef::Blob(bytes) => Datum::Blob(bytes.to_vec()),
    })
}

impl Adapter for SqliteAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn dialect(&self) -> &'static dyn Dialect {
        &SqliteDialect
    }

    fn connect(&mut self, config: &ConnectionConfig) -> SqlResult<()> {
        let database = config
            .database_name()
            .ok_or_else(|| SqlError::MissingDatabaseName(NAME.to_string()))?;
        let conn = if database == IN_MEMORY {
            Connection::open_in_memory()?
        } else {
            Connection::open(database)?
        };
        self.conn = Some(conn);
        tracing::info!(target: "squall.sql", backend = NAME, database, "connected");
        Ok(())
    }

    fn disconnect(&mut self) -> SqlResult<()> {
        if let Some(conn) = self.conn.take() {
            if !conn.is_autocommit() {
                conn.execute_batch("COMMIT")?;
            }
            conn.close().map_err(|(_, e)| e)?;
            tracing::info!(target: "squall.sql", backend = NAME, "disconnected");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn execute(&mut self, sql: &str) -> SqlResult<u64> {
        let conn = self.begin()?;
        tracing::debug!(target: "squall.sql", backend = NAME, sql, "execute");
        let affected = conn.execute(sql, [])?;
        Ok(affected as u64)
    }

    fn execute_and_fetch(&mut self, sql: &str) -> SqlResult<Vec<Row>> {
        let conn = self.begin()?;
        tracing::debug!(target: "squall.sql", backend = NAME, sql, "fetch");
        let mut stmt = conn.prepare(sql)?;
        let width = stmt.column_count();
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut columns = Vec::with_capacity(width);
            for index in 0..width {
                columns.push(datum_from_ref(index, row.get_ref(index)?)?);
            }
            out.push(Row(columns));
        }
        Ok(out)
    }

    fn commit(&mut self) -> SqlResult<()> {
        let conn = self.conn()?;
        if !conn.is_autocommit() {
            conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    fn rollback(&mut self) -> SqlResult<()> {
        let conn = self.conn()?;
        if !conn.is_autocommit() {
            conn.execute_batch("ROLLBACK")?;
        }
        tracing::warn!(target: "squall.sql", backend = NAME, "transaction rolled back");
        Err(SqlError::rollback(format!("{NAME} transaction rolled back")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_database_name() {
        let mut adapter = SqliteAdapter::new();
        let err = adapter.connect(&ConnectionConfig::new("sqlite3")).unwrap_err();
        assert!(matches!(err, SqlError::MissingDatabaseName(_)));
    }

    #[test]
    fn execute_before_connect() {
        let mut adapter = SqliteAdapter::new();
        assert!(matches!(
            adapter.execute("SELECT 1"),
            Err(SqlError::NotConnected(_))
        ));
    }

    #[test]
    fn rollback_undoes_and_signals() {
        let mut adapter = SqliteAdapter::in_memory().unwrap();
        adapter.execute("CREATE TABLE t(x INTEGER)").unwrap();
        adapter.commit().unwrap();
        adapter.execute("INSERT INTO t VALUES (1)").unwrap();

        let err = adapter.rollback().unwrap_err();
        assert!(err.is_rollback());

        let rows = adapter.execute_and_fetch("SELECT x FROM t").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn fetch_maps_column_types() {
        let mut adapter = SqliteAdapter::in_memory().unwrap();
        let rows = adapter
            .execute_and_fetch("SELECT 1, 2.5, 'a', NULL, x'00ff'")
            .unwrap();
        assert_eq!(
            rows,
            vec![Row(vec![
                Datum::Integer(1),
                Datum::Real(2.5),
                Datum::Text("a".into()),
                Datum::Null,
                Datum::Blob(vec![0, 255]),
            ])]
        );
    }

    #[test]
    fn disconnect_commits_pending_work() {
        let path = std::env::temp_dir().join(format!(
            "squall_disconnect_{}_{:?}.db",
            std::process::id(),
            std::thread::current().id()
        ));
        let path = path.to_string_lossy().into_owned();
        let _ = std::fs::remove_file(&path);

        let mut adapter = SqliteAdapter::open(&path).unwrap();
        adapter.execute("CREATE TABLE kept(x INTEGER)").unwrap();
        adapter.execute("INSERT INTO kept VALUES (1)").unwrap();
        adapter.disconnect().unwrap();

        let mut adapter = SqliteAdapter::open(&path).unwrap();
        let rows = adapter.execute_and_fetch("SELECT x FROM kept").unwrap();
        assert_eq!(rows, vec![Row(vec![Datum::Integer(1)])]);
        adapter.disconnect().unwrap();
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let mut adapter = SqliteAdapter::in_memory().unwrap();
        adapter.disconnect().unwrap();
        adapter.disconnect().unwrap();
        assert!(!adapter.is_connected());
    }
}
