use super::{Adapter, Datum, Row};
use crate::config::ConnectionConfig;
use crate::dialect::{Dialect, SqlServerDialect};
use crate::error::{SqlError, SqlResult};
use odbc_api::{Connection, ConnectionOptions, Cursor, Environment};
use std::sync::OnceLock;

const NAME: &str = "sqlserver";

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

fn environment() -> SqlResult<&'static Environment> {
    if let Some(env) = ENVIRONMENT.get() {
        return Ok(env);
    }
    let env = Environment::new()?;
    // `set` fails only when another thread initialized it first.
    let _ = ENVIRONMENT.set(env);
    ENVIRONMENT
        .get()
        .ok_or_else(|| SqlError::Connection("ODBC environment unavailable".to_string()))
}

/// Adapter for SQL Server over the system ODBC driver manager.
///
/// Autocommit is switched off on connect, so every statement joins the open
/// transaction until commit or rollback.
#[derive(Default)]
pub struct SqlServerAdapter {
    conn: Option<Connection<'static>>,
}

impl std::fmt::Debug for SqlServerAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlServerAdapter")
            .field("connected", &self.conn.is_some())
            .finish()
    }
}

impl SqlServerAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn conn(&self) -> SqlResult<&Connection<'static>> {
        self.conn
            .as_ref()
            .ok_or_else(|| SqlError::NotConnected(NAME.to_string()))
    }
}

impl Adapter for SqlServerAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn dialect(&self) -> &'static dyn Dialect {
        &SqlServerDialect
    }

    fn connect(&mut self, config: &ConnectionConfig) -> SqlResult<()> {
        let connection_string = config.odbc_connection_string()?;
        let conn = environment()?
            .connect_with_connection_string(&connection_string, ConnectionOptions::default())?;
        conn.set_autocommit(false)?;
        self.conn = Some(conn);
        tracing::info!(
            target: "squall.sql",
            backend = NAME,
            database = config.database_name().unwrap_or_default(),
            "connected"
        );
        Ok(())
    }

    fn disconnect(&mut self) -> SqlResult<()> {
        if let Some(conn) = &self.conn {
            conn.commit()?;
        }
        if self.conn.take().is_some() {
            tracing::info!(target: "squall.sql", backend = NAME, "disconnected");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn execute(&mut self, sql: &str) -> SqlResult<u64> {
        let conn = self.conn()?;
        tracing::debug!(target: "squall.sql", backend = NAME, sql, "execute");
        let mut stmt = conn.preallocate()?;
        stmt.execute(sql, ())?;
        let affected = stmt.row_count()?.unwrap_or(0);
        Ok(affected as u64)
    }

    fn execute_and_fetch(&mut self, sql: &str) -> SqlResult<Vec<Row>> {
        let conn = self.conn()?;
        tracing::debug!(target: "squall.sql", backend = NAME, sql, "fetch");
        let Some(mut cursor) = conn.execute(sql, (), None)? else {
            return Ok(Vec::new());
        };
        let width = u16::try_from(cursor.num_result_cols()?).unwrap_or(0);
        let mut out = Vec::new();
        let mut buf = Vec::new();
        while let Some(mut row) = cursor.next_row()? {
            let mut columns = Vec::with_capacity(usize::from(width));
            for col in 1..=width {
                buf.clear();
                let datum = if row.get_text(col, &mut buf)? {
                    let text = String::from_utf8(buf.clone())
                        .map_err(|e| SqlError::decode(col.to_string(), e.to_string()))?;
                    Datum::Text(text)
                } else {
                    Datum::Null
                };
                columns.push(datum);
            }
            out.push(Row(columns));
        }
        Ok(out)
    }

    fn commit(&mut self) -> SqlResult<()> {
        self.conn()?.commit()?;
        Ok(())
    }

    fn rollback(&mut self) -> SqlResult<()> {
        self.conn()?.rollback()?;
        tracing::warn!(target: "squall.sql", backend = NAME, "transaction rolled back");
        Err(SqlError::rollback(format!("{NAME} transaction rolled back")))
    }
}
