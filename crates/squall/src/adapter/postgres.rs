use super::{Adapter, Datum, Row};
use crate::config::ConnectionConfig;
use crate::dialect::{Dialect, PostgresDialect};
use crate::error::{SqlError, SqlResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio::runtime::{Builder, Runtime};
use tokio_postgres::types::Type;
use tokio_postgres::{Client, NoTls, SimpleQueryMessage};

const NAME: &str = "postgres";

#[derive(Debug)]
struct Session {
    runtime: Runtime,
    client: Client,
}

/// Adapter for PostgreSQL.
///
/// The async driver runs on a private current-thread runtime; every call
/// blocks until the driver returns. The connection task is driven by those
/// same calls.
#[derive(Debug, Default)]
pub struct PostgresAdapter {
    session: Option<Session>,
    in_transaction: bool,
}

impl PostgresAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn session(&self) -> SqlResult<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| SqlError::NotConnected(NAME.to_string()))
    }

    fn begin(&mut self) -> SqlResult<()> {
        if !self.in_transaction {
            let session = self.session()?;
            session
                .runtime
                .block_on(session.client.batch_execute("BEGIN"))?;
            self.in_transaction = true;
        }
        Ok(())
    }

    fn finish(&mut self, command: &str) -> SqlResult<()> {
        if self.in_transaction {
            let session = self.session()?;
            let result = session.runtime.block_on(session.client.batch_execute(command));
            self.in_transaction = false;
            result?;
        }
        Ok(())
    }
}

/// Column types decoded from the binary protocol.
fn is_binary_decoded(ty: &Type) -> bool {
    [
        Type::BOOL,
        Type::INT2,
        Type::INT4,
        Type::INT8,
        Type::OID,
        Type::FLOAT4,
        Type::FLOAT8,
        Type::TEXT,
        Type::VARCHAR,
        Type::BPCHAR,
        Type::NAME,
        Type::BYTEA,
        Type::DATE,
        Type::TIMESTAMP,
        Type::TIMESTAMPTZ,
    ]
    .contains(ty)
}

fn decode_row(row: &tokio_postgres::Row) -> SqlResult<Row> {
    let mut columns = Vec::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        let ty = column.type_();
        let datum = if *ty == Type::BOOL {
            row.try_get::<_, Option<bool>>(idx)?.map(Datum::Bool)
        } else if *ty == Type::INT2 {
            row.try_get::<_, Option<i16>>(idx)?
                .map(|v| Datum::Integer(i64::from(v)))
        } else if *ty == Type::INT4 {
            row.try_get::<_, Option<i32>>(idx)?
                .map(|v| Datum::Integer(i64::from(v)))
        } else if *ty == Type::INT8 {
            row.try_get::<_, Option<i64>>(idx)?.map(Datum::Integer)
        } else if *ty == Type::OID {
            row.try_get::<_, Option<u32>>(idx)?
                .map(|v| Datum::Integer(i64::from(v)))
        } else if *ty == Type::FLOAT4 {
            row.try_get::<_, Option<f32>>(idx)?
                .map(|v| Datum::Real(f64::from(v)))
        } else if *ty == Type::FLOAT8 {
            row.try_get::<_, Option<f64>>(idx)?.map(Datum::Real)
        } else if [Type::TEXT, Type::VARCHAR, Type::BPCHAR, Type::NAME].contains(ty) {
            row.try_get::<_, Option<String>>(idx)?.map(Datum::Text)
        } else if *ty == Type::BYTEA {
            row.try_get::<_, Option<Vec<u8>>>(idx)?.map(Datum::Blob)
        } else if *ty == Type::DATE {
            row.try_get::<_, Option<NaiveDate>>(idx)?
                .map(|v| Datum::Text(v.format("%Y-%m-%d").to_string()))
        } else if *ty == Type::TIMESTAMP {
            row.try_get::<_, Option<NaiveDateTime>>(idx)?
                .map(|v| Datum::Text(v.format("%Y-%m-%d %H:%M:%S%.f").to_string()))
        } else if *ty == Type::TIMESTAMPTZ {
            row.try_get::<_, Option<DateTime<Utc>>>(idx)?
                .map(|v| Datum::Text(v.to_rfc3339()))
        } else {
            return Err(SqlError::decode(
                column.name(),
                format!("unsupported column type {ty}"),
            ));
        };
        columns.push(datum.unwrap_or(Datum::Null));
    }
    Ok(Row(columns))
}

/// Map one text-protocol value using the column's declared type.
///
/// Numbers and booleans keep their kind; everything else (`numeric`, `uuid`,
/// `json`, arrays, ...) stays as the server's text form.
fn datum_from_text(ty: &Type, value: Option<&str>) -> Datum {
    let Some(text) = value else {
        return Datum::Null;
    };
    let parsed = if *ty == Type::BOOL {
        match text {
            "t" => Some(Datum::Bool(true)),
            "f" => Some(Datum::Bool(false)),
            _ => None,
        }
    } else if [Type::INT2, Type::INT4, Type::INT8, Type::OID].contains(ty) {
        text.parse().ok().map(Datum::Integer)
    } else if [Type::FLOAT4, Type::FLOAT8].contains(ty) {
        text.parse().ok().map(Datum::Real)
    } else {
        None
    };
    parsed.unwrap_or_else(|| Datum::Text(text.to_string()))
}

fn decode_text_rows(types: &[Type], messages: Vec<SimpleQueryMessage>) -> Vec<Row> {
    messages
        .into_iter()
        .filter_map(|message| match message {
            SimpleQueryMessage::Row(row) => Some(Row(
                (0..row.len())
                    .map(|idx| {
                        let ty = types.get(idx).unwrap_or(&Type::TEXT);
                        datum_from_text(ty, row.get(idx))
                    })
                    .collect(),
            )),
            _ => None,
        })
        .collect()
}

impl Adapter for PostgresAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn dialect(&self) -> &'static dyn Dialect {
        &PostgresDialect
    }

    fn connect(&mut self, config: &ConnectionConfig) -> SqlResult<()> {
        let pg_config = config.postgres_config()?;
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SqlError::Connection(format!("failed to start runtime: {e}")))?;
        let (client, connection) = runtime.block_on(pg_config.connect(NoTls))?;
        runtime.spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(target: "squall.sql", backend = NAME, error = %e, "connection closed");
            }
        });
        self.session = Some(Session { runtime, client });
        self.in_transaction = false;
        tracing::info!(
            target: "squall.sql",
            backend = NAME,
            database = config.database_name().unwrap_or_default(),
            "connected"
        );
        Ok(())
    }

    fn disconnect(&mut self) -> SqlResult<()> {
        if self.session.is_some() {
            self.finish("COMMIT")?;
        }
        if self.session.take().is_some() {
            tracing::info!(target: "squall.sql", backend = NAME, "disconnected");
        }
        self.in_transaction = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| !session.client.is_closed())
    }

    fn execute(&mut self, sql: &str) -> SqlResult<u64> {
        self.begin()?;
        let session = self.session()?;
        tracing::debug!(target: "squall.sql", backend = NAME, sql, "execute");
        Ok(session.runtime.block_on(session.client.execute(sql, &[]))?)
    }

    fn execute_and_fetch(&mut self, sql: &str) -> SqlResult<Vec<Row>> {
        self.begin()?;
        let session = self.session()?;
        tracing::debug!(target: "squall.sql", backend = NAME, sql, "fetch");
        let statement = session.runtime.block_on(session.client.prepare(sql))?;
        let types: Vec<Type> = statement
            .columns()
            .iter()
            .map(|c| c.type_().clone())
            .collect();
        if types.iter().all(is_binary_decoded) {
            let rows = session.runtime.block_on(session.client.query(&statement, &[]))?;
            return rows.iter().map(decode_row).collect();
        }
        // Some column has no binary decoder: read the text protocol instead.
        let messages = session.runtime.block_on(session.client.simple_query(sql))?;
        Ok(decode_text_rows(&types, messages))
    }

    fn commit(&mut self) -> SqlResult<()> {
        self.session()?;
        self.finish("COMMIT")
    }

    fn rollback(&mut self) -> SqlResult<()> {
        self.session()?;
        self.finish("ROLLBACK")?;
        tracing::warn!(target: "squall.sql", backend = NAME, "transaction rolled back");
        Err(SqlError::rollback(format!("{NAME} transaction rolled back")))
    }
}
