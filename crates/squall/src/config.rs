//! Connection configuration.
//!
//! A [`ConnectionConfig`] carries everything an adapter needs to connect. It
//! can be built in code, read from TOML (with `${VAR}` expansion), or read
//! from prefixed environment variables.
//!
//! ```toml
//! adapter = "sqlserver"
//! driver = "ODBC Driver 18 for SQL Server"
//! server = "db.internal"
//! db_name = "inventory"
//! uid = "app"
//! pwd = "${INVENTORY_DB_PASSWORD}"
//! ```

use crate::error::{SqlError, SqlResult};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_ODBC_DRIVER: &str = "SQL Server";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Registry key of the adapter (`sqlite3`, `postgres`, `sqlserver`, ...).
    pub adapter: Option<String>,
    /// ODBC driver name.
    pub driver: Option<String>,
    #[serde(alias = "db_host", alias = "server")]
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Database name, or file path for the embedded engine.
    #[serde(alias = "db_name")]
    pub database: Option<String>,
    #[serde(alias = "user")]
    pub uid: Option<String>,
    #[serde(alias = "password")]
    pub pwd: Option<String>,
    /// Use integrated authentication.
    pub trusted: bool,
    /// Named data source; overrides driver and host.
    pub dsn: Option<String>,
}

impl ConnectionConfig {
    pub fn new(adapter: impl Into<String>) -> Self {
        Self {
            adapter: Some(adapter.into()),
            ..Self::default()
        }
    }

    pub fn driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = Some(driver.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn pwd(mut self, pwd: impl Into<String>) -> Self {
        self.pwd = Some(pwd.into());
        self
    }

    pub fn trusted(mut self, trusted: bool) -> Self {
        self.trusted = trusted;
        self
    }

    pub fn dsn(mut self, dsn: impl Into<String>) -> Self {
        self.dsn = Some(dsn.into());
        self
    }

    /// Parse a TOML document, expanding `${VAR}` references in string fields.
    pub fn from_toml_str(raw: &str) -> SqlResult<Self> {
        let mut config: ConnectionConfig = toml::from_str(raw)
            .map_err(|e| SqlError::Config(format!("failed to parse config: {e}")))?;
        config.expand_env(&|key: &str| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> SqlResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SqlError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Read `<PREFIX>_ADAPTER`, `<PREFIX>_DATABASE`, `<PREFIX>_HOST`, ...
    pub fn from_env(prefix: &str) -> SqlResult<Self> {
        Self::from_lookup(prefix, &|key: &str| std::env::var(key).ok())
    }

    fn from_lookup(prefix: &str, lookup: &dyn Fn(&str) -> Option<String>) -> SqlResult<Self> {
        let get = |name: &str| lookup(&format!("{prefix}_{name}")).filter(|v| !v.is_empty());
        let port = get("PORT")
            .map(|p| {
                p.parse::<u16>()
                    .map_err(|e| SqlError::Config(format!("invalid {prefix}_PORT '{p}': {e}")))
            })
            .transpose()?;
        let trusted = get("TRUSTED").is_some_and(|v| {
            matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
        });
        Ok(Self {
            adapter: get("ADAPTER"),
            driver: get("DRIVER"),
            host: get("HOST"),
            port,
            database: get("DATABASE"),
            uid: get("UID"),
            pwd: get("PWD"),
            trusted,
            dsn: get("DSN"),
        })
    }

    fn expand_env(&mut self, lookup: &dyn Fn(&str) -> Option<String>) -> SqlResult<()> {
        for field in [
            &mut self.adapter,
            &mut self.driver,
            &mut self.host,
            &mut self.database,
            &mut self.uid,
            &mut self.pwd,
            &mut self.dsn,
        ] {
            if let Some(value) = field {
                *value = expand_env_vars(value, lookup)?;
            }
        }
        Ok(())
    }

    /// The adapter key, trimmed and lower-cased.
    pub fn adapter_key(&self) -> Option<String> {
        self.adapter
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_ascii_lowercase)
    }

    /// The database name, if set and not blank.
    pub fn database_name(&self) -> Option<&str> {
        self.database
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    /// Build the ODBC connection string.
    ///
    /// `DRIVER={..};SERVER=..;DATABASE=..;Trusted_Connection=yes;UID=..;PWD=..`,
    /// or `DSN=..;DATABASE=..;UID=..;PWD=..` when a DSN is set.
    pub fn odbc_connection_string(&self) -> SqlResult<String> {
        let database = self
            .database_name()
            .ok_or_else(|| SqlError::MissingDatabaseName("sqlserver".to_string()))?;
        let mut parts = Vec::new();
        match &self.dsn {
            Some(dsn) => parts.push(format!("DSN={dsn}")),
            None => {
                let driver = self.driver.as_deref().unwrap_or(DEFAULT_ODBC_DRIVER);
                parts.push(format!("DRIVER={{{driver}}}"));
                if let Some(host) = &self.host {
                    match self.port {
                        Some(port) => parts.push(format!("SERVER={host},{port}")),
                        None => parts.push(format!("SERVER={host}")),
                    }
                }
            }
        }
        parts.push(format!("DATABASE={database}"));
        if self.trusted && self.dsn.is_none() {
            parts.push("Trusted_Connection=yes".to_string());
        }
        if let Some(uid) = &self.uid {
            parts.push(format!("UID={uid}"));
        }
        if let Some(pwd) = &self.pwd {
            parts.push(format!("PWD={pwd}"));
        }
        Ok(parts.join(";"))
    }

    /// Map onto a driver config. A `dsn` is parsed as a libpq connection string
    /// or URL and the explicit fields are layered on top.
    #[cfg(feature = "postgres")]
    pub fn postgres_config(&self) -> SqlResult<tokio_postgres::Config> {
        let mut pg = match &self.dsn {
            Some(dsn) => dsn.parse::<tokio_postgres::Config>()?,
            None => tokio_postgres::Config::new(),
        };
        if let Some(host) = &self.host {
            pg.host(host);
        }
        if let Some(port) = self.port {
            pg.port(port);
        }
        if let Some(uid) = &self.uid {
            pg.user(uid);
        }
        if let Some(pwd) = &self.pwd {
            pg.password(pwd);
        }
        match self.database_name() {
            Some(database) => {
                pg.dbname(database);
            }
            None if pg.get_dbname().is_some() => {}
            None => return Err(SqlError::MissingDatabaseName("postgres".to_string())),
        }
        if pg.get_hosts().is_empty() {
            pg.host("localhost");
        }
        Ok(pg)
    }
}

fn expand_env_vars(input: &str, lookup: &dyn Fn(&str) -> Option<String>) -> SqlResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                return Err(SqlError::Config(format!(
                    "unterminated env var reference: ${{{key}}}"
                )));
            }
            if key.is_empty() {
                return Err(SqlError::Config("invalid env var reference: ${}".to_string()));
            }

            let value = lookup(&key)
                .ok_or_else(|| SqlError::Config(format!("missing env var for config: {key}")))?;
            out.push_str(&value);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn toml_aliases() {
        let config = ConnectionConfig::from_toml_str(
            r#"
            adapter = "sqlserver"
            server = "db.internal"
            db_name = "inventory"
            trusted = true
            "#,
        )
        .unwrap();
        assert_eq!(config.host.as_deref(), Some("db.internal"));
        assert_eq!(config.database_name(), Some("inventory"));
        assert!(config.trusted);
    }

    #[test]
    fn toml_parse_error_is_config_error() {
        let err = ConnectionConfig::from_toml_str("adapter = [").unwrap_err();
        assert!(matches!(err, SqlError::Config(_)));
    }

    #[test]
    fn expand_env_vars_substitutes() {
        let lookup = env(&[("DB_PASS", "s3cret")]);
        assert_eq!(
            expand_env_vars("pw=${DB_PASS};", &lookup).unwrap(),
            "pw=s3cret;"
        );
        assert!(expand_env_vars("${NOPE}", &lookup).is_err());
        assert!(expand_env_vars("${DB_PASS", &lookup).is_err());
        assert!(expand_env_vars("${}", &lookup).is_err());
        assert_eq!(expand_env_vars("$5 {x}", &lookup).unwrap(), "$5 {x}");
    }

    #[test]
    fn from_prefixed_env() {
        let lookup = env(&[
            ("APP_ADAPTER", "Postgres"),
            ("APP_DATABASE", "shop"),
            ("APP_PORT", "5433"),
            ("APP_TRUSTED", "yes"),
        ]);
        let config = ConnectionConfig::from_lookup("APP", &lookup).unwrap();
        assert_eq!(config.adapter_key().as_deref(), Some("postgres"));
        assert_eq!(config.port, Some(5433));
        assert!(config.trusted);

        let bad = env(&[("APP_PORT", "many")]);
        assert!(matches!(
            ConnectionConfig::from_lookup("APP", &bad),
            Err(SqlError::Config(_))
        ));
    }

    #[test]
    fn odbc_connection_string_order() {
        let config = ConnectionConfig::new("sqlserver")
            .host("db1")
            .database("sales")
            .trusted(true)
            .uid("me")
            .pwd("pw");
        assert_eq!(
            config.odbc_connection_string().unwrap(),
            "DRIVER={SQL Server};SERVER=db1;DATABASE=sales;Trusted_Connection=yes;UID=me;PWD=pw"
        );
    }

    #[test]
    fn odbc_connection_string_minimal_and_dsn() {
        let config = ConnectionConfig::new("sqlserver")
            .driver("ODBC Driver 18 for SQL Server")
            .database("sales");
        assert_eq!(
            config.odbc_connection_string().unwrap(),
            "DRIVER={ODBC Driver 18 for SQL Server};DATABASE=sales"
        );

        let config = ConnectionConfig::new("sqlserver")
            .dsn("warehouse")
            .host("ignored")
            .database("sales")
            .uid("me");
        assert_eq!(
            config.odbc_connection_string().unwrap(),
            "DSN=warehouse;DATABASE=sales;UID=me"
        );
    }

    #[test]
    fn odbc_connection_string_needs_database() {
        let err = ConnectionConfig::new("sqlserver")
            .database("  ")
            .odbc_connection_string()
            .unwrap_err();
        assert!(matches!(err, SqlError::MissingDatabaseName(_)));
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn postgres_config_layers_fields() {
        let config = ConnectionConfig::new("postgres")
            .dsn("postgres://app@db.internal/ignored")
            .database("shop")
            .port(5433);
        let pg = config.postgres_config().unwrap();
        assert_eq!(pg.get_dbname(), Some("shop"));
        assert_eq!(pg.get_ports(), &[5433]);
        assert_eq!(pg.get_user(), Some("app"));
    }
}
