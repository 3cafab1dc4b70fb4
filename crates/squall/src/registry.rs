//! Adapter lookup by backend name.
//!
//! The registry maps a configuration key (`sqlite3`, `postgres`, ...) to an
//! adapter constructor and keeps at most one live adapter per backend, so
//! aliases such as `sqlite` and `sqlite3` share a connection. It is owned by
//! the caller; there is no process-wide instance.
//!
//! ```
//! # #[cfg(feature = "sqlite")]
//! # fn main() -> squall::SqlResult<()> {
//! use squall::{AdapterRegistry, ConnectionConfig};
//!
//! let mut registry = AdapterRegistry::with_defaults();
//! let config = ConnectionConfig::new("sqlite3").database(":memory:");
//! let adapter = registry.connect(&config)?;
//! assert!(adapter.is_connected());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "sqlite"))]
//! # fn main() {}
//! ```

use crate::adapter::Adapter;
use crate::config::ConnectionConfig;
use crate::error::{SqlError, SqlResult};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

/// Builds a fresh, unconnected adapter.
pub type AdapterConstructor = fn() -> Box<dyn Adapter>;

#[derive(Clone, Copy)]
struct Registration {
    constructor: AdapterConstructor,
    /// `Adapter::name()` of what the constructor builds; keys the live map.
    backend: &'static str,
}

#[derive(Default)]
pub struct AdapterRegistry {
    registrations: BTreeMap<String, Registration>,
    live: BTreeMap<&'static str, Box<dyn Adapter>>,
}

impl AdapterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every adapter compiled into this build.
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();
        #[cfg(feature = "sqlite")]
        {
            fn sqlite() -> Box<dyn Adapter> {
                Box::new(crate::adapter::SqliteAdapter::new())
            }
            registry.register("sqlite3", sqlite);
            registry.register("sqlite", sqlite);
        }
        #[cfg(feature = "postgres")]
        {
            fn postgres() -> Box<dyn Adapter> {
                Box::new(crate::adapter::PostgresAdapter::new())
            }
            registry.register("postgres", postgres);
            registry.register("postgresql", postgres);
        }
        #[cfg(feature = "sqlserver")]
        {
            fn sqlserver() -> Box<dyn Adapter> {
                Box::new(crate::adapter::SqlServerAdapter::new())
            }
            registry.register("sqlserver", sqlserver);
            registry.register("mssql", sqlserver);
        }
        registry
    }

    /// Register (or replace) the constructor for `name`.
    ///
    /// Names whose constructors build the same backend are aliases: they
    /// share one live adapter.
    pub fn register(&mut self, name: impl Into<String>, constructor: AdapterConstructor) {
        let backend = constructor().name();
        self.registrations.insert(
            name.into().to_ascii_lowercase(),
            Registration {
                constructor,
                backend,
            },
        );
    }

    /// Connect the adapter named by `config.adapter`.
    ///
    /// A backend that is already connected is reused as-is, whichever alias
    /// it was connected under; `config` is ignored in that case.
    pub fn connect(&mut self, config: &ConnectionConfig) -> SqlResult<&mut dyn Adapter> {
        let key = config
            .adapter_key()
            .ok_or_else(|| SqlError::MissingAdapter("no adapter configured".to_string()))?;
        let registration = *self
            .registrations
            .get(&key)
            .ok_or_else(|| SqlError::MissingAdapter(key.clone()))?;

        let adapter = match self.live.entry(registration.backend) {
            Entry::Occupied(entry) if entry.get().is_connected() => entry.into_mut(),
            Entry::Occupied(mut entry) => {
                entry.get_mut().connect(config)?;
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                let mut adapter = (registration.constructor)();
                adapter.connect(config)?;
                tracing::debug!(
                    target: "squall.sql",
                    backend = adapter.name(),
                    alias = %key,
                    "adapter registered"
                );
                entry.insert(adapter)
            }
        };
        let adapter: &mut dyn Adapter = &mut **adapter;
        Ok(adapter)
    }

    /// The backend a registered name resolves to, if any.
    pub fn backend_of(&self, name: &str) -> Option<&'static str> {
        self.registrations
            .get(&name.to_ascii_lowercase())
            .map(|r| r.backend)
    }

    /// The live adapter for `name` (or any of its aliases), if connected.
    pub fn get(&mut self, name: &str) -> Option<&mut dyn Adapter> {
        let backend = self.backend_of(name)?;
        match self.live.get_mut(backend) {
            Some(adapter) => {
                let adapter: &mut dyn Adapter = &mut **adapter;
                Some(adapter)
            }
            None => None,
        }
    }

    /// Disconnect and forget the live adapter for `name`.
    ///
    /// Work still pending on the connection is committed first, see
    /// [`Adapter::disconnect`].
    pub fn disconnect(&mut self, name: &str) -> SqlResult<()> {
        let key = name.to_ascii_lowercase();
        let adapter = self
            .backend_of(&key)
            .and_then(|backend| self.live.remove(backend));
        match adapter {
            Some(mut adapter) => adapter.disconnect(),
            None => Err(SqlError::MissingAdapter(key)),
        }
    }

    /// Registered adapter names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.registrations.keys().map(String::as_str)
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("names", &self.registrations.keys().collect::<Vec<_>>())
            .field("live", &self.live.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_and_missing_keys() {
        let mut registry = AdapterRegistry::new();
        match registry.connect(&ConnectionConfig::default()) {
            Err(SqlError::MissingAdapter(_)) => {}
            Err(other) => panic!("unexpected error {other:?}"),
            Ok(_) => panic!("connected without an adapter key"),
        }

        match registry.connect(&ConnectionConfig::new("firebird")) {
            Err(SqlError::MissingAdapter(name)) => assert_eq!(name, "firebird"),
            Err(other) => panic!("unexpected error {other:?}"),
            Ok(_) => panic!("connected an unregistered adapter"),
        }
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn connection_is_reused_per_key() {
        let mut registry = AdapterRegistry::with_defaults();
        let config = ConnectionConfig::new("SQLite3").database(":memory:");

        let adapter = registry.connect(&config).unwrap();
        adapter.execute("CREATE TABLE t(x INTEGER)").unwrap();
        adapter.commit().unwrap();

        // Same key: same connection, so the in-memory table is still there.
        let adapter = registry.connect(&config).unwrap();
        assert!(adapter.execute_and_fetch("SELECT x FROM t").unwrap().is_empty());

        registry.disconnect("sqlite3").unwrap();
        assert!(registry.get("sqlite3").is_none());
        assert!(matches!(
            registry.disconnect("sqlite3"),
            Err(SqlError::MissingAdapter(_))
        ));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn aliases_share_one_connection() {
        let mut registry = AdapterRegistry::with_defaults();
        assert_eq!(registry.backend_of("sqlite"), registry.backend_of("sqlite3"));

        let adapter = registry
            .connect(&ConnectionConfig::new("sqlite3").database(":memory:"))
            .unwrap();
        adapter.execute("CREATE TABLE shared(x INTEGER)").unwrap();
        adapter.commit().unwrap();

        let adapter = registry
            .connect(&ConnectionConfig::new("sqlite").database(":memory:"))
            .unwrap();
        assert!(adapter.execute_and_fetch("SELECT x FROM shared").is_ok());
        assert!(registry.get("sqlite").is_some());

        registry.disconnect("sqlite").unwrap();
        assert!(registry.get("sqlite3").is_none());
    }

    #[test]
    fn names_are_sorted() {
        let registry = AdapterRegistry::with_defaults();
        let names: Vec<&str> = registry.names().collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
