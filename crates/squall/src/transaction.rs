//! Ordered statement batches run against one adapter.
//!
//! A [`Transaction`] borrows its adapter mutably, so two transactions can
//! never interleave on the same connection.
//!
//! # Example
//!
//! ```
//! # #[cfg(feature = "sqlite")]
//! # fn main() -> squall::SqlResult<()> {
//! use squall::{Fields, Insert, Select, SqlRender, SqliteAdapter, Transaction};
//!
//! let mut adapter = SqliteAdapter::in_memory()?;
//! let select = Select::all("t");
//!
//! let mut tx = Transaction::new(&mut adapter);
//! tx.add("CREATE TABLE t(x INTEGER)")?
//!     .add(Insert::new("t", Fields::empty(), [1])?)?
//!     .add(select.clone())?;
//! let results = tx.run()?;
//!
//! assert_eq!(results[&select.render()].len(), 1);
//! assert!(tx.is_empty());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "sqlite"))]
//! # fn main() {}
//! ```

use crate::adapter::{Adapter, Row};
use crate::error::{SqlError, SqlResult};
use crate::hook::{CompositeHook, ExecHook, ExecResult, HookContext};
use crate::render::SqlRender;
use crate::statement::Statement;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

/// Fetched rows keyed by the SQL of each query, rendered with the adapter's
/// dialect. Use [`Transaction::key_for`] to build a key; `render()` uses the
/// ANSI dialect and can differ (booleans, for one).
pub type QueryResults = BTreeMap<String, Vec<Row>>;

/// Override the normal run protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Force {
    /// Commit even when nothing is queued.
    Commit,
    /// Drop the queue and roll back.
    Rollback,
}

impl FromStr for Force {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "commit" => Ok(Force::Commit),
            "rollback" => Ok(Force::Rollback),
            _ => Err(SqlError::invalid_value(format!("unknown force mode '{s}'"))),
        }
    }
}

/// Options for [`Transaction::run_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub force: Option<Force>,
    /// Flag a successful commit so [`Outcome::into_signal`] reports it.
    pub signal: bool,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn force(mut self, force: Force) -> Self {
        self.force = Some(force);
        self
    }

    pub fn signal(mut self, signal: bool) -> Self {
        self.signal = signal;
        self
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Committed {
        results: QueryResults,
        signaled: bool,
    },
    RolledBack,
}

impl Outcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed { .. })
    }

    pub fn results(&self) -> Option<&QueryResults> {
        match self {
            Outcome::Committed { results, .. } => Some(results),
            Outcome::RolledBack => None,
        }
    }

    /// The fetched rows; empty after a rollback.
    pub fn into_results(self) -> QueryResults {
        match self {
            Outcome::Committed { results, .. } => results,
            Outcome::RolledBack => QueryResults::new(),
        }
    }

    /// Report the outcome as a signal.
    ///
    /// A signaled commit becomes [`SqlError::CommitSucceeded`], a rollback
    /// becomes [`SqlError::RollbackSignaled`], and an unsignaled commit
    /// yields its results.
    pub fn into_signal(self) -> SqlResult<QueryResults> {
        match self {
            Outcome::Committed { signaled: true, .. } => Err(SqlError::CommitSucceeded),
            Outcome::Committed { results, .. } => Ok(results),
            Outcome::RolledBack => Err(SqlError::rollback("transaction rolled back")),
        }
    }
}

/// An ordered queue of statements executed as one unit.
///
/// The queue is empty after every [`run`](Transaction::run),
/// [`run_with`](Transaction::run_with) or [`pretend`](Transaction::pretend),
/// whether it succeeded or not.
pub struct Transaction<'a, A: Adapter + ?Sized> {
    adapter: &'a mut A,
    queue: Vec<Statement>,
    hook: Option<Arc<dyn ExecHook>>,
}

impl<'a, A: Adapter + ?Sized> Transaction<'a, A> {
    pub fn new(adapter: &'a mut A) -> Self {
        Self {
            adapter,
            queue: Vec::new(),
            hook: None,
        }
    }

    /// Seed the queue. Statements are validated when the transaction runs.
    pub fn with_statements<I, S>(adapter: &'a mut A, statements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Statement>,
    {
        Self {
            adapter,
            queue: statements.into_iter().map(Into::into).collect(),
            hook: None,
        }
    }

    /// Queue a statement. Strings are queued as verbatim SQL.
    ///
    /// Blank SQL fails with [`SqlError::InvalidSquallObject`].
    pub fn add(&mut self, statement: impl Into<Statement>) -> SqlResult<&mut Self> {
        let statement = statement.into();
        statement.validate()?;
        self.queue.push(statement);
        Ok(self)
    }

    /// Attach a hook; hooks attached earlier keep running first.
    pub fn with_hook<H: ExecHook + 'static>(mut self, hook: H) -> Self {
        self.hook = Some(match self.hook.take() {
            None => Arc::new(hook),
            Some(existing) => Arc::new(CompositeHook::new().add_arc(existing).add(hook)),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn statements(&self) -> &[Statement] {
        &self.queue
    }

    /// The queued statements rendered with the adapter's dialect.
    pub fn render(&self) -> Vec<String> {
        let dialect = self.adapter.dialect();
        self.queue.iter().map(|s| s.render_with(dialect)).collect()
    }

    /// The [`QueryResults`] key a query gets on this transaction's adapter.
    pub fn key_for(&self, statement: &impl SqlRender) -> String {
        statement.render_with(self.adapter.dialect())
    }

    /// Run the queue and commit.
    ///
    /// Fails with [`SqlError::EmptyTransaction`] when nothing is queued.
    pub fn run(&mut self) -> SqlResult<QueryResults> {
        Ok(self.run_with(RunOptions::default())?.into_results())
    }

    /// Run with explicit options.
    ///
    /// - `force = Rollback`: the queue is dropped and the adapter rolled back.
    /// - `force = Commit`: an empty queue commits instead of failing; a
    ///   non-empty queue runs normally and is committed once.
    ///
    /// A driver error stops the run, the open transaction is rolled back and
    /// the error is returned unchanged. Commit is never called after a failure.
    pub fn run_with(&mut self, options: RunOptions) -> SqlResult<Outcome> {
        let queue = std::mem::take(&mut self.queue);
        let backend = self.adapter.name();

        match options.force {
            Some(Force::Rollback) => {
                expect_rollback(self.adapter.rollback())?;
                tracing::debug!(
                    target: "squall.sql",
                    backend,
                    dropped = queue.len(),
                    "transaction rolled back"
                );
                return Ok(Outcome::RolledBack);
            }
            Some(Force::Commit) if queue.is_empty() => {
                self.adapter.commit()?;
                tracing::debug!(target: "squall.sql", backend, "empty transaction committed");
                return Ok(Outcome::Committed {
                    results: QueryResults::new(),
                    signaled: options.signal,
                });
            }
            None if queue.is_empty() => return Err(SqlError::EmptyTransaction),
            _ => {}
        }

        validate_all(&queue)?;
        let results = match self.execute(&queue) {
            Ok(results) => results,
            Err(err) => {
                self.discard();
                return Err(err);
            }
        };
        self.adapter.commit()?;
        tracing::debug!(
            target: "squall.sql",
            backend,
            statements = queue.len(),
            queries = results.len(),
            "transaction committed"
        );
        Ok(Outcome::Committed {
            results,
            signaled: options.signal,
        })
    }

    /// Run the queue, then always roll back.
    ///
    /// An execution failure is reported as [`SqlError::RollbackSignaled`]
    /// carrying the driver message.
    pub fn pretend(&mut self) -> SqlResult<QueryResults> {
        let queue = std::mem::take(&mut self.queue);
        if queue.is_empty() {
            return Err(SqlError::EmptyTransaction);
        }
        validate_all(&queue)?;

        let executed = self.execute(&queue);
        let rolled_back = expect_rollback(self.adapter.rollback());
        tracing::debug!(
            target: "squall.sql",
            backend = self.adapter.name(),
            statements = queue.len(),
            ok = executed.is_ok(),
            "pretend run rolled back"
        );
        match executed {
            Ok(results) => {
                rolled_back?;
                Ok(results)
            }
            Err(err) => {
                if let Err(rollback_err) = rolled_back {
                    tracing::warn!(
                        target: "squall.sql",
                        backend = self.adapter.name(),
                        error = %rollback_err,
                        "rollback after pretend failure did not complete"
                    );
                }
                Err(SqlError::rollback(err.to_string()))
            }
        }
    }

    fn execute(&mut self, queue: &[Statement]) -> SqlResult<QueryResults> {
        let dialect = self.adapter.dialect();
        let backend = self.adapter.name();
        let hook = self.hook.clone();
        let mut results = QueryResults::new();

        for (position, statement) in queue.iter().enumerate() {
            let sql = statement.render_with(dialect);
            let ctx = HookContext {
                sql: sql.clone(),
                command: statement.command(),
                backend,
                position,
            };
            if let Some(hook) = &hook {
                hook.before_statement(&ctx);
            }
            let started = Instant::now();

            if statement.is_query() {
                let fetched = self.adapter.execute_and_fetch(&sql);
                if let Some(hook) = &hook {
                    let result = match &fetched {
                        Ok(rows) => ExecResult::Rows(rows.len()),
                        Err(e) => ExecResult::error(e.to_string()),
                    };
                    hook.after_statement(&ctx, &result, started.elapsed());
                }
                results.insert(sql, fetched?);
            } else {
                let affected = self.adapter.execute(&sql);
                if let Some(hook) = &hook {
                    let result = match &affected {
                        Ok(n) => ExecResult::Affected(*n),
                        Err(e) => ExecResult::error(e.to_string()),
                    };
                    hook.after_statement(&ctx, &result, started.elapsed());
                }
                affected?;
            }
        }
        Ok(results)
    }

    /// Roll back after a failed statement; the failure itself is what gets reported.
    fn discard(&mut self) {
        if let Err(err) = expect_rollback(self.adapter.rollback()) {
            tracing::warn!(
                target: "squall.sql",
                backend = self.adapter.name(),
                error = %err,
                "rollback after failed statement did not complete"
            );
        }
    }
}

impl<A: Adapter + ?Sized> fmt::Debug for Transaction<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("backend", &self.adapter.name())
            .field("queue", &self.queue)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

fn validate_all(queue: &[Statement]) -> SqlResult<()> {
    queue.iter().try_for_each(Statement::validate)
}

/// A rollback that reports `RollbackSignaled` succeeded.
fn expect_rollback(result: SqlResult<()>) -> SqlResult<()> {
    match result {
        Ok(()) | Err(SqlError::RollbackSignaled(_)) => Ok(()),
        Err(err) => Err(err),
    }
}
