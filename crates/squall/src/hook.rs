//! Statement execution hooks.
//!
//! A [`Transaction`](crate::Transaction) calls its hook around every statement
//! it runs, with the SQL exactly as sent to the adapter.

use crate::statement::Command;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

/// Maximum length for error messages in [`ExecResult::Error`].
const MAX_ERROR_LEN: usize = 512;

/// What a hook sees about one statement.
#[derive(Debug, Clone)]
pub struct HookContext {
    /// Rendered SQL, as sent to the adapter.
    pub sql: String,
    pub command: Option<Command>,
    /// Adapter name.
    pub backend: &'static str,
    /// Zero-based position in the transaction queue.
    pub position: usize,
}

/// Outcome of one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecResult {
    /// Query returned rows.
    Rows(usize),
    /// Mutation affected rows.
    Affected(u64),
    /// Statement failed (message truncated to 512 bytes).
    Error(String),
}

impl ExecResult {
    pub fn error(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        if msg.len() > MAX_ERROR_LEN {
            Self::Error(format!("{}...", truncate_bytes(&msg, MAX_ERROR_LEN)))
        } else {
            Self::Error(msg)
        }
    }
}

impl fmt::Display for ExecResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecResult::Rows(n) => write!(f, "{n} rows"),
            ExecResult::Affected(n) => write!(f, "{n} affected"),
            ExecResult::Error(e) => write!(f, "error: {e}"),
        }
    }
}

fn truncate_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Hook into statement execution.
pub trait ExecHook: Send + Sync {
    /// Called before the statement is sent to the adapter.
    fn before_statement(&self, _ctx: &HookContext) {}

    /// Called once the adapter returns, on success or failure.
    fn after_statement(&self, _ctx: &HookContext, _result: &ExecResult, _duration: Duration) {}
}

/// Runs several hooks in insertion order.
#[derive(Clone, Default)]
pub struct CompositeHook {
    hooks: Vec<Arc<dyn ExecHook>>,
}

impl CompositeHook {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn add<H: ExecHook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn add_arc(mut self, hook: Arc<dyn ExecHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for CompositeHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeHook")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl ExecHook for CompositeHook {
    fn before_statement(&self, ctx: &HookContext) {
        for hook in &self.hooks {
            hook.before_statement(ctx);
        }
    }

    fn after_statement(&self, ctx: &HookContext, result: &ExecResult, duration: Duration) {
        for hook in &self.hooks {
            hook.after_statement(ctx, result, duration);
        }
    }
}

/// Logs every statement through `tracing` on target `squall.sql`.
#[derive(Debug, Clone)]
pub struct TracingHook {
    pub level: Level,
    /// Truncate long SQL (in bytes). `None` disables truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for TracingHook {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }
}

impl TracingHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }
}

macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN => tracing::warn!($($field)*),
            Level::INFO => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

impl ExecHook for TracingHook {
    fn before_statement(&self, ctx: &HookContext) {
        let sql = self.truncate_sql(&ctx.sql);
        let command = ctx.command.map(Command::as_str).unwrap_or("-");
        emit_at_level!(
            self.level,
            target: "squall.sql",
            backend = ctx.backend,
            position = ctx.position,
            command,
            sql = %sql,
        );
    }

    fn after_statement(&self, ctx: &HookContext, result: &ExecResult, duration: Duration) {
        emit_at_level!(
            self.level,
            target: "squall.sql",
            backend = ctx.backend,
            position = ctx.position,
            duration_us = duration.as_micros() as u64,
            result = %result,
        );
    }
}
