//! Logger capability.
//!
//! The pipeline logs through [`Logger`] so the host decides where output goes.
//! Methods return nothing: a logger cannot fail a request.

use std::sync::Arc;

use serde_json::Value;

/// Anything that can take a message and optional structured metadata.
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str, meta: Option<&Value>);
    fn info(&self, message: &str, meta: Option<&Value>);
    fn warn(&self, message: &str, meta: Option<&Value>);
    fn error(&self, message: &str, meta: Option<&Value>);
}

/// Forwards to `tracing`, so whichever subscriber the process installed
/// decides format and filtering. Metadata is attached as a `meta` field.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: &str, meta: Option<&Value>) {
        match meta {
            Some(meta) => tracing::debug!(%meta, "{message}"),
            None => tracing::debug!("{message}"),
        }
    }

    fn info(&self, message: &str, meta: Option<&Value>) {
        match meta {
            Some(meta) => tracing::info!(%meta, "{message}"),
            None => tracing::info!("{message}"),
        }
    }

    fn warn(&self, message: &str, meta: Option<&Value>) {
        match meta {
            Some(meta) => tracing::warn!(%meta, "{message}"),
            None => tracing::warn!("{message}"),
        }
    }

    fn error(&self, message: &str, meta: Option<&Value>) {
        match meta {
            Some(meta) => tracing::error!(%meta, "{message}"),
            None => tracing::error!("{message}"),
        }
    }
}

/// Discards everything. Useful in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLogger;

impl Logger for NoLogger {
    fn debug(&self, _: &str, _: Option<&Value>) {}
    fn info(&self, _: &str, _: Option<&Value>) {}
    fn warn(&self, _: &str, _: Option<&Value>) {}
    fn error(&self, _: &str, _: Option<&Value>) {}
}

/// Environment variable read by [`from_env`].
pub const LOGGER_ENV: &str = "STRATUS_LOGGER";

/// [`NoLogger`] when `STRATUS_LOGGER` is `off`, `none` or `0`; otherwise
/// [`TracingLogger`].
pub fn from_env() -> Arc<dyn Logger> {
    if disables_logging(std::env::var(LOGGER_ENV).ok().as_deref()) {
        Arc::new(NoLogger)
    } else {
        Arc::new(TracingLogger)
    }
}

fn disables_logging(value: Option<&str>) -> bool {
    value.is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "off" | "none" | "0"))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Records every call as `(level, message, meta)`.
    #[derive(Default)]
    pub(crate) struct RecordingLogger {
        pub(crate) entries: Mutex<Vec<(&'static str, String, Option<Value>)>>,
    }

    impl RecordingLogger {
        fn push(&self, level: &'static str, message: &str, meta: Option<&Value>) {
            if let Ok(mut entries) = self.entries.lock() {
                entries.push((level, message.to_owned(), meta.cloned()));
            }
        }

        pub(crate) fn levels(&self) -> Vec<(&'static str, String)> {
            self.entries
                .lock()
                .map(|e| e.iter().map(|(l, m, _)| (*l, m.clone())).collect())
                .unwrap_or_default()
        }
    }

    impl Logger for RecordingLogger {
        fn debug(&self, message: &str, meta: Option<&Value>) { self.push("debug", message, meta) }
        fn info(&self, message: &str, meta: Option<&Value>) { self.push("info", message, meta) }
        fn warn(&self, message: &str, meta: Option<&Value>) { self.push("warn", message, meta) }
        fn error(&self, message: &str, meta: Option<&Value>) { self.push("error", message, meta) }
    }
}
