//! Leveled diagnostic sink injected into the verifier.

/// Receives human-readable progress and error messages.
pub trait Logger: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

impl<T: Logger + ?Sized> Logger for std::sync::Arc<T> {
    fn info(&self, message: &str) {
        (**self).info(message);
    }

    fn error(&self, message: &str) {
        (**self).error(message);
    }
}

/// Discards everything. Used when `debug` is off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn info(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// Forwards to `tracing` under the `mailping` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: "mailping", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "mailping", "{message}");
    }
}
