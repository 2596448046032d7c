//! Logging capability handed to the request client.

use std::fmt;
use std::sync::Arc;

/// Two-channel event sink used by [`RequestClient`](crate::RequestClient).
///
/// The client never reaches for a global logger; whoever builds it decides
/// where events go.
pub trait RequestLog: Send + Sync {
    /// Records an informational event.
    fn info(&self, message: &str);

    /// Records a failure.
    fn error(&self, message: &str);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl RequestLog for TracingLog {
    fn info(&self, message: &str) {
        tracing::info!(target: "mailpilot_remote", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "mailpilot_remote", "{message}");
    }
}

/// Shared handle to a [`RequestLog`].
#[derive(Clone)]
pub struct LogHandle(Arc<dyn RequestLog>);

impl LogHandle {
    /// Wraps a log implementation.
    #[must_use]
    pub fn new(log: impl RequestLog + 'static) -> Self {
        Self(Arc::new(log))
    }

    /// Wraps an already shared log implementation.
    #[must_use]
    pub fn from_arc(log: Arc<dyn RequestLog>) -> Self {
        Self(log)
    }

    pub(crate) fn info(&self, message: impl AsRef<str>) {
        self.0.info(message.as_ref());
    }

    pub(crate) fn error(&self, message: impl AsRef<str>) {
        self.0.error(message.as_ref());
    }
}

impl Default for LogHandle {
    fn default() -> Self {
        Self::new(TracingLog)
    }
}

impl fmt::Debug for LogHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LogHandle")
    }
}
