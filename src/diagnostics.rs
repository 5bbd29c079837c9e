use chrono::{DateTime, Utc};

use crate::error::ViewerError;

/// One reported failure
#[derive(Debug)]
pub struct Diagnostic {
    pub at: DateTime<Utc>,
    pub error: ViewerError,
}

impl Diagnostic {
    pub fn now(error: ViewerError) -> Self {
        Self {
            at: Utc::now(),
            error,
        }
    }
}

/// Operator-visible error channel.
///
/// Everything the viewer cannot act on ends up here; nothing is propagated
/// to the caller.
pub trait DiagnosticSink {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, diagnostic: Diagnostic) {
        log::error!("[{}] {}", diagnostic.at.format("%H:%M:%S%.3f"), diagnostic.error);
    }
}
