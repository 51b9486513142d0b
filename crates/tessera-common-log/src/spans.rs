//! Tracing spans for authorization work.

use tracing::{debug_span, info_span, Span};

/// Span wrapping one engine operation for one requesting user.
pub fn authz_span(user: &str, op: &'static str) -> Span {
    info_span!("authz", user = %user, op = op, error = tracing::field::Empty)
}

/// Span for a single repository lookup.
pub fn repository_span(query: &'static str) -> Span {
    debug_span!("repository", query = query)
}

/// Record an error on the current span.
pub fn record_error(error: &dyn std::error::Error) {
    Span::current().record("error", tracing::field::display(error));
}

/// Timing utility for operations.
pub struct Timer {
    start: std::time::Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    /// Complete the timer and record duration.
    pub fn finish(self) {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_us = %duration.as_micros(),
            "operation completed"
        );
    }
}

/// Macro for timing a block of code.
#[macro_export]
macro_rules! timed {
    ($name:expr, $body:expr) => {{
        let _timer = $crate::spans::Timer::start($name);
        let result = $body;
        _timer.finish();
        result
    }};
}
