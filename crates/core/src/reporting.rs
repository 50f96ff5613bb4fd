//! Pluggable error reporting.
//!
//! Components report errors and warnings through [`ErrorReporter`]. The
//! binary installs one reporter at startup with [`install_reporter`]; until
//! then (and in tests) [`reporter`] hands out a [`TracingReporter`]. An
//! external reporting service is an optional sink behind
//! [`ForwardingReporter`], never a hard dependency.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

/// Where an event came from plus free-form key/value context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportContext {
    pub component: String,
    pub extra: BTreeMap<String, String>,
}

impl ReportContext {
    #[must_use]
    pub fn new(component: impl Into<String>) -> Self {
        Self { component: component.into(), extra: BTreeMap::new() }
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

pub trait ErrorReporter: Send + Sync {
    fn error(&self, error: &dyn std::error::Error, ctx: &ReportContext);

    fn warning(&self, message: &str, ctx: &ReportContext);

    /// Informational events. Dropped by default.
    fn info(&self, _message: &str, _ctx: &ReportContext) {}
}

/// Writes every event to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn error(&self, error: &dyn std::error::Error, ctx: &ReportContext) {
        tracing::error!(component = %ctx.component, extra = ?ctx.extra, error = %error, "error reported");
    }

    fn warning(&self, message: &str, ctx: &ReportContext) {
        tracing::warn!(component = %ctx.component, extra = ?ctx.extra, "{message}");
    }

    fn info(&self, message: &str, ctx: &ReportContext) {
        tracing::info!(component = %ctx.component, extra = ?ctx.extra, "{message}");
    }
}

/// Logs locally, then forwards to an optional external sink.
pub struct ForwardingReporter {
    local: TracingReporter,
    sink: Option<Arc<dyn ErrorReporter>>,
}

impl ForwardingReporter {
    #[must_use]
    pub fn new(sink: Option<Arc<dyn ErrorReporter>>) -> Self {
        Self { local: TracingReporter, sink }
    }

    #[must_use]
    pub const fn has_sink(&self) -> bool {
        self.sink.is_some()
    }
}

impl ErrorReporter for ForwardingReporter {
    fn error(&self, error: &dyn std::error::Error, ctx: &ReportContext) {
        self.local.error(error, ctx);
        if let Some(sink) = &self.sink {
            sink.error(error, ctx);
        }
    }

    fn warning(&self, message: &str, ctx: &ReportContext) {
        self.local.warning(message, ctx);
        if let Some(sink) = &self.sink {
            sink.warning(message, ctx);
        }
    }

    fn info(&self, message: &str, ctx: &ReportContext) {
        self.local.info(message, ctx);
        if let Some(sink) = &self.sink {
            sink.info(message, ctx);
        }
    }
}

static REPORTER: OnceLock<Arc<dyn ErrorReporter>> = OnceLock::new();

/// Install the process-wide reporter. Returns `false` if one was already set.
pub fn install_reporter(reporter: Arc<dyn ErrorReporter>) -> bool {
    REPORTER.set(reporter).is_ok()
}

/// The installed reporter, or a [`TracingReporter`] if none was installed.
pub fn reporter() -> Arc<dyn ErrorReporter> {
    match REPORTER.get() {
        Some(r) => Arc::clone(r),
        None => Arc::new(TracingReporter),
    }
}

pub fn report_error(error: &dyn std::error::Error, ctx: &ReportContext) {
    reporter().error(error, ctx);
}

pub fn report_warning(message: &str, ctx: &ReportContext) {
    reporter().warning(message, ctx);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<String>>,
    }

    impl ErrorReporter for RecordingSink {
        fn error(&self, error: &dyn std::error::Error, ctx: &ReportContext) {
            self.events.lock().unwrap().push(format!("error:{}:{error}", ctx.component));
        }

        fn warning(&self, message: &str, ctx: &ReportContext) {
            self.events.lock().unwrap().push(format!("warning:{}:{message}", ctx.component));
        }
    }

    #[test]
    fn test_forwarding_reporter_reaches_sink() {
        let sink = Arc::new(RecordingSink::default());
        let reporter = ForwardingReporter::new(Some(sink.clone()));
        assert!(reporter.has_sink());

        let err = std::io::Error::other("disk gone");
        reporter.error(&err, &ReportContext::new("storage"));
        reporter.warning("slow query", &ReportContext::new("http").with("ms", "900"));
        reporter.info("ignored by sink default", &ReportContext::new("http"));

        let events = sink.events.lock().unwrap();
        assert_eq!(*events, vec!["error:storage:disk gone", "warning:http:slow query"]);
    }

    #[test]
    fn test_forwarding_reporter_without_sink() {
        let reporter = ForwardingReporter::new(None);
        assert!(!reporter.has_sink());
        reporter.warning("only logged", &ReportContext::default());
    }

    #[test]
    fn test_context_extra_is_ordered() {
        let ctx = ReportContext::new("client").with("b", "2").with("a", "1");
        let keys: Vec<_> = ctx.extra.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
