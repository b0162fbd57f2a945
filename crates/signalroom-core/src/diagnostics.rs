//! Reporting hook for malformed provider data.
//!
//! Stages never fail on bad input: an unparseable date, a URL that does not
//! parse or a timestamp in the future is treated as absent and reported here
//! so the caller can decide what to do with it.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// One malformed-field report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Tool the record came from
    pub source: String,
    /// Record id, when one could be read
    pub external_id: Option<String>,
    /// Field that was dropped
    pub field: String,
    /// What was wrong with it
    pub detail: String,
}

impl Diagnostic {
    pub fn new(
        source: impl Into<String>,
        external_id: Option<&str>,
        field: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            external_id: external_id.map(str::to_string),
            field: field.into(),
            detail: detail.into(),
        }
    }
}

/// Caller-supplied receiver for malformed-field reports.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Default sink: emits a `tracing` warning per report.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        tracing::warn!(
            source = %diagnostic.source,
            item = diagnostic.external_id.as_deref().unwrap_or("-"),
            field = %diagnostic.field,
            "ignoring malformed field: {}",
            diagnostic.detail
        );
    }
}

/// Sink that keeps every report in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn entries(&self) -> Vec<Diagnostic> {
        match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match self.entries.lock() {
            Ok(mut guard) => guard.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for Arc<T> {
    fn report(&self, diagnostic: Diagnostic) {
        (**self).report(diagnostic)
    }
}

/// Shared default sink.
pub fn default_sink() -> Arc<dyn DiagnosticSink> {
    Arc::new(TracingSink)
}
