//! Behavioural flags for task items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::keywords::{
    KeywordMatcher, SubstringMatcher, APPRECIATION, BLOCKING, ESCALATION, MILESTONE,
    POSITIVE_FEEDBACK,
};
use crate::diagnostics::{default_sink, Diagnostic, DiagnosticSink};
use crate::model::CanonicalItem;

/// Due within this many days (or overdue) counts as time pressure.
pub const TIME_PRESSURE_DAYS: i64 = 3;
/// Movement gap: no activity for at least this many days...
pub const MOVEMENT_GAP_IDLE_DAYS: i64 = 3;
/// ...with the due date at most this many days away.
pub const MOVEMENT_GAP_DUE_DAYS: i64 = 7;

/// Boolean behavioural flags derived from one item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalFlags {
    pub has_commitment: bool,
    pub has_time_pressure: bool,
    pub has_movement_gap: bool,
    pub has_dependency: bool,
    pub has_escalation: bool,
    pub has_appreciation: bool,
    pub has_milestone: bool,
    pub has_positive_feedback: bool,
}

impl SignalFlags {
    /// Any of the three positive flags.
    pub fn is_positive(&self) -> bool {
        self.has_milestone || self.has_appreciation || self.has_positive_feedback
    }

    /// Names of the flags that are set, in declaration order.
    pub fn active(&self) -> Vec<&'static str> {
        [
            ("commitment", self.has_commitment),
            ("time_pressure", self.has_time_pressure),
            ("movement_gap", self.has_movement_gap),
            ("dependency", self.has_dependency),
            ("escalation", self.has_escalation),
            ("appreciation", self.has_appreciation),
            ("milestone", self.has_milestone),
            ("positive_feedback", self.has_positive_feedback),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }
}

/// Rule-based flag classifier.
pub struct SignalClassifier {
    matcher: Box<dyn KeywordMatcher>,
    sink: Arc<dyn DiagnosticSink>,
}

impl SignalClassifier {
    /// Substring matching, malformed fields logged via `tracing`.
    pub fn new() -> Self {
        Self {
            matcher: Box::new(SubstringMatcher),
            sink: default_sink(),
        }
    }

    pub fn with_matcher(mut self, matcher: Box<dyn KeywordMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn matcher(&self) -> &dyn KeywordMatcher {
        self.matcher.as_ref()
    }

    /// Compute the flags for `item` as of `now`.
    pub fn classify(&self, item: &CanonicalItem, now: DateTime<Utc>) -> SignalFlags {
        let today = now.date_naive();
        let days_until_due = item.days_until_due(today);
        let days_idle = item.days_since_activity(now);

        if let (Some(last), None) = (item.last_activity_at, days_idle) {
            self.sink.report(Diagnostic::new(
                item.source.as_str(),
                Some(item.external_id.as_str()),
                "last_activity_at",
                format!("{last} is after {now}"),
            ));
        }

        let title = item.title.to_lowercase();
        let text = item.full_text_lower();
        let m = self.matcher.as_ref();

        let has_time_pressure = days_until_due.is_some_and(|d| d <= TIME_PRESSURE_DAYS);
        let has_movement_gap = match (days_idle, days_until_due) {
            (Some(idle), Some(due)) => idle >= MOVEMENT_GAP_IDLE_DAYS && due <= MOVEMENT_GAP_DUE_DAYS,
            _ => false,
        };

        SignalFlags {
            has_commitment: item.owner_name.is_some() && item.due_date.is_some(),
            has_time_pressure,
            has_movement_gap,
            has_dependency: m.any(&item.status, &BLOCKING) || m.any(&title, &BLOCKING),
            has_escalation: m.any(&title, &ESCALATION),
            has_appreciation: m.any(&text, &APPRECIATION),
            has_milestone: m.any(&text, &MILESTONE),
            has_positive_feedback: m.any(&text, &POSITIVE_FEEDBACK),
        }
    }
}

impl Default for SignalClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify with the default classifier.
pub fn classify(item: &CanonicalItem, now: DateTime<Utc>) -> SignalFlags {
    SignalClassifier::new().classify(item, now)
}
