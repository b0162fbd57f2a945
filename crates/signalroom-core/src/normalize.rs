//! Normalizer: fetched batches to deduplicated canonical items.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::diagnostics::{default_sink, DiagnosticSink};
use crate::integrations::ProviderPayload;
use crate::model::{CanonicalItem, ProviderKind};

/// Result of one provider fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    Fetched { payload: ProviderPayload },
    Failed { error: String },
}

/// Everything one provider returned in one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBatch {
    /// Tool name
    pub provider: String,
    pub fetched_at: DateTime<Utc>,
    pub outcome: FetchOutcome,
}

impl RawBatch {
    pub fn fetched(payload: ProviderPayload, fetched_at: DateTime<Utc>) -> Self {
        Self {
            provider: payload.tool_name().to_string(),
            fetched_at,
            outcome: FetchOutcome::Fetched { payload },
        }
    }

    pub fn failed(provider: impl Into<String>, error: impl Into<String>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            provider: provider.into(),
            fetched_at,
            outcome: FetchOutcome::Failed { error: error.into() },
        }
    }

    pub fn is_fetched(&self) -> bool {
        matches!(self.outcome, FetchOutcome::Fetched { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            FetchOutcome::Failed { error } => Some(error),
            FetchOutcome::Fetched { .. } => None,
        }
    }
}

/// Collapses batches into one item per `(provider, external_id)`.
pub struct Normalizer {
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self { sink: default_sink() }
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Deduplicate across batches. On a key collision the record fetched
    /// later wins, and on equal fetch times the later batch wins; output keeps
    /// the order in which keys first appeared. Never fails.
    pub fn normalize(&self, batches: &[RawBatch]) -> Vec<CanonicalItem> {
        let mut seen: IndexMap<(ProviderKind, String), (DateTime<Utc>, CanonicalItem)> = IndexMap::new();

        for batch in batches {
            let payload = match &batch.outcome {
                FetchOutcome::Fetched { payload } => payload,
                FetchOutcome::Failed { error } => {
                    tracing::warn!(provider = %batch.provider, "provider fetch failed: {error}");
                    continue;
                }
            };
            if payload.tool_name() != batch.provider {
                tracing::debug!(
                    provider = %batch.provider,
                    payload = payload.tool_name(),
                    "batch label differs from payload tool"
                );
            }

            let items = payload.clone().into_items(self.sink.as_ref());
            tracing::debug!(provider = %batch.provider, items = items.len(), "batch normalized");

            for item in items {
                let key = (item.provider, item.external_id.clone());
                match seen.get_mut(&key) {
                    Some(existing) if existing.0 > batch.fetched_at => {}
                    Some(existing) => *existing = (batch.fetched_at, item),
                    None => {
                        seen.insert(key, (batch.fetched_at, item));
                    }
                }
            }
        }

        seen.into_values().map(|(_, item)| item).collect()
    }
}

/// Normalize with the default diagnostics sink.
pub fn normalize(batches: &[RawBatch]) -> Vec<CanonicalItem> {
    Normalizer::new().normalize(batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use crate::integrations::linear::LinearIssue;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 0).unwrap()
    }

    fn issue(identifier: &str, title: &str) -> LinearIssue {
        LinearIssue {
            identifier: Some(identifier.to_string()),
            title: title.to_string(),
            ..LinearIssue::default()
        }
    }

    fn linear(issues: Vec<LinearIssue>, at: DateTime<Utc>) -> RawBatch {
        RawBatch::fetched(ProviderPayload::Linear(issues), at)
    }

    fn titles(items: &[CanonicalItem]) -> Vec<&str> {
        items.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn later_fetch_wins_but_keeps_first_position() {
        let batches = vec![
            linear(vec![issue("A-1", "old a"), issue("A-2", "b")], t0() + Duration::minutes(5)),
            linear(vec![issue("A-3", "c"), issue("A-1", "stale a")], t0()),
            linear(vec![issue("A-1", "new a")], t0() + Duration::minutes(10)),
        ];
        let items = normalize(&batches);
        assert_eq!(titles(&items), vec!["new a", "b", "c"]);
    }

    #[test]
    fn equal_fetch_time_later_batch_wins() {
        let batches = vec![
            linear(vec![issue("A-1", "first")], t0()),
            linear(vec![issue("A-1", "second")], t0()),
        ];
        assert_eq!(titles(&normalize(&batches)), vec!["second"]);
    }

    #[test]
    fn failed_batches_contribute_nothing() {
        let batches = vec![
            RawBatch::failed("slack", "timed out", t0()),
            linear(vec![issue("A-1", "a")], t0()),
        ];
        let items = normalize(&batches);
        assert_eq!(items.len(), 1);
        assert!(!batches[0].is_fetched());
        assert_eq!(batches[0].error(), Some("timed out"));
    }

    #[test]
    fn no_batches_no_items() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn diagnostics_flow_to_the_sink() {
        let sink = Arc::new(CollectingSink::new());
        let batches = vec![linear(vec![LinearIssue::default(), issue("A-1", "a")], t0())];
        let items = Normalizer::new().with_sink(sink.clone()).normalize(&batches);
        assert_eq!(items.len(), 1);
        assert_eq!(sink.entries().len(), 1);
    }

    #[test]
    fn batch_serializes_with_status_tag() {
        let batch = RawBatch::failed("notion", "401", t0());
        let value = serde_json::to_value(&batch).unwrap();
        assert_eq!(value["outcome"]["status"], "failed");
        let back: RawBatch = serde_json::from_value(value).unwrap();
        assert_eq!(back, batch);
    }
}
