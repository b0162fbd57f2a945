//! Concurrent provider fetching.
//!
//! Each source runs on the blocking pool under its own timeout. A source
//! that errors, panics or overruns becomes a failed batch; the others are
//! unaffected.

use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

use crate::integrations::{FetchLimits, SignalSource};
use crate::normalize::RawBatch;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_MAX_ITEMS_PER_PROVIDER: usize = 200;

/// Fetch budget applied to every source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub max_items: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_FETCH_TIMEOUT,
            max_items: DEFAULT_MAX_ITEMS_PER_PROVIDER,
        }
    }
}

async fn fetch_one(source: Arc<dyn SignalSource>, config: FetchConfig) -> RawBatch {
    let name = source.name().to_string();
    let limits = FetchLimits {
        max_items: config.max_items,
    };

    let task = tokio::task::spawn_blocking(move || source.fetch(&limits));
    let outcome = tokio::time::timeout(config.timeout, task).await;
    let fetched_at = Utc::now();

    match outcome {
        Ok(Ok(Ok(mut payload))) => {
            // Sources are asked to respect the cap; enforce it regardless.
            payload.truncate(config.max_items);
            tracing::debug!(provider = %name, records = payload.len(), "fetch succeeded");
            RawBatch::fetched(payload, fetched_at)
        }
        Ok(Ok(Err(e))) => {
            tracing::warn!(provider = %name, "fetch failed: {e}");
            RawBatch::failed(name, e.to_string(), fetched_at)
        }
        Ok(Err(join_err)) => {
            tracing::warn!(provider = %name, "fetch task aborted: {join_err}");
            RawBatch::failed(name, format!("fetch task aborted: {join_err}"), fetched_at)
        }
        Err(_) => {
            tracing::warn!(provider = %name, timeout_ms = config.timeout.as_millis() as u64, "fetch timed out");
            RawBatch::failed(
                name,
                format!("timed out after {}ms", config.timeout.as_millis()),
                fetched_at,
            )
        }
    }
}

/// Fetch every source concurrently. Batches come back in source order.
pub async fn gather(sources: &[Arc<dyn SignalSource>], config: &FetchConfig) -> Vec<RawBatch> {
    let config = *config;
    join_all(sources.iter().cloned().map(|source| fetch_one(source, config))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::linear::LinearIssue;
    use crate::integrations::ProviderPayload;

    struct Fixed(usize);

    impl SignalSource for Fixed {
        fn name(&self) -> &str {
            "linear"
        }

        fn display_name(&self) -> &str {
            "Linear"
        }

        fn fetch(
            &self,
            _limits: &FetchLimits,
        ) -> Result<ProviderPayload, Box<dyn std::error::Error + Send + Sync>> {
            let issues = (0..self.0)
                .map(|n| LinearIssue {
                    identifier: Some(format!("ENG-{n}")),
                    ..LinearIssue::default()
                })
                .collect();
            Ok(ProviderPayload::Linear(issues))
        }
    }

    struct Failing;

    impl SignalSource for Failing {
        fn name(&self) -> &str {
            "slack"
        }

        fn display_name(&self) -> &str {
            "Slack"
        }

        fn fetch(
            &self,
            _limits: &FetchLimits,
        ) -> Result<ProviderPayload, Box<dyn std::error::Error + Send + Sync>> {
            Err("invalid_auth".into())
        }
    }

    struct Slow;

    impl SignalSource for Slow {
        fn name(&self) -> &str {
            "notion"
        }

        fn display_name(&self) -> &str {
            "Notion"
        }

        fn fetch(
            &self,
            _limits: &FetchLimits,
        ) -> Result<ProviderPayload, Box<dyn std::error::Error + Send + Sync>> {
            std::thread::sleep(Duration::from_millis(800));
            Ok(ProviderPayload::Notion(Vec::new()))
        }
    }

    struct Panicking;

    impl SignalSource for Panicking {
        fn name(&self) -> &str {
            "discord"
        }

        fn display_name(&self) -> &str {
            "Discord"
        }

        fn fetch(
            &self,
            _limits: &FetchLimits,
        ) -> Result<ProviderPayload, Box<dyn std::error::Error + Send + Sync>> {
            panic!("adapter bug")
        }
    }

    fn config() -> FetchConfig {
        FetchConfig {
            timeout: Duration::from_millis(250),
            max_items: 3,
        }
    }

    #[tokio::test]
    async fn failures_are_isolated() {
        let sources: Vec<Arc<dyn SignalSource>> =
            vec![Arc::new(Failing), Arc::new(Fixed(2)), Arc::new(Slow), Arc::new(Panicking)];
        let batches = gather(&sources, &config()).await;

        let providers: Vec<_> = batches.iter().map(|b| b.provider.as_str()).collect();
        assert_eq!(providers, vec!["slack", "linear", "notion", "discord"]);

        assert_eq!(batches[0].error(), Some("invalid_auth"));
        assert!(batches[1].is_fetched());
        assert!(batches[2].error().is_some_and(|e| e.contains("timed out")));
        assert!(batches[3].error().is_some_and(|e| e.contains("aborted")));
    }

    #[tokio::test]
    async fn payloads_are_capped() {
        let sources: Vec<Arc<dyn SignalSource>> = vec![Arc::new(Fixed(10))];
        let batches = gather(&sources, &config()).await;
        match &batches[0].outcome {
            crate::normalize::FetchOutcome::Fetched { payload } => assert_eq!(payload.len(), 3),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn no_sources_no_batches() {
        assert!(gather(&[], &FetchConfig::default()).await.is_empty());
    }
}
