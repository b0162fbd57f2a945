//! One synchronous pass from fetched batches to a brief.
//!
//! normalize -> split by provider kind -> tasks: classify, score, decide ->
//! chat: message classification -> mode filter -> brief -> coverage.
//!
//! Nothing here reads the clock; `now` is always supplied by the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::brief::{Brief, BriefCandidate, BriefCompiler, SummaryRenderer};
use crate::classify::{MessageClassifier, SignalClassifier, SignalFlags};
use crate::config::Config;
use crate::coverage::{CoverageAssessment, CoverageAssessor};
use crate::decision::{decide, SurfaceVerdict};
use crate::diagnostics::DiagnosticSink;
use crate::mode::{filter_by_mode, IntentMode};
use crate::model::{CanonicalItem, ProviderKind, UnifiedSignal};
use crate::normalize::{Normalizer, RawBatch};
use crate::scoring::{ImportanceScorer, ScoreBreakdown};

/// A task item with everything the engine derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessedItem {
    pub item: CanonicalItem,
    pub flags: SignalFlags,
    pub score: ScoreBreakdown,
    pub verdict: SurfaceVerdict,
}

/// Output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub mode: IntentMode,
    pub generated_at: DateTime<Utc>,
    /// Every task item, surfaced or not
    pub items: Vec<AssessedItem>,
    /// Mode-filtered chat signals followed by admitted task projections
    pub signals: Vec<UnifiedSignal>,
    pub brief: Brief,
    pub coverage: CoverageAssessment,
}

/// The wired-up engine.
pub struct Pipeline {
    normalizer: Normalizer,
    classifier: SignalClassifier,
    scorer: ImportanceScorer,
    messages: MessageClassifier,
    compiler: BriefCompiler,
    coverage: CoverageAssessor,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            normalizer: Normalizer::new(),
            classifier: SignalClassifier::new(),
            scorer: ImportanceScorer::new(),
            messages: MessageClassifier::new(),
            compiler: BriefCompiler::new(),
            coverage: CoverageAssessor::default(),
        }
    }

    /// Build from user configuration.
    pub fn from_config(config: &Config) -> Self {
        let matcher = config.classifier.matcher;
        Self {
            normalizer: Normalizer::new(),
            classifier: SignalClassifier::new().with_matcher(matcher.build()),
            scorer: ImportanceScorer::new(),
            messages: MessageClassifier::new()
                .with_matcher(matcher.build())
                .with_handles(&config.user.handles),
            compiler: BriefCompiler::new().with_fyi_score_ceiling(config.brief.fyi_score_ceiling),
            coverage: CoverageAssessor::new(config.tool_catalog()),
        }
    }

    /// Route malformed-field reports to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.normalizer = self.normalizer.with_sink(sink.clone());
        self.classifier = self.classifier.with_sink(sink);
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn SummaryRenderer>) -> Self {
        self.compiler = self.compiler.with_renderer(renderer);
        self
    }

    pub fn with_handles<I, S>(mut self, handles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.messages = self.messages.with_handles(handles);
        self
    }

    /// Classify, score and decide one task item.
    pub fn assess(&self, item: CanonicalItem, now: DateTime<Utc>) -> AssessedItem {
        let flags = self.classifier.classify(&item, now);
        let score = self.scorer.score(&item, &flags, now);
        let verdict = decide(&flags);
        AssessedItem {
            item,
            flags,
            score,
            verdict,
        }
    }

    pub fn run(&self, batches: &[RawBatch], mode: IntentMode, now: DateTime<Utc>) -> PipelineReport {
        let items = self.normalizer.normalize(batches);

        let mut chat = Vec::new();
        let mut assessed = Vec::new();
        for item in items {
            match item.provider {
                ProviderKind::ChatMessage => chat.push(self.messages.classify(&item)),
                ProviderKind::Task => assessed.push(self.assess(item, now)),
            }
        }

        let policy = mode.policy();
        let mut signals = filter_by_mode(&chat, mode);
        let mut candidates: Vec<BriefCandidate> =
            signals.iter().cloned().map(BriefCandidate::Signal).collect();

        for entry in &assessed {
            match UnifiedSignal::from_task(&entry.item, &entry.verdict) {
                Some(projection) if policy.admits(&projection) => {
                    signals.push(projection);
                    candidates.push(BriefCandidate::Item(entry.clone()));
                }
                // Surfaced, but the mode keeps it out.
                Some(_) => {}
                // Not surfaced; may still be reported as handled.
                None => candidates.push(BriefCandidate::Item(entry.clone())),
            }
        }

        let brief = self.compiler.compile(&candidates);
        let connected = batches
            .iter()
            .filter(|b| b.is_fetched())
            .map(|b| b.provider.as_str());
        let coverage = self.coverage.assess(connected);

        tracing::debug!(
            mode = %mode,
            tasks = assessed.len(),
            chat = chat.len(),
            signals = signals.len(),
            coverage = coverage.percentage,
            "pipeline run complete"
        );

        PipelineReport {
            mode,
            generated_at: now,
            items: assessed,
            signals,
            brief,
            coverage,
        }
    }
}
