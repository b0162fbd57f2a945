//! Brief compilation.
//!
//! Buckets candidates into "needs attention", "FYI" and "handled", counts
//! what needs attention and phrases a one-line summary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::classify::keywords::bounded_matches;
use crate::model::{SignalCategory, SignalType, UnifiedSignal};
use crate::pipeline::AssessedItem;

/// Items scoring below this are FYI even when they surface.
pub const DEFAULT_FYI_SCORE_CEILING: u8 = 20;

/// Status words that mean an item no longer needs anyone.
pub const RESOLUTION_WORDS: [&str; 10] = [
    "done",
    "completed",
    "complete",
    "closed",
    "resolved",
    "merged",
    "shipped",
    "cancelled",
    "canceled",
    "won't fix",
];

/// A status word right before a resolution word cancels it ("not done").
const NEGATIONS: [&str; 5] = ["not", "never", "isn't", "wasn't", "aren't"];

const ALL_CLEAR: &str = "All clear: nothing needs your attention right now.";

/// Something the brief can place.
#[derive(Debug, Clone)]
pub enum BriefCandidate {
    /// A mode-filtered signal
    Signal(UnifiedSignal),
    /// An assessed task item
    Item(AssessedItem),
}

/// One line in a brief section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BriefEntry {
    pub id: String,
    pub source: String,
    pub title: String,
    pub category: Option<SignalCategory>,
    pub signal_type: SignalType,
    pub confidence: f64,
    /// Importance score, task items only
    pub score: Option<u8>,
    pub reason: Option<String>,
    pub status: Option<String>,
    pub url: Option<String>,
}

impl BriefEntry {
    fn from_signal(signal: &UnifiedSignal) -> Self {
        Self {
            id: signal.id.clone(),
            source: signal.source.clone(),
            title: signal.snippet.clone(),
            category: Some(signal.category),
            signal_type: signal.signal_type,
            confidence: signal.confidence,
            score: None,
            reason: signal
                .metadata
                .get("reason")
                .and_then(|r| r.as_str())
                .map(str::to_string),
            status: None,
            url: signal.url.clone(),
        }
    }

    fn from_assessed(assessed: &AssessedItem) -> Self {
        let item = &assessed.item;
        Self {
            id: item.signal_id(),
            source: item.source.clone(),
            title: item.title.clone(),
            category: assessed.verdict.category,
            signal_type: assessed.verdict.signal_type,
            confidence: assessed.verdict.confidence,
            score: Some(assessed.score.total),
            reason: assessed.verdict.reason.clone(),
            status: (!item.status.is_empty()).then(|| item.status.clone()),
            url: item.url.clone(),
        }
    }
}

/// Counts over "needs attention", in summary order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefCounts {
    /// Blockers and escalations
    pub blockers: usize,
    pub decisions: usize,
    /// Deadlines and commitments
    pub deadlines: usize,
    pub mentions: usize,
    pub questions: usize,
}

impl BriefCounts {
    fn record(&mut self, category: SignalCategory) {
        match category {
            SignalCategory::Blocker | SignalCategory::Escalation => self.blockers += 1,
            SignalCategory::Decision => self.decisions += 1,
            SignalCategory::Deadline | SignalCategory::Commitment => self.deadlines += 1,
            SignalCategory::Mention => self.mentions += 1,
            SignalCategory::Question => self.questions += 1,
            SignalCategory::Update => {}
        }
    }

    /// `(singular noun, count)` pairs in fixed order.
    pub fn entries(&self) -> [(&'static str, usize); 5] {
        [
            ("blocker", self.blockers),
            ("decision", self.decisions),
            ("deadline", self.deadlines),
            ("mention", self.mentions),
            ("question", self.questions),
        ]
    }

    pub fn total(&self) -> usize {
        self.entries().iter().map(|(_, n)| n).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// The fixed-template sentence for these counts.
    pub fn sentence(&self) -> String {
        let parts: Vec<String> = self
            .entries()
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(noun, n)| {
                if *n == 1 {
                    format!("1 {noun}")
                } else {
                    format!("{n} {noun}s")
                }
            })
            .collect();
        if parts.is_empty() {
            ALL_CLEAR.to_string()
        } else {
            format!("Needs your attention: {}.", parts.join(", "))
        }
    }
}

/// Where the summary sentence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    Deterministic,
    Rendered,
}

/// Compiled daily brief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brief {
    pub needs_attention: Vec<BriefEntry>,
    pub fyi: Vec<BriefEntry>,
    pub handled: Vec<BriefEntry>,
    pub counts: BriefCounts,
    pub summary: String,
    pub summary_source: SummarySource,
}

/// Phrases the summary line from counts.
///
/// Implementations only ever see [`BriefCounts`]; item text never leaves the
/// process through this seam.
pub trait SummaryRenderer: Send + Sync {
    fn render(&self, counts: &BriefCounts) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;
}

/// Buckets candidates into a [`Brief`].
#[derive(Clone)]
pub struct BriefCompiler {
    fyi_score_ceiling: u8,
    renderer: Option<Arc<dyn SummaryRenderer>>,
}

impl fmt::Debug for BriefCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BriefCompiler")
            .field("fyi_score_ceiling", &self.fyi_score_ceiling)
            .field("renderer", &self.renderer.is_some())
            .finish()
    }
}

impl Default for BriefCompiler {
    fn default() -> Self {
        Self::new()
    }
}

enum Placement {
    NeedsAttention,
    Fyi,
    Handled,
    Omitted,
}

impl BriefCompiler {
    pub fn new() -> Self {
        Self {
            fyi_score_ceiling: DEFAULT_FYI_SCORE_CEILING,
            renderer: None,
        }
    }

    pub fn with_fyi_score_ceiling(mut self, ceiling: u8) -> Self {
        self.fyi_score_ceiling = ceiling;
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn SummaryRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn fyi_score_ceiling(&self) -> u8 {
        self.fyi_score_ceiling
    }

    fn place_signal(&self, signal: &UnifiedSignal) -> Placement {
        if signal.category == SignalCategory::Update || signal.signal_type == SignalType::Positive {
            Placement::Fyi
        } else {
            Placement::NeedsAttention
        }
    }

    fn place_item(&self, assessed: &AssessedItem) -> Placement {
        let verdict = &assessed.verdict;
        if verdict.surface {
            return match verdict.signal_type {
                SignalType::Problem if assessed.score.total >= self.fyi_score_ceiling => {
                    Placement::NeedsAttention
                }
                _ => Placement::Fyi,
            };
        }
        if is_resolved(&assessed.item.status) {
            Placement::Handled
        } else {
            Placement::Omitted
        }
    }

    /// Compile a brief. Needs-attention entries are ordered by confidence,
    /// highest first; other sections keep input order.
    pub fn compile(&self, candidates: &[BriefCandidate]) -> Brief {
        let mut needs_attention = Vec::new();
        let mut fyi = Vec::new();
        let mut handled = Vec::new();

        for candidate in candidates {
            let (placement, entry) = match candidate {
                BriefCandidate::Signal(signal) => (self.place_signal(signal), BriefEntry::from_signal(signal)),
                BriefCandidate::Item(assessed) => (self.place_item(assessed), BriefEntry::from_assessed(assessed)),
            };
            match placement {
                Placement::NeedsAttention => needs_attention.push(entry),
                Placement::Fyi => fyi.push(entry),
                Placement::Handled => handled.push(entry),
                Placement::Omitted => {}
            }
        }

        needs_attention.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        let mut counts = BriefCounts::default();
        for category in needs_attention.iter().filter_map(|e| e.category) {
            counts.record(category);
        }

        let (summary, summary_source) = self.summarize(&counts);

        tracing::debug!(
            needs_attention = needs_attention.len(),
            fyi = fyi.len(),
            handled = handled.len(),
            "brief compiled"
        );

        Brief {
            needs_attention,
            fyi,
            handled,
            counts,
            summary,
            summary_source,
        }
    }

    fn summarize(&self, counts: &BriefCounts) -> (String, SummarySource) {
        let Some(renderer) = &self.renderer else {
            return (counts.sentence(), SummarySource::Deterministic);
        };
        match renderer.render(counts) {
            Ok(text) if !text.trim().is_empty() => (text.trim().to_string(), SummarySource::Rendered),
            Ok(_) => {
                tracing::warn!("summary renderer returned nothing, using fixed template");
                (counts.sentence(), SummarySource::Deterministic)
            }
            Err(e) => {
                tracing::warn!(error = %e, "summary renderer failed, using fixed template");
                (counts.sentence(), SummarySource::Deterministic)
            }
        }
    }
}

/// Compile a brief with default settings.
pub fn compile_brief(candidates: &[BriefCandidate]) -> Brief {
    BriefCompiler::new().compile(candidates)
}

/// Resolution words count only as whole words that are not negated, so
/// "incomplete", "unresolved" and "not done" stay open.
fn is_resolved(status: &str) -> bool {
    let status = status.to_lowercase();
    RESOLUTION_WORDS.iter().any(|word| {
        bounded_matches(&status, word, false).any(|start| !ends_with_negation(&status[..start]))
    })
}

fn ends_with_negation(text: &str) -> bool {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|w| !w.is_empty())
        .next_back()
        .map_or(false, |w| NEGATIONS.contains(&w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::SignalFlags;
    use crate::decision::{decide, SurfaceVerdict};
    use crate::model::{CanonicalItem, ProviderKind};
    use crate::scoring::{ScoreBreakdown, ScoreTerm};

    fn chat(category: SignalCategory, signal_type: SignalType, confidence: f64) -> BriefCandidate {
        let item = CanonicalItem::new(ProviderKind::ChatMessage, "slack", "slack:C1/1.0", "hello");
        BriefCandidate::Signal(UnifiedSignal::from_item(&item, category, confidence, signal_type))
    }

    fn assessed(status: &str, flags: SignalFlags, score: u8) -> AssessedItem {
        let item = CanonicalItem::new(ProviderKind::Task, "linear", "linear:ENG-1", "Ship it").with_status(status);
        AssessedItem {
            verdict: decide(&flags),
            flags,
            score: ScoreBreakdown {
                terms: vec![ScoreTerm { name: "due_date".into(), points: score }],
                total: score,
            },
            item,
        }
    }

    fn escalated() -> SignalFlags {
        SignalFlags { has_escalation: true, ..SignalFlags::default() }
    }

    #[test]
    fn empty_input_is_all_clear() {
        let brief = compile_brief(&[]);
        assert!(brief.needs_attention.is_empty());
        assert_eq!(brief.counts, BriefCounts::default());
        assert_eq!(brief.summary, ALL_CLEAR);
        assert_eq!(brief.summary_source, SummarySource::Deterministic);
    }

    #[test]
    fn signals_split_by_category_and_tone() {
        let brief = compile_brief(&[
            chat(SignalCategory::Update, SignalType::Neutral, 0.9),
            chat(SignalCategory::Blocker, SignalType::Problem, 0.85),
            chat(SignalCategory::Mention, SignalType::Positive, 0.8),
        ]);
        assert_eq!(brief.needs_attention.len(), 1);
        assert_eq!(brief.fyi.len(), 2);
        assert_eq!(brief.counts.blockers, 1);
    }

    #[test]
    fn summary_lists_nonzero_counts_in_order() {
        let brief = compile_brief(&[
            chat(SignalCategory::Decision, SignalType::Problem, 0.8),
            chat(SignalCategory::Escalation, SignalType::Problem, 0.9),
            chat(SignalCategory::Blocker, SignalType::Problem, 0.85),
        ]);
        assert_eq!(brief.summary, "Needs your attention: 2 blockers, 1 decision.");
    }

    #[test]
    fn commitments_count_as_deadlines() {
        let brief = compile_brief(&[
            chat(SignalCategory::Commitment, SignalType::Problem, 0.7),
            chat(SignalCategory::Question, SignalType::Problem, 0.65),
        ]);
        assert_eq!(brief.counts.deadlines, 1);
        assert_eq!(brief.summary, "Needs your attention: 1 deadline, 1 question.");
    }

    #[test]
    fn needs_attention_sorted_by_confidence() {
        let brief = compile_brief(&[
            chat(SignalCategory::Question, SignalType::Problem, 0.65),
            chat(SignalCategory::Escalation, SignalType::Problem, 0.95),
        ]);
        assert_eq!(brief.needs_attention[0].category, Some(SignalCategory::Escalation));
    }

    #[test]
    fn low_scoring_problem_item_is_fyi() {
        let high = assessed("in progress", escalated(), 20);
        let low = assessed("in progress", escalated(), 19);
        let brief = compile_brief(&[BriefCandidate::Item(high), BriefCandidate::Item(low)]);
        assert_eq!(brief.needs_attention.len(), 1);
        assert_eq!(brief.needs_attention[0].score, Some(20));
        assert_eq!(brief.fyi.len(), 1);
        assert_eq!(brief.summary, "Needs your attention: 1 blocker.");
    }

    #[test]
    fn ceiling_is_configurable() {
        let compiler = BriefCompiler::new().with_fyi_score_ceiling(50);
        let brief = compiler.compile(&[BriefCandidate::Item(assessed("todo", escalated(), 40))]);
        assert!(brief.needs_attention.is_empty());
        assert_eq!(brief.fyi.len(), 1);
    }

    #[test]
    fn positive_item_is_fyi() {
        let flags = SignalFlags { has_milestone: true, ..SignalFlags::default() };
        let brief = compile_brief(&[BriefCandidate::Item(assessed("done", flags, 80))]);
        assert_eq!(brief.fyi.len(), 1);
        assert!(brief.handled.is_empty());
    }

    #[test]
    fn resolved_unsurfaced_items_are_handled() {
        let brief = compile_brief(&[
            BriefCandidate::Item(assessed("Closed", SignalFlags::default(), 0)),
            BriefCandidate::Item(assessed("won't fix", SignalFlags::default(), 0)),
            BriefCandidate::Item(assessed("in progress", SignalFlags::default(), 0)),
        ]);
        assert_eq!(brief.handled.len(), 2);
        assert_eq!(brief.handled[0].status.as_deref(), Some("closed"));
        assert!(brief.fyi.is_empty());
        assert!(brief.needs_attention.is_empty());
    }

    #[test]
    fn negated_or_embedded_resolution_stays_open() {
        for status in ["Incomplete", "Not done", "Unresolved", "open unresolved", "undone", "never merged"] {
            let brief = compile_brief(&[BriefCandidate::Item(assessed(status, SignalFlags::default(), 0))]);
            assert!(brief.handled.is_empty(), "{status}");
        }

        let brief = compile_brief(&[
            BriefCandidate::Item(assessed("Done", SignalFlags::default(), 0)),
            BriefCandidate::Item(assessed("closed, resolved", SignalFlags::default(), 0)),
            BriefCandidate::Item(assessed("not blocked, done", SignalFlags::default(), 0)),
        ]);
        assert_eq!(brief.handled.len(), 3);
    }

    struct Fixed(&'static str);

    impl SummaryRenderer for Fixed {
        fn render(&self, _: &BriefCounts) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.0.to_string())
        }
    }

    struct Broken;

    impl SummaryRenderer for Broken {
        fn render(&self, _: &BriefCounts) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
            Err("model unavailable".into())
        }
    }

    #[test]
    fn renderer_output_used_when_present() {
        let compiler = BriefCompiler::new().with_renderer(Arc::new(Fixed("  Quiet morning.  ")));
        let brief = compiler.compile(&[]);
        assert_eq!(brief.summary, "Quiet morning.");
        assert_eq!(brief.summary_source, SummarySource::Rendered);
    }

    #[test]
    fn renderer_failure_falls_back() {
        for renderer in [Arc::new(Broken) as Arc<dyn SummaryRenderer>, Arc::new(Fixed("   "))] {
            let brief = BriefCompiler::new()
                .with_renderer(renderer)
                .compile(&[chat(SignalCategory::Mention, SignalType::Problem, 0.75)]);
            assert_eq!(brief.summary, "Needs your attention: 1 mention.");
            assert_eq!(brief.summary_source, SummarySource::Deterministic);
        }
    }

    #[test]
    fn task_reason_flows_into_entry() {
        let assessed = assessed("todo", escalated(), 30);
        let signal = UnifiedSignal::from_task(&assessed.item, &assessed.verdict);
        let entry = BriefEntry::from_signal(&signal.expect("surfaced"));
        assert_eq!(entry.reason.as_deref(), Some("escalation detected"));
        assert_ne!(SurfaceVerdict::suppressed(), assessed.verdict);
    }
}
