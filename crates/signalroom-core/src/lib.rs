//! # Signalroom Core Library
//!
//! Turns the raw output of a person's work tools (chat and task trackers)
//! into a short, prioritized daily brief. Every stage is a pure function of
//! its inputs and an explicit `now`; only [`gather`] touches the network side
//! and only the CLI reads the environment.
//!
//! ## Pipeline
//!
//! - **Normalize**: native provider records to deduplicated [`CanonicalItem`]s
//! - **Classify**: behavioural flags for tasks, category + confidence for chat
//! - **Score**: deterministic 0-100 importance for task items
//! - **Decide**: whether a task item surfaces, and why
//! - **Filter**: intent modes (calm, on the go, work, focus) gate signals
//! - **Brief**: needs attention / FYI / handled, with a one-line summary
//! - **Coverage**: how much of the user's work the connected tools can see
//!
//! ## Key Components
//!
//! - [`Pipeline`]: wires every stage together
//! - [`Config`]: TOML user configuration
//! - [`SignalSource`]: trait for provider fetchers

pub mod brief;
pub mod classify;
pub mod config;
pub mod coverage;
pub mod decision;
pub mod diagnostics;
pub mod error;
pub mod gather;
pub mod integrations;
pub mod mode;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod scoring;

pub use brief::{compile_brief, Brief, BriefCandidate, BriefCompiler, BriefCounts, BriefEntry, SummaryRenderer};
pub use classify::{classify, MatcherKind, MessageClassifier, SignalClassifier, SignalFlags};
pub use config::Config;
pub use coverage::{assess_coverage, CoverageAssessment, CoverageAssessor, CoverageLevel, ToolCatalog};
pub use decision::{decide, SurfaceVerdict};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, TracingSink};
pub use error::{ConfigError, CoreError, Result};
pub use gather::{gather, FetchConfig};
pub use integrations::{FetchLimits, FileSource, ProviderPayload, SignalSource};
pub use mode::{filter_by_mode, IntentMode, ModePolicy};
pub use model::{CanonicalItem, ProviderKind, SignalCategory, SignalType, UnifiedSignal};
pub use normalize::{normalize, FetchOutcome, Normalizer, RawBatch};
pub use pipeline::{AssessedItem, Pipeline, PipelineReport};
pub use scoring::{score, ImportanceScorer, ScoreBreakdown};
