//! Surface decision engine.
//!
//! The policy is an ordered table of (predicate, verdict) rows evaluated top
//! to bottom; the first row whose predicate holds produces the verdict.
//! Positive rows come first so that a shipped milestone which also mentions
//! "urgent" is celebrated rather than flagged.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classify::SignalFlags;
use crate::model::{SignalCategory, SignalType};

/// Outcome of the decision engine for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceVerdict {
    pub surface: bool,
    pub reason: Option<String>,
    /// 0.0 to 1.0
    pub confidence: f64,
    pub signal_type: SignalType,
    /// Category used when the item joins the signal stream.
    pub category: Option<SignalCategory>,
}

impl SurfaceVerdict {
    /// Verdict for items no rule cares about.
    pub fn suppressed() -> Self {
        Self {
            surface: false,
            reason: None,
            confidence: 0.0,
            signal_type: SignalType::Neutral,
            category: None,
        }
    }
}

/// One row of the decision policy.
#[derive(Clone, Copy)]
pub struct DecisionRule {
    pub name: &'static str,
    pub applies: fn(&SignalFlags) -> bool,
    pub signal_type: SignalType,
    pub confidence: f64,
    pub reason: &'static str,
    pub category: SignalCategory,
}

impl fmt::Debug for DecisionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionRule")
            .field("name", &self.name)
            .field("signal_type", &self.signal_type)
            .field("confidence", &self.confidence)
            .field("category", &self.category)
            .finish()
    }
}

impl DecisionRule {
    fn verdict(&self) -> SurfaceVerdict {
        SurfaceVerdict {
            surface: true,
            reason: Some(self.reason.to_string()),
            confidence: self.confidence,
            signal_type: self.signal_type,
            category: Some(self.category),
        }
    }
}

fn milestone(f: &SignalFlags) -> bool {
    f.has_milestone
}

fn appreciation(f: &SignalFlags) -> bool {
    f.has_appreciation
}

fn positive_feedback(f: &SignalFlags) -> bool {
    f.has_positive_feedback
}

fn escalation(f: &SignalFlags) -> bool {
    f.has_escalation
}

fn stalled_deadline(f: &SignalFlags) -> bool {
    f.has_commitment && f.has_time_pressure && f.has_movement_gap
}

fn blocked_deadline(f: &SignalFlags) -> bool {
    f.has_commitment && f.has_time_pressure && f.has_dependency
}

/// The decision policy, highest priority first. Anything that matches no row
/// is suppressed.
pub static DECISION_POLICY: [DecisionRule; 6] = [
    DecisionRule {
        name: "milestone",
        applies: milestone,
        signal_type: SignalType::Positive,
        confidence: 0.90,
        reason: "milestone achieved",
        category: SignalCategory::Update,
    },
    DecisionRule {
        name: "appreciation",
        applies: appreciation,
        signal_type: SignalType::Positive,
        confidence: 0.85,
        reason: "team appreciation",
        category: SignalCategory::Update,
    },
    DecisionRule {
        name: "positive_feedback",
        applies: positive_feedback,
        signal_type: SignalType::Positive,
        confidence: 0.80,
        reason: "positive feedback",
        category: SignalCategory::Update,
    },
    DecisionRule {
        name: "escalation",
        applies: escalation,
        signal_type: SignalType::Problem,
        confidence: 0.95,
        reason: "escalation detected",
        category: SignalCategory::Escalation,
    },
    DecisionRule {
        name: "stalled_deadline",
        applies: stalled_deadline,
        signal_type: SignalType::Problem,
        confidence: 0.85,
        reason: "deadline approaching with no activity",
        category: SignalCategory::Deadline,
    },
    DecisionRule {
        name: "blocked_deadline",
        applies: blocked_deadline,
        signal_type: SignalType::Problem,
        confidence: 0.85,
        reason: "deadline approaching with dependency",
        category: SignalCategory::Blocker,
    },
];

/// The first rule that applies to `flags`, if any.
pub fn matching_rule(flags: &SignalFlags) -> Option<&'static DecisionRule> {
    DECISION_POLICY.iter().find(|rule| (rule.applies)(flags))
}

/// Decide whether an item with `flags` should surface.
pub fn decide(flags: &SignalFlags) -> SurfaceVerdict {
    matching_rule(flags).map_or_else(SurfaceVerdict::suppressed, DecisionRule::verdict)
}
