//! Intent modes and the filter they drive.
//!
//! Each mode is a small table of `(categories, minimum confidence)` rules. A
//! signal passes when any rule of the active mode admits it. The filter is a
//! pure predicate: it never touches a signal's category or confidence.
//!
//! | Mode      | Categories                               | Min conf |
//! |-----------|------------------------------------------|----------|
//! | calm      | blocker, decision, escalation            | 0.80     |
//! | on_the_go | blocker, decision, escalation            | 0.70     |
//! |           | mention, deadline                        | 0.75     |
//! | focus     | blocker, deadline, escalation            | 0.70     |
//! | work      | blocker, decision, escalation            | 0.60     |
//! |           | mention, question, commitment, deadline  | 0.65     |
//! |           | update                                   | 0.70     |
//!
//! calm ⊆ on_the_go ⊆ work holds for any signal set because each step only
//! adds categories or lowers thresholds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::model::{SignalCategory, UnifiedSignal};

use SignalCategory::*;

/// How much the user wants to be interrupted right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentMode {
    /// Vacation: only work-derailing items
    Calm,
    /// Commuting: derailing items plus direct asks
    OnTheGo,
    /// Standard working day
    #[default]
    Work,
    /// Deep work: only items that would derail the session
    Focus,
}

impl IntentMode {
    pub const ALL: [IntentMode; 4] = [Self::Calm, Self::OnTheGo, Self::Work, Self::Focus];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::OnTheGo => "on_the_go",
            Self::Work => "work",
            Self::Focus => "focus",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Calm => "Vacation: only blockers, decisions and escalations you are confident about",
            Self::OnTheGo => "Commute: urgent items plus mentions and deadlines",
            Self::Work => "Standard day: everything actionable, FYI only when confident",
            Self::Focus => "Deep work: only blockers, deadlines and escalations",
        }
    }

    /// The policy table for this mode.
    pub fn policy(&self) -> &'static ModePolicy {
        match self {
            Self::Calm => &CALM_POLICY,
            Self::OnTheGo => &ON_THE_GO_POLICY,
            Self::Work => &WORK_POLICY,
            Self::Focus => &FOCUS_POLICY,
        }
    }
}

impl fmt::Display for IntentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "calm" => Ok(Self::Calm),
            "on_the_go" | "on-the-go" => Ok(Self::OnTheGo),
            "work" => Ok(Self::Work),
            "focus" => Ok(Self::Focus),
            _ => Err(CoreError::InvalidMode {
                value: s.to_string(),
            }),
        }
    }
}

/// Admits signals in `categories` with at least `min_confidence`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ThresholdRule {
    pub categories: &'static [SignalCategory],
    pub min_confidence: f64,
}

impl ThresholdRule {
    pub fn admits(&self, signal: &UnifiedSignal) -> bool {
        self.categories.contains(&signal.category) && signal.confidence >= self.min_confidence
    }
}

/// All rules of one mode.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModePolicy {
    pub mode: IntentMode,
    pub rules: &'static [ThresholdRule],
}

impl ModePolicy {
    pub fn admits(&self, signal: &UnifiedSignal) -> bool {
        self.rules.iter().any(|rule| rule.admits(signal))
    }

    /// Lowest confidence that lets `category` through, or `None` when the
    /// mode never admits it.
    pub fn threshold_for(&self, category: SignalCategory) -> Option<f64> {
        self.rules
            .iter()
            .filter(|rule| rule.categories.contains(&category))
            .map(|rule| rule.min_confidence)
            .reduce(f64::min)
    }
}

pub static CALM_POLICY: ModePolicy = ModePolicy {
    mode: IntentMode::Calm,
    rules: &[ThresholdRule {
        categories: &[Blocker, Decision, Escalation],
        min_confidence: 0.80,
    }],
};

pub static ON_THE_GO_POLICY: ModePolicy = ModePolicy {
    mode: IntentMode::OnTheGo,
    rules: &[
        ThresholdRule {
            categories: &[Blocker, Decision, Escalation],
            min_confidence: 0.70,
        },
        ThresholdRule {
            categories: &[Mention, Deadline],
            min_confidence: 0.75,
        },
    ],
};

pub static FOCUS_POLICY: ModePolicy = ModePolicy {
    mode: IntentMode::Focus,
    rules: &[ThresholdRule {
        categories: &[Blocker, Deadline, Escalation],
        min_confidence: 0.70,
    }],
};

pub static WORK_POLICY: ModePolicy = ModePolicy {
    mode: IntentMode::Work,
    rules: &[
        ThresholdRule {
            categories: &[Blocker, Decision, Escalation],
            min_confidence: 0.60,
        },
        ThresholdRule {
            categories: &[Mention, Question, Commitment, Deadline],
            min_confidence: 0.65,
        },
        ThresholdRule {
            categories: &[Update],
            min_confidence: 0.70,
        },
    ],
};

/// Keep the signals the active mode admits, preserving order.
pub fn filter_by_mode(signals: &[UnifiedSignal], mode: IntentMode) -> Vec<UnifiedSignal> {
    let policy = mode.policy();
    let kept: Vec<UnifiedSignal> = signals
        .iter()
        .filter(|signal| policy.admits(signal))
        .cloned()
        .collect();
    tracing::debug!(
        mode = %mode,
        input = signals.len(),
        kept = kept.len(),
        "mode filter applied"
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CanonicalItem, ProviderKind, SignalType};

    fn signal(category: SignalCategory, confidence: f64) -> UnifiedSignal {
        let item = CanonicalItem::new(ProviderKind::ChatMessage, "slack", "slack:x", "text");
        UnifiedSignal::from_item(&item, category, confidence, SignalType::Problem)
    }

    #[test]
    fn work_mode_update_needs_higher_bar_than_blocker() {
        let update = signal(Update, 0.65);
        let blocker = signal(Blocker, 0.65);
        let kept = filter_by_mode(&[update, blocker.clone()], IntentMode::Work);
        assert_eq!(kept, vec![blocker]);
    }

    #[test]
    fn calm_mode_only_admits_derailers_above_080() {
        let policy = IntentMode::Calm.policy();
        assert!(policy.admits(&signal(Escalation, 0.80)));
        assert!(!policy.admits(&signal(Escalation, 0.79)));
        assert!(!policy.admits(&signal(Mention, 0.99)));
        assert!(!policy.admits(&signal(Deadline, 0.99)));
    }

    #[test]
    fn on_the_go_admits_mentions_and_deadlines_at_075() {
        let policy = IntentMode::OnTheGo.policy();
        assert!(policy.admits(&signal(Mention, 0.75)));
        assert!(!policy.admits(&signal(Mention, 0.74)));
        assert!(policy.admits(&signal(Decision, 0.70)));
        assert!(!policy.admits(&signal(Question, 0.99)));
    }

    #[test]
    fn focus_excludes_decisions_and_mentions() {
        let policy = IntentMode::Focus.policy();
        assert!(!policy.admits(&signal(Decision, 0.99)));
        assert!(!policy.admits(&signal(Mention, 0.99)));
        assert!(policy.admits(&signal(Deadline, 0.70)));
    }

    #[test]
    fn filter_never_mutates_signals() {
        let input = vec![signal(Blocker, 0.91), signal(Deadline, 0.66)];
        let kept = filter_by_mode(&input, IntentMode::Work);
        assert_eq!(kept, input);
    }

    #[test]
    fn threshold_for_reports_lowest_bar() {
        assert_eq!(IntentMode::Work.policy().threshold_for(Update), Some(0.70));
        assert_eq!(IntentMode::Calm.policy().threshold_for(Mention), None);
        assert_eq!(IntentMode::OnTheGo.policy().threshold_for(Deadline), Some(0.75));
    }

    #[test]
    fn parse_modes() {
        assert_eq!("calm".parse::<IntentMode>().unwrap(), IntentMode::Calm);
        assert_eq!("On-The-Go".parse::<IntentMode>().unwrap(), IntentMode::OnTheGo);
        assert_eq!(" focus ".parse::<IntentMode>().unwrap(), IntentMode::Focus);
        let err = "vacation".parse::<IntentMode>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidMode { ref value } if value == "vacation"));
    }

    #[test]
    fn mode_round_trips_through_serde() {
        let json = serde_json::to_string(&IntentMode::OnTheGo).unwrap();
        assert_eq!(json, "\"on_the_go\"");
        assert!(serde_json::from_str::<IntentMode>("\"weekend\"").is_err());
    }

    #[test]
    fn policies_match_their_mode() {
        for mode in IntentMode::ALL {
            assert_eq!(mode.policy().mode, mode);
        }
    }
}
