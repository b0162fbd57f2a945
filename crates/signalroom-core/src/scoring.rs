//! Importance scoring engine.
//!
//! Produces an advisory 0-100 urgency score from additive contributions.
//! The score is context for the UI; whether an item interrupts the user is
//! decided separately by [`crate::decision`].
//!
//! | Contribution | Condition                         | Points                     |
//! |--------------|-----------------------------------|----------------------------|
//! | due_date     | overdue by N days                 | min(40 + 2N, 60)           |
//! |              | due today / tomorrow / within 3d  | 35 / 28 / 15               |
//! | staleness    | idle >= 7 / >= 5 / >= 3 days      | 25 / 20 / 15 (one bracket) |
//! | dependency   | dependency flag                   | 15                         |
//! | escalation   | escalation flag                   | 20                         |
//!
//! The sum is clamped to 100.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::{classify, SignalFlags};
use crate::model::CanonicalItem;

pub const MAX_SCORE: u8 = 100;

const OVERDUE_BASE: i64 = 40;
const OVERDUE_PER_DAY: i64 = 2;
const OVERDUE_CAP: i64 = 60;
const DUE_TODAY: u8 = 35;
const DUE_TOMORROW: u8 = 28;
const DUE_SOON: u8 = 15;
const DUE_SOON_DAYS: i64 = 3;

/// Staleness brackets, most severe first.
const STALENESS_BRACKETS: [(i64, u8); 3] = [(7, 25), (5, 20), (3, 15)];

const DEPENDENCY_POINTS: u8 = 15;
const ESCALATION_POINTS: u8 = 20;

/// Individual scoring contribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTerm {
    /// Term name
    pub name: String,
    /// Points added by this term
    pub points: u8,
}

/// Complete scoring breakdown for explainability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Non-zero contributions in evaluation order
    pub terms: Vec<ScoreTerm>,
    /// Clamped total (0 to 100)
    pub total: u8,
}

impl ScoreBreakdown {
    fn from_terms(terms: Vec<ScoreTerm>) -> Self {
        let sum: u32 = terms.iter().map(|t| u32::from(t.points)).sum();
        Self {
            total: sum.min(u32::from(MAX_SCORE)) as u8,
            terms,
        }
    }

    /// Points contributed by the named term (0 when absent).
    pub fn points(&self, name: &str) -> u8 {
        self.terms
            .iter()
            .find(|t| t.name == name)
            .map_or(0, |t| t.points)
    }

    /// Get the top contributing term
    pub fn top_term(&self) -> Option<&ScoreTerm> {
        self.terms.iter().max_by_key(|t| t.points)
    }
}

/// Deterministic importance scorer.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImportanceScorer;

impl ImportanceScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score `item` given its already computed flags.
    pub fn score(&self, item: &CanonicalItem, flags: &SignalFlags, now: DateTime<Utc>) -> ScoreBreakdown {
        let mut terms = Vec::new();

        let due = self.due_date_points(item, now);
        if due > 0 {
            terms.push(ScoreTerm { name: "due_date".into(), points: due });
        }

        let stale = self.staleness_points(item, now);
        if stale > 0 {
            terms.push(ScoreTerm { name: "staleness".into(), points: stale });
        }

        if flags.has_dependency {
            terms.push(ScoreTerm { name: "dependency".into(), points: DEPENDENCY_POINTS });
        }

        if flags.has_escalation {
            terms.push(ScoreTerm { name: "escalation".into(), points: ESCALATION_POINTS });
        }

        ScoreBreakdown::from_terms(terms)
    }

    fn due_date_points(&self, item: &CanonicalItem, now: DateTime<Utc>) -> u8 {
        let Some(days) = item.days_until_due(now.date_naive()) else {
            return 0; // No due date
        };

        match days {
            d if d < 0 => {
                let overdue = d.saturating_neg();
                OVERDUE_BASE
                    .saturating_add(overdue.saturating_mul(OVERDUE_PER_DAY))
                    .min(OVERDUE_CAP) as u8
            }
            0 => DUE_TODAY,
            1 => DUE_TOMORROW,
            d if d <= DUE_SOON_DAYS => DUE_SOON,
            _ => 0,
        }
    }

    fn staleness_points(&self, item: &CanonicalItem, now: DateTime<Utc>) -> u8 {
        let Some(idle) = item.days_since_activity(now) else {
            return 0;
        };

        STALENESS_BRACKETS
            .iter()
            .find(|(min_days, _)| idle >= *min_days)
            .map_or(0, |(_, points)| *points)
    }
}

/// Score an item, classifying it with the default classifier first.
pub fn score(item: &CanonicalItem, now: DateTime<Utc>) -> u8 {
    let flags = classify(item, now);
    ImportanceScorer::new().score(item, &flags, now).total
}
