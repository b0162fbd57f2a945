//! Unified signal shape shared by the chat path and surfaced task items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::item::CanonicalItem;
use crate::decision::SurfaceVerdict;

const SNIPPET_MAX_CHARS: usize = 140;

/// What a signal asks of the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalCategory {
    Commitment,
    Deadline,
    Mention,
    Question,
    Blocker,
    Decision,
    Escalation,
    Update,
}

impl SignalCategory {
    pub const ALL: [SignalCategory; 8] = [
        Self::Commitment,
        Self::Deadline,
        Self::Mention,
        Self::Question,
        Self::Blocker,
        Self::Decision,
        Self::Escalation,
        Self::Update,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commitment => "commitment",
            Self::Deadline => "deadline",
            Self::Mention => "mention",
            Self::Question => "question",
            Self::Blocker => "blocker",
            Self::Decision => "decision",
            Self::Escalation => "escalation",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for SignalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tone of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    Problem,
    Positive,
    Neutral,
}

/// A classified candidate for surfacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedSignal {
    /// `"{source}:{source_id}"`
    pub id: String,
    pub source: String,
    pub source_id: String,
    pub channel: Option<String>,
    pub sender: Option<String>,
    pub snippet: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub category: SignalCategory,
    /// 0.0 to 1.0
    pub confidence: f64,
    pub signal_type: SignalType,
    pub url: Option<String>,
    #[serde(default = "empty_metadata")]
    pub metadata: serde_json::Value,
}

fn empty_metadata() -> serde_json::Value {
    serde_json::json!({})
}

impl UnifiedSignal {
    /// Build a signal for `item` with the given classification.
    pub fn from_item(
        item: &CanonicalItem,
        category: SignalCategory,
        confidence: f64,
        signal_type: SignalType,
    ) -> Self {
        let body = match &item.description {
            Some(desc) if !desc.trim().is_empty() => desc.as_str(),
            _ => item.title.as_str(),
        };
        let source_id = item.source_id();
        Self {
            id: item.signal_id(),
            source: item.source.clone(),
            source_id: source_id.to_string(),
            channel: item.channel_or_project.clone(),
            sender: item.owner_name.clone(),
            snippet: snippet(body),
            timestamp: item.last_activity_at,
            category,
            confidence: confidence.clamp(0.0, 1.0),
            signal_type,
            url: item.url.clone(),
            metadata: empty_metadata(),
        }
    }

    /// Project a surfaced task onto the signal shape so it can go through
    /// the mode filter. Returns `None` for items that do not surface.
    pub fn from_task(item: &CanonicalItem, verdict: &SurfaceVerdict) -> Option<Self> {
        if !verdict.surface {
            return None;
        }
        let category = verdict.category?;
        let mut signal = Self::from_item(item, category, verdict.confidence, verdict.signal_type);
        signal.snippet = snippet(&item.title);
        if let Some(reason) = &verdict.reason {
            signal.metadata = serde_json::json!({ "reason": reason });
        }
        Some(signal)
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: &str, value: serde_json::Value) -> Self {
        if let Some(obj) = self.metadata.as_object_mut() {
            obj.insert(key.to_string(), value);
        }
        self
    }
}

fn snippet(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= SNIPPET_MAX_CHARS {
        return collapsed;
    }
    let mut out: String = collapsed.chars().take(SNIPPET_MAX_CHARS - 3).collect();
    out.push_str("...");
    out
}
