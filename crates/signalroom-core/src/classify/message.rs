//! Category assignment for chat messages.
//!
//! Messages do not carry owners or due dates, so instead of composing flags
//! the classifier walks an ordered rule list and the first match decides the
//! category. Mentions and direct messages raise confidence but never change
//! the category.

use serde_json::json;

use super::keywords::{
    Keyword, KeywordMatcher, KeywordSet, SubstringMatcher, MESSAGE_BLOCKER, MESSAGE_BROADCAST,
    MESSAGE_COMMITMENT, MESSAGE_DEADLINE, MESSAGE_DECISION, MESSAGE_ESCALATION,
};
use crate::model::{CanonicalItem, SignalCategory, SignalType, UnifiedSignal};

const MENTION_BOOST: f64 = 0.10;
const DIRECT_BOOST: f64 = 0.05;
const MAX_CONFIDENCE: f64 = 0.99;

/// What triggers a message rule.
#[derive(Debug, Clone, Copy)]
pub enum MessageTrigger {
    /// Any keyword from the set
    Keywords(&'static KeywordSet),
    /// The user's handle or a broadcast mention
    Mention,
    /// A question mark anywhere in the body
    Question,
}

/// One row of the message policy.
#[derive(Debug, Clone, Copy)]
pub struct MessageRule {
    pub category: SignalCategory,
    pub trigger: MessageTrigger,
    pub base_confidence: f64,
}

/// Evaluated top to bottom; the first rule that fires wins.
pub static MESSAGE_POLICY: [MessageRule; 7] = [
    MessageRule {
        category: SignalCategory::Escalation,
        trigger: MessageTrigger::Keywords(&MESSAGE_ESCALATION),
        base_confidence: 0.90,
    },
    MessageRule {
        category: SignalCategory::Blocker,
        trigger: MessageTrigger::Keywords(&MESSAGE_BLOCKER),
        base_confidence: 0.85,
    },
    MessageRule {
        category: SignalCategory::Decision,
        trigger: MessageTrigger::Keywords(&MESSAGE_DECISION),
        base_confidence: 0.80,
    },
    MessageRule {
        category: SignalCategory::Deadline,
        trigger: MessageTrigger::Keywords(&MESSAGE_DEADLINE),
        base_confidence: 0.75,
    },
    MessageRule {
        category: SignalCategory::Mention,
        trigger: MessageTrigger::Mention,
        base_confidence: 0.75,
    },
    MessageRule {
        category: SignalCategory::Commitment,
        trigger: MessageTrigger::Keywords(&MESSAGE_COMMITMENT),
        base_confidence: 0.70,
    },
    MessageRule {
        category: SignalCategory::Question,
        trigger: MessageTrigger::Question,
        base_confidence: 0.65,
    },
];

/// Fallback when no rule fires.
pub const UPDATE_CONFIDENCE: f64 = 0.50;

/// Assigns one category and one confidence per chat message.
pub struct MessageClassifier {
    matcher: Box<dyn KeywordMatcher>,
    /// Lower-cased handles that count as mentioning the user.
    handles: Vec<String>,
}

impl MessageClassifier {
    pub fn new() -> Self {
        Self {
            matcher: Box::new(SubstringMatcher),
            handles: Vec::new(),
        }
    }

    pub fn with_matcher(mut self, matcher: Box<dyn KeywordMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Handles such as `@dana` or a Slack `<@U024BE7LH>` token.
    pub fn with_handles<I, S>(mut self, handles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.handles = handles
            .into_iter()
            .map(|h| h.as_ref().trim().to_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        self
    }

    fn mentions_user(&self, body: &str) -> bool {
        self.handles.iter().any(|h| self.matcher.contains_text(body, h))
    }

    fn is_mention(&self, body: &str) -> bool {
        self.mentions_user(body) || self.matcher.any(body, &MESSAGE_BROADCAST)
    }

    fn fires(&self, rule: &MessageRule, body: &str) -> Option<String> {
        match rule.trigger {
            MessageTrigger::Keywords(set) => self
                .matcher
                .find_any(body, set)
                .map(|kw: Keyword| kw.to_string()),
            MessageTrigger::Mention => self.is_mention(body).then(|| "mention".to_string()),
            MessageTrigger::Question => body.contains('?').then(|| "question_mark".to_string()),
        }
    }

    /// Classify a chat item into a signal.
    pub fn classify(&self, item: &CanonicalItem) -> UnifiedSignal {
        let body = item.body_lower();
        let mentioned = self.mentions_user(&body);

        let hit = MESSAGE_POLICY
            .iter()
            .find_map(|rule| self.fires(rule, &body).map(|matched| (rule, matched)));

        let (category, base, matched) = match hit {
            Some((rule, matched)) => (rule.category, rule.base_confidence, Some(matched)),
            None => (SignalCategory::Update, UPDATE_CONFIDENCE, None),
        };

        let mut confidence = base;
        if mentioned && category != SignalCategory::Mention {
            confidence += MENTION_BOOST;
        }
        if item.is_direct {
            confidence += DIRECT_BOOST;
        }
        let confidence = confidence.min(MAX_CONFIDENCE);

        let signal_type = if category == SignalCategory::Update {
            SignalType::Neutral
        } else {
            SignalType::Problem
        };

        UnifiedSignal::from_item(item, category, confidence, signal_type)
            .with_metadata("mentioned", json!(mentioned))
            .with_metadata("direct", json!(item.is_direct))
            .with_metadata("matched", json!(matched))
    }
}

impl Default for MessageClassifier {
    fn default() -> Self {
        Self::new()
    }
}
