//! Keyword lists and the matchers that scan text for them.
//!
//! All lists are lower-case; callers lower-case the haystack once.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, CoreError};

/// A single keyword. Prefix keywords (`escalat*`) match any continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keyword {
    pub text: &'static str,
    pub prefix: bool,
}

impl Keyword {
    pub const fn exact(text: &'static str) -> Self {
        Self { text, prefix: false }
    }

    pub const fn prefix(text: &'static str) -> Self {
        Self { text, prefix: true }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix {
            write!(f, "{}*", self.text)
        } else {
            f.write_str(self.text)
        }
    }
}

/// Named keyword list.
#[derive(Debug, Clone, Copy)]
pub struct KeywordSet {
    pub name: &'static str,
    pub keywords: &'static [Keyword],
}

pub const BLOCKING: KeywordSet = KeywordSet {
    name: "blocking",
    keywords: &[
        Keyword::exact("blocked"),
        Keyword::exact("waiting"),
        Keyword::exact("pending"),
        Keyword::exact("on hold"),
        Keyword::exact("depends"),
        Keyword::exact("stuck"),
    ],
};

pub const ESCALATION: KeywordSet = KeywordSet {
    name: "escalation",
    keywords: &[
        Keyword::exact("urgent"),
        Keyword::exact("asap"),
        Keyword::exact("critical"),
        Keyword::prefix("escalat"),
        Keyword::exact("emergency"),
        Keyword::exact("blocker"),
        Keyword::exact("p0"),
        Keyword::exact("p1"),
    ],
};

pub const APPRECIATION: KeywordSet = KeywordSet {
    name: "appreciation",
    keywords: &[
        Keyword::exact("thank you"),
        Keyword::exact("thanks"),
        Keyword::exact("kudos"),
        Keyword::exact("shoutout"),
        Keyword::exact("shout-out"),
        Keyword::exact("great job"),
        Keyword::exact("great work"),
        Keyword::exact("nice work"),
        Keyword::exact("well done"),
        Keyword::exact("appreciate"),
        Keyword::exact("props to"),
    ],
};

pub const MILESTONE: KeywordSet = KeywordSet {
    name: "milestone",
    keywords: &[
        Keyword::exact("shipped"),
        Keyword::exact("launched"),
        Keyword::exact("released"),
        Keyword::exact("completed"),
        Keyword::exact("went live"),
        Keyword::exact("go-live"),
        Keyword::exact("milestone"),
        Keyword::exact("deployed to production"),
        Keyword::exact("delivered"),
    ],
};

pub const POSITIVE_FEEDBACK: KeywordSet = KeywordSet {
    name: "positive_feedback",
    keywords: &[
        Keyword::exact("love this"),
        Keyword::exact("looks great"),
        Keyword::exact("looks good"),
        Keyword::exact("lgtm"),
        Keyword::exact("awesome"),
        Keyword::exact("amazing"),
        Keyword::exact("fantastic"),
        Keyword::exact("excellent"),
        Keyword::exact("impressive"),
    ],
};

// Chat-path lists. Escalation differs from the task list: "blocker" is its
// own category in chat.

pub const MESSAGE_ESCALATION: KeywordSet = KeywordSet {
    name: "message_escalation",
    keywords: &[
        Keyword::exact("urgent"),
        Keyword::exact("asap"),
        Keyword::exact("critical"),
        Keyword::prefix("escalat"),
        Keyword::exact("emergency"),
        Keyword::exact("p0"),
        Keyword::exact("sev1"),
        Keyword::exact("outage"),
    ],
};

pub const MESSAGE_BLOCKER: KeywordSet = KeywordSet {
    name: "message_blocker",
    keywords: &[
        Keyword::exact("blocked"),
        Keyword::exact("blocker"),
        Keyword::exact("stuck"),
        Keyword::exact("waiting on"),
        Keyword::exact("can't proceed"),
        Keyword::exact("cannot proceed"),
        Keyword::exact("on hold"),
    ],
};

pub const MESSAGE_DECISION: KeywordSet = KeywordSet {
    name: "message_decision",
    keywords: &[
        Keyword::exact("decide"),
        Keyword::exact("decision"),
        Keyword::exact("approve"),
        Keyword::exact("approval"),
        Keyword::exact("sign off"),
        Keyword::exact("sign-off"),
        Keyword::exact("go/no-go"),
        Keyword::exact("which option"),
    ],
};

pub const MESSAGE_DEADLINE: KeywordSet = KeywordSet {
    name: "message_deadline",
    keywords: &[
        Keyword::exact("deadline"),
        Keyword::exact("due"),
        Keyword::exact("eod"),
        Keyword::exact("end of day"),
        Keyword::exact("by tomorrow"),
        Keyword::exact("by monday"),
        Keyword::exact("by tuesday"),
        Keyword::exact("by wednesday"),
        Keyword::exact("by thursday"),
        Keyword::exact("by friday"),
        Keyword::exact("tonight"),
    ],
};

pub const MESSAGE_BROADCAST: KeywordSet = KeywordSet {
    name: "message_broadcast",
    keywords: &[Keyword::exact("@here"), Keyword::exact("@channel")],
};

pub const MESSAGE_COMMITMENT: KeywordSet = KeywordSet {
    name: "message_commitment",
    keywords: &[
        Keyword::exact("i will"),
        Keyword::exact("i'll"),
        Keyword::exact("will send"),
        Keyword::exact("will share"),
        Keyword::exact("promise"),
        Keyword::exact("on it"),
    ],
};

/// Strategy for deciding whether a keyword occurs in a haystack.
///
/// The haystack is already lower-cased.
pub trait KeywordMatcher: Send + Sync {
    fn contains(&self, haystack: &str, keyword: &Keyword) -> bool;

    /// Whole-term match for text known only at runtime, such as a chat
    /// handle. `text` must already be lower-cased.
    fn contains_text(&self, haystack: &str, text: &str) -> bool;

    /// First keyword of `set` found in `haystack`.
    fn find_any(&self, haystack: &str, set: &KeywordSet) -> Option<Keyword> {
        set.keywords
            .iter()
            .copied()
            .find(|kw| self.contains(haystack, kw))
    }

    fn any(&self, haystack: &str, set: &KeywordSet) -> bool {
        self.find_any(haystack, set).is_some()
    }
}

/// Plain substring containment. "asap" matches inside "asappointment".
#[derive(Debug, Default, Clone, Copy)]
pub struct SubstringMatcher;

impl KeywordMatcher for SubstringMatcher {
    fn contains(&self, haystack: &str, keyword: &Keyword) -> bool {
        haystack.contains(keyword.text)
    }

    fn contains_text(&self, haystack: &str, text: &str) -> bool {
        haystack.contains(text)
    }
}

/// Requires the keyword to start on a word boundary and, unless it is a
/// prefix keyword, to end on one.
#[derive(Debug, Default, Clone, Copy)]
pub struct WordBoundaryMatcher;

impl KeywordMatcher for WordBoundaryMatcher {
    fn contains(&self, haystack: &str, keyword: &Keyword) -> bool {
        bounded_matches(haystack, keyword.text, keyword.prefix).next().is_some()
    }

    fn contains_text(&self, haystack: &str, text: &str) -> bool {
        bounded_matches(haystack, text, false).next().is_some()
    }
}

/// Byte offsets of every occurrence of `text` in `haystack` that starts on a
/// word boundary and, unless `prefix` is set, ends on one. An edge of `text`
/// that is already punctuation (`@dan`, `<@U024BE7LH>`) needs no boundary.
pub fn bounded_matches<'h>(haystack: &'h str, text: &'h str, prefix: bool) -> impl Iterator<Item = usize> + 'h {
    let open_start = text.chars().next().map_or(false, |c| !c.is_alphanumeric());
    let open_end = prefix || text.chars().next_back().map_or(false, |c| !c.is_alphanumeric());
    haystack.match_indices(text).filter_map(move |(start, found)| {
        let before_ok = open_start
            || haystack[..start]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = open_end
            || haystack[start + found.len()..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric());
        (before_ok && after_ok).then_some(start)
    })
}

/// Matcher selection as it appears in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherKind {
    #[default]
    Substring,
    WordBoundary,
}

impl MatcherKind {
    pub fn build(self) -> Box<dyn KeywordMatcher> {
        match self {
            MatcherKind::Substring => Box::new(SubstringMatcher),
            MatcherKind::WordBoundary => Box::new(WordBoundaryMatcher),
        }
    }
}

impl FromStr for MatcherKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "word_boundary" | "word-boundary" => Ok(Self::WordBoundary),
            other => Err(ConfigError::InvalidValue {
                key: "classifier.matcher".to_string(),
                message: format!("unknown matcher '{other}'"),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_matcher_keeps_known_false_positive() {
        assert!(SubstringMatcher.any("book asappointment", &ESCALATION));
    }

    #[test]
    fn word_boundary_matcher_rejects_embedded_keyword() {
        assert!(!WordBoundaryMatcher.any("book asappointment", &ESCALATION));
        assert!(WordBoundaryMatcher.any("need this asap!", &ESCALATION));
    }

    #[test]
    fn prefix_keyword_matches_continuations() {
        for text in ["please escalate", "escalation path", "escalated twice"] {
            assert!(SubstringMatcher.any(text, &ESCALATION), "{text}");
            assert!(WordBoundaryMatcher.any(text, &ESCALATION), "{text}");
        }
        assert!(!WordBoundaryMatcher.any("deescalated", &ESCALATION));
    }

    #[test]
    fn word_boundary_checks_every_occurrence() {
        // First hit is embedded, second stands alone.
        assert!(WordBoundaryMatcher.contains("stuckey is stuck", &Keyword::exact("stuck")));
    }

    #[test]
    fn handles_follow_the_matcher() {
        assert!(SubstringMatcher.contains_text("ping @dana", "@dan"));
        assert!(!WordBoundaryMatcher.contains_text("ping @dana", "@dan"));
        assert!(WordBoundaryMatcher.contains_text("thanks @dan!", "@dan"));
        assert!(WordBoundaryMatcher.contains_text("<@u024be7lh>please look", "<@u024be7lh>"));
    }

    #[test]
    fn bounded_matches_yields_offsets() {
        let hits: Vec<_> = bounded_matches("done, undone, done", "done", false).collect();
        assert_eq!(hits, vec![0, 14]);
    }

    #[test]
    fn find_any_reports_first_keyword_in_list_order() {
        let hit = SubstringMatcher.find_any("critical and urgent", &ESCALATION);
        assert_eq!(hit, Some(Keyword::exact("urgent")));
    }

    #[test]
    fn positive_lists_are_disjoint() {
        let lists = [APPRECIATION, MILESTONE, POSITIVE_FEEDBACK];
        for (i, a) in lists.iter().enumerate() {
            for b in lists.iter().skip(i + 1) {
                for kw in a.keywords {
                    assert!(
                        !b.keywords.iter().any(|other| other.text == kw.text),
                        "{} appears in both {} and {}",
                        kw,
                        a.name,
                        b.name
                    );
                }
            }
        }
    }

    #[test]
    fn matcher_kind_parses_both_spellings() {
        assert_eq!("word-boundary".parse::<MatcherKind>().unwrap(), MatcherKind::WordBoundary);
        assert_eq!("Substring".parse::<MatcherKind>().unwrap(), MatcherKind::Substring);
        assert!("regex".parse::<MatcherKind>().is_err());
    }
}
