//! Canonical item types and utilities.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Kind of record a provider contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    ChatMessage,
    Task,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChatMessage => "chat_message",
            Self::Task => "task",
        }
    }
}

/// Provider-agnostic work item or message.
///
/// Built once per ingestion cycle by the provider adapters and never mutated
/// afterwards; every pipeline stage borrows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalItem {
    pub provider: ProviderKind,
    /// Tool the record came from (e.g. "slack", "linear").
    pub source: String,
    /// Unique per provider kind; adapters prefix it with the tool name.
    pub external_id: String,
    pub title: String,
    pub description: Option<String>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub due_date: Option<NaiveDate>,
    /// Always lower-cased.
    #[serde(default)]
    pub status: String,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub channel_or_project: Option<String>,
    pub url: Option<String>,
    /// Thread history, oldest first.
    #[serde(default)]
    pub comments_text: Vec<String>,
    #[serde(default)]
    pub is_direct: bool,
}

impl CanonicalItem {
    /// Create a new item with only the identifying fields set.
    pub fn new(
        provider: ProviderKind,
        source: impl Into<String>,
        external_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            source: source.into(),
            external_id: external_id.into(),
            title: title.into(),
            description: None,
            owner_name: None,
            owner_email: None,
            due_date: None,
            status: String::new(),
            last_activity_at: None,
            channel_or_project: None,
            url: None,
            comments_text: Vec::new(),
            is_direct: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_owner(mut self, name: impl Into<String>, email: Option<String>) -> Self {
        self.owner_name = Some(name.into());
        self.owner_email = email;
        self
    }

    pub fn with_due_date(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Set status; stored lower-cased for keyword matching.
    pub fn with_status(mut self, status: impl AsRef<str>) -> Self {
        self.status = status.as_ref().trim().to_lowercase();
        self
    }

    pub fn with_last_activity(mut self, at: DateTime<Utc>) -> Self {
        self.last_activity_at = Some(at);
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel_or_project = Some(channel.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments_text.push(comment.into());
        self
    }

    pub fn with_direct(mut self, direct: bool) -> Self {
        self.is_direct = direct;
        self
    }

    /// Dedup key used by the normalizer.
    pub fn key(&self) -> (ProviderKind, &str) {
        (self.provider, self.external_id.as_str())
    }

    /// External id without the adapter's `"{tool}:"` namespace.
    pub fn source_id(&self) -> &str {
        self.external_id
            .strip_prefix(self.source.as_str())
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or(&self.external_id)
    }

    /// Stable `"{source}:{source_id}"` identifier.
    pub fn signal_id(&self) -> String {
        format!("{}:{}", self.source, self.source_id())
    }

    /// Whole days from `today` until the due date. Negative when overdue.
    pub fn days_until_due(&self, today: NaiveDate) -> Option<i64> {
        self.due_date.map(|due| (due - today).num_days())
    }

    /// Whole days since the last recorded activity.
    ///
    /// Returns `None` when there is no activity timestamp or when it lies in
    /// the future relative to `now` (treated as malformed).
    pub fn days_since_activity(&self, now: DateTime<Utc>) -> Option<i64> {
        let last = self.last_activity_at?;
        if last > now {
            return None;
        }
        Some((now - last).num_days())
    }

    /// Title and description, lower-cased and space separated.
    pub fn body_lower(&self) -> String {
        match &self.description {
            Some(desc) => format!("{} {}", self.title, desc).to_lowercase(),
            None => self.title.to_lowercase(),
        }
    }

    /// Title, description and every comment, lower-cased.
    pub fn full_text_lower(&self) -> String {
        let mut text = self.body_lower();
        for comment in &self.comments_text {
            text.push(' ');
            text.push_str(&comment.to_lowercase());
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
    }

    #[test]
    fn status_is_lowercased() {
        let item = CanonicalItem::new(ProviderKind::Task, "linear", "linear:ENG-1", "x")
            .with_status("  In Review ");
        assert_eq!(item.status, "in review");
    }

    #[test]
    fn days_until_due_is_negative_when_overdue() {
        let today = now().date_naive();
        let item = CanonicalItem::new(ProviderKind::Task, "linear", "linear:ENG-1", "x")
            .with_due_date(today - Duration::days(2));
        assert_eq!(item.days_until_due(today), Some(-2));
    }

    #[test]
    fn future_activity_is_treated_as_absent() {
        let item = CanonicalItem::new(ProviderKind::Task, "linear", "linear:ENG-1", "x")
            .with_last_activity(now() + Duration::hours(3));
        assert_eq!(item.days_since_activity(now()), None);
    }

    #[test]
    fn days_since_activity_truncates_partial_days() {
        let item = CanonicalItem::new(ProviderKind::Task, "linear", "linear:ENG-1", "x")
            .with_last_activity(now() - Duration::hours(71));
        assert_eq!(item.days_since_activity(now()), Some(2));
    }

    #[test]
    fn full_text_includes_comments_in_order() {
        let item = CanonicalItem::new(ProviderKind::Task, "github", "github:a/b#1", "Fix Login")
            .with_description("Steps Here")
            .with_comment("First")
            .with_comment("Second");
        assert_eq!(item.full_text_lower(), "fix login steps here first second");
    }
}
