//! Tagged union over native provider payloads and the lenient field parsing
//! shared by every adapter.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::discord::DiscordMessage;
use super::github::GitHubIssue;
use super::linear::LinearIssue;
use super::notion::NotionPage;
use super::slack::SlackMessage;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{CoreError, Result};
use crate::model::{CanonicalItem, ProviderKind};

/// Tool names the adapters understand.
pub const KNOWN_TOOLS: [&str; 5] = ["slack", "discord", "linear", "github", "notion"];

/// Human-readable name for a tool.
pub fn display_name(tool: &str) -> &'static str {
    match tool {
        "slack" => "Slack",
        "discord" => "Discord",
        "linear" => "Linear",
        "github" => "GitHub",
        "notion" => "Notion",
        _ => "Unknown",
    }
}

/// Records as one tool delivers them, before canonicalisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", content = "records", rename_all = "lowercase")]
pub enum ProviderPayload {
    Slack(Vec<SlackMessage>),
    Discord(Vec<DiscordMessage>),
    Linear(Vec<LinearIssue>),
    GitHub(Vec<GitHubIssue>),
    Notion(Vec<NotionPage>),
}

impl ProviderPayload {
    /// Decode a JSON array of native records for `tool`.
    pub fn from_records(tool: &str, records: serde_json::Value) -> Result<Self> {
        let tool = tool.trim().to_lowercase();
        let wrap = |source| CoreError::Payload {
            provider: tool.clone(),
            source,
        };
        let payload = match tool.as_str() {
            "slack" => Self::Slack(serde_json::from_value(records).map_err(wrap)?),
            "discord" => Self::Discord(serde_json::from_value(records).map_err(wrap)?),
            "linear" => Self::Linear(serde_json::from_value(records).map_err(wrap)?),
            "github" => Self::GitHub(serde_json::from_value(records).map_err(wrap)?),
            "notion" => Self::Notion(serde_json::from_value(records).map_err(wrap)?),
            _ => return Err(CoreError::UnknownProvider(tool.clone())),
        };
        Ok(payload)
    }

    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::Slack(_) => "slack",
            Self::Discord(_) => "discord",
            Self::Linear(_) => "linear",
            Self::GitHub(_) => "github",
            Self::Notion(_) => "notion",
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Slack(_) | Self::Discord(_) => ProviderKind::ChatMessage,
            Self::Linear(_) | Self::GitHub(_) | Self::Notion(_) => ProviderKind::Task,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Slack(r) => r.len(),
            Self::Discord(r) => r.len(),
            Self::Linear(r) => r.len(),
            Self::GitHub(r) => r.len(),
            Self::Notion(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keep at most `max` records.
    pub fn truncate(&mut self, max: usize) {
        match self {
            Self::Slack(r) => r.truncate(max),
            Self::Discord(r) => r.truncate(max),
            Self::Linear(r) => r.truncate(max),
            Self::GitHub(r) => r.truncate(max),
            Self::Notion(r) => r.truncate(max),
        }
    }

    /// Collapse to canonical items. Records without an id are skipped and
    /// malformed fields dropped; both are reported to `sink`.
    pub fn into_items(self, sink: &dyn DiagnosticSink) -> Vec<CanonicalItem> {
        let reader = FieldReader::new(self.tool_name(), sink);
        match self {
            Self::Slack(records) => records.into_iter().filter_map(|r| r.into_item(&reader)).collect(),
            Self::Discord(records) => records.into_iter().filter_map(|r| r.into_item(&reader)).collect(),
            Self::Linear(records) => records.into_iter().filter_map(|r| r.into_item(&reader)).collect(),
            Self::GitHub(records) => records.into_iter().filter_map(|r| r.into_item(&reader)).collect(),
            Self::Notion(records) => records.into_iter().filter_map(|r| r.into_item(&reader)).collect(),
        }
    }
}

/// Parses optional native fields, reporting the ones that do not parse.
pub(crate) struct FieldReader<'a> {
    source: &'static str,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(source: &'static str, sink: &'a dyn DiagnosticSink) -> Self {
        Self { source, sink }
    }

    pub(crate) fn source(&self) -> &'static str {
        self.source
    }

    /// Report a record that cannot be identified. Always `None`.
    pub(crate) fn skip_unidentified<T>(&self, id_field: &str) -> Option<T> {
        self.sink.report(Diagnostic::new(
            self.source,
            None,
            id_field,
            "record has no id; skipped",
        ));
        None
    }

    pub(crate) fn date(&self, id: &str, field: &str, raw: Option<&str>) -> Option<NaiveDate> {
        let raw = non_empty(raw)?;
        let parsed = parse_date(raw);
        if parsed.is_none() {
            self.report(id, field, format!("unparseable date '{raw}'"));
        }
        parsed
    }

    pub(crate) fn timestamp(&self, id: &str, field: &str, raw: Option<&str>) -> Option<DateTime<Utc>> {
        let raw = non_empty(raw)?;
        let parsed = parse_timestamp(raw);
        if parsed.is_none() {
            self.report(id, field, format!("unparseable timestamp '{raw}'"));
        }
        parsed
    }

    pub(crate) fn url(&self, id: &str, field: &str, raw: Option<&str>) -> Option<String> {
        let raw = non_empty(raw)?;
        match url::Url::parse(raw) {
            Ok(_) => Some(raw.to_string()),
            Err(e) => {
                self.report(id, field, format!("invalid url '{raw}': {e}"));
                None
            }
        }
    }

    fn report(&self, id: &str, field: &str, detail: String) {
        self.sink
            .report(Diagnostic::new(self.source, Some(id), field, detail));
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Parse `YYYY-MM-DD`, an RFC 3339 timestamp (its UTC date) or epoch
/// seconds.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    parse_timestamp(raw).map(|ts| ts.date_naive())
}

/// Parse an RFC 3339 timestamp, epoch seconds with optional fraction
/// (Slack `ts`), or `YYYY-MM-DD` as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Some(ts) = parse_epoch(raw) {
        return Some(ts);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

fn parse_epoch(raw: &str) -> Option<DateTime<Utc>> {
    let (secs, frac) = match raw.split_once('.') {
        Some((secs, frac)) => (secs, frac),
        None => (raw, ""),
    };
    if secs.is_empty() || !secs.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let secs: i64 = secs.parse().ok()?;
    let mut digits: String = frac.chars().take(9).collect();
    while digits.len() < 9 {
        digits.push('0');
    }
    let nanos: u32 = digits.parse().ok()?;
    DateTime::from_timestamp(secs, nanos)
}
