//! GitHub adapter -- issues and pull requests assigned to the user.

use serde::{Deserialize, Serialize};

use super::payload::FieldReader;
use crate::model::{CanonicalItem, ProviderKind};

/// An issue as returned by `GET /issues`, with comment bodies attached by
/// the fetcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitHubIssue {
    pub number: Option<u64>,
    #[serde(default)]
    pub title: String,
    pub body: Option<String>,
    /// `open` or `closed`
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub labels: Vec<GitHubLabel>,
    pub assignee: Option<GitHubUser>,
    pub milestone: Option<GitHubMilestone>,
    pub updated_at: Option<String>,
    pub html_url: Option<String>,
    pub repository: Option<GitHubRepository>,
    /// Present on pull requests
    pub pull_request: Option<serde_json::Value>,
    #[serde(default)]
    pub comment_bodies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitHubLabel {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitHubUser {
    #[serde(default)]
    pub login: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitHubMilestone {
    #[serde(default)]
    pub title: String,
    pub due_on: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitHubRepository {
    #[serde(default)]
    pub full_name: String,
}

impl GitHubIssue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    /// State followed by label names, so a `blocked` label reads as status.
    fn status(&self) -> String {
        std::iter::once(self.state.as_str())
            .chain(self.labels.iter().map(|l| l.name.as_str()))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn into_item(self, reader: &FieldReader<'_>) -> Option<CanonicalItem> {
        let Some(number) = self.number else {
            return reader.skip_unidentified("number");
        };
        let repo = self
            .repository
            .as_ref()
            .map(|r| r.full_name.as_str())
            .unwrap_or_default();
        let external_id = format!("{}:{}#{}", reader.source(), repo, number);
        let status = self.status();

        let mut item = CanonicalItem::new(ProviderKind::Task, reader.source(), external_id.as_str(), self.title)
            .with_status(status);

        if let Some(body) = self.body.filter(|b| !b.trim().is_empty()) {
            item = item.with_description(body);
        }
        if let Some(assignee) = self.assignee.filter(|a| !a.login.is_empty()) {
            item = item.with_owner(assignee.login, assignee.email);
        }
        if let Some(milestone) = self.milestone {
            if let Some(due) = reader.date(&external_id, "milestone.due_on", milestone.due_on.as_deref()) {
                item = item.with_due_date(due);
            }
        }
        if let Some(at) = reader.timestamp(&external_id, "updated_at", self.updated_at.as_deref()) {
            item = item.with_last_activity(at);
        }
        if !repo.is_empty() {
            item = item.with_channel(repo);
        }
        if let Some(url) = reader.url(&external_id, "html_url", self.html_url.as_deref()) {
            item = item.with_url(url);
        }
        for comment in self.comment_bodies {
            item = item.with_comment(comment);
        }
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use crate::integrations::ProviderPayload;
    use chrono::NaiveDate;
    use indoc::indoc;

    fn items(json: &str, sink: &CollectingSink) -> Vec<CanonicalItem> {
        let records: serde_json::Value = serde_json::from_str(json).unwrap();
        ProviderPayload::from_records("github", records).unwrap().into_items(sink)
    }

    #[test]
    fn labels_join_status_and_milestone_sets_due_date() {
        let sink = CollectingSink::new();
        let items = items(
            indoc! {r#"
                [{
                    "number": 481,
                    "title": "Checkout fails on Safari",
                    "body": "Repro attached",
                    "state": "open",
                    "labels": [{ "name": "Blocked" }, { "name": "bug" }],
                    "assignee": { "login": "dana" },
                    "milestone": { "title": "v2.3", "due_on": "2026-03-12T07:00:00Z" },
                    "updated_at": "2026-03-09T10:00:00Z",
                    "html_url": "https://github.com/acme/shop/issues/481",
                    "repository": { "full_name": "acme/shop" },
                    "comment_bodies": ["can repro", "thanks for the fix!"]
                }]
            "#},
            &sink,
        );

        let item = &items[0];
        assert_eq!(item.external_id, "github:acme/shop#481");
        assert_eq!(item.status, "open blocked bug");
        assert_eq!(item.owner_name.as_deref(), Some("dana"));
        assert_eq!(item.due_date, NaiveDate::from_ymd_opt(2026, 3, 12));
        assert_eq!(item.channel_or_project.as_deref(), Some("acme/shop"));
        assert_eq!(item.comments_text.len(), 2);
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn closed_state_survives_as_status() {
        let sink = CollectingSink::new();
        let items = items(r#"[{ "number": 2, "title": "Old bug", "state": "closed" }]"#, &sink);
        assert_eq!(items[0].status, "closed");
        assert_eq!(items[0].external_id, "github:#2");
        assert_eq!(items[0].channel_or_project, None);
    }

    #[test]
    fn pull_requests_are_detected() {
        let issue: GitHubIssue =
            serde_json::from_str(r#"{ "number": 3, "pull_request": { "url": "x" } }"#).unwrap();
        assert!(issue.is_pull_request());
    }

    #[test]
    fn missing_number_is_skipped() {
        let sink = CollectingSink::new();
        assert!(items(r#"[{ "title": "no number" }]"#, &sink).is_empty());
        assert_eq!(sink.entries()[0].field, "number");
    }
}
