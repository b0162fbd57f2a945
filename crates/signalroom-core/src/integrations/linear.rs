//! Linear adapter -- issue nodes from the GraphQL API.

use serde::{Deserialize, Serialize};

use super::payload::FieldReader;
use crate::model::{CanonicalItem, ProviderKind};

/// An issue node as selected by the assigned-issues query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearIssue {
    pub id: Option<String>,
    /// Team-scoped key, e.g. `ENG-12`
    pub identifier: Option<String>,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub state: Option<LinearState>,
    pub assignee: Option<LinearUser>,
    /// `YYYY-MM-DD`
    pub due_date: Option<String>,
    pub updated_at: Option<String>,
    pub project: Option<LinearProject>,
    pub url: Option<String>,
    pub comments: Option<LinearComments>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearState {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearUser {
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearProject {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearComments {
    #[serde(default)]
    pub nodes: Vec<LinearComment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearComment {
    #[serde(default)]
    pub body: String,
    pub created_at: Option<String>,
}

impl LinearIssue {
    pub(crate) fn into_item(self, reader: &FieldReader<'_>) -> Option<CanonicalItem> {
        let key = self
            .identifier
            .clone()
            .or_else(|| self.id.clone())
            .filter(|k| !k.trim().is_empty());
        let Some(key) = key else {
            return reader.skip_unidentified("identifier");
        };
        let external_id = format!("{}:{}", reader.source(), key);

        let mut item = CanonicalItem::new(ProviderKind::Task, reader.source(), external_id.as_str(), self.title);

        if let Some(desc) = self.description.filter(|d| !d.trim().is_empty()) {
            item = item.with_description(desc);
        }
        if let Some(state) = self.state {
            item = item.with_status(state.name);
        }
        if let Some(assignee) = self.assignee.filter(|a| !a.name.is_empty()) {
            item = item.with_owner(assignee.name, assignee.email);
        }
        if let Some(due) = reader.date(&external_id, "dueDate", self.due_date.as_deref()) {
            item = item.with_due_date(due);
        }
        if let Some(at) = reader.timestamp(&external_id, "updatedAt", self.updated_at.as_deref()) {
            item = item.with_last_activity(at);
        }
        if let Some(project) = self.project.filter(|p| !p.name.is_empty()) {
            item = item.with_channel(project.name);
        }
        if let Some(url) = reader.url(&external_id, "url", self.url.as_deref()) {
            item = item.with_url(url);
        }

        // The API pages newest first; canonical comments run oldest first.
        let mut comments: Vec<_> = self
            .comments
            .map(|c| c.nodes)
            .unwrap_or_default()
            .into_iter()
            .map(|c| {
                let at = reader.timestamp(&external_id, "comments.createdAt", c.created_at.as_deref());
                (at, c.body)
            })
            .collect();
        comments.sort_by_key(|(at, _)| *at);
        for (_, body) in comments {
            item = item.with_comment(body);
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
        ProviderPayload::from_records("linear", records).unwrap().into_items(sink)
    }

    #[test]
    fn full_issue_node() {
        let sink = CollectingSink::new();
        let items = items(
            indoc! {r#"
                [{
                    "id": "9cfb1f4c",
                    "identifier": "ENG-12",
                    "title": "Blocked: ship pricing page",
                    "description": "Waiting on legal review",
                    "state": { "name": "In Progress" },
                    "assignee": { "name": "Dana", "email": "dana@example.com" },
                    "dueDate": "2026-03-11",
                    "updatedAt": "2026-03-06T12:00:00.000Z",
                    "project": { "name": "Website" },
                    "url": "https://linear.app/acme/issue/ENG-12",
                    "comments": { "nodes": [
                        { "body": "second", "createdAt": "2026-03-05T00:00:00Z" },
                        { "body": "first", "createdAt": "2026-03-04T00:00:00Z" }
                    ] }
                }]
            "#},
            &sink,
        );

        let item = &items[0];
        assert_eq!(item.external_id, "linear:ENG-12");
        assert_eq!(item.status, "in progress");
        assert_eq!(item.owner_email.as_deref(), Some("dana@example.com"));
        assert_eq!(item.due_date, NaiveDate::from_ymd_opt(2026, 3, 11));
        assert_eq!(item.channel_or_project.as_deref(), Some("Website"));
        assert_eq!(item.comments_text, vec!["first", "second"]);
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn falls_back_to_node_id() {
        let sink = CollectingSink::new();
        let items = items(r#"[{ "id": "abc", "title": "x" }]"#, &sink);
        assert_eq!(items[0].external_id, "linear:abc");
    }

    #[test]
    fn unparseable_due_date_becomes_absent() {
        let sink = CollectingSink::new();
        let items = items(r#"[{ "identifier": "ENG-1", "title": "x", "dueDate": "Q3" }]"#, &sink);
        assert_eq!(items[0].due_date, None);
        let entries = sink.entries();
        assert_eq!(entries[0].field, "dueDate");
        assert_eq!(entries[0].external_id.as_deref(), Some("linear:ENG-1"));
    }

    #[test]
    fn unidentified_issue_is_skipped() {
        let sink = CollectingSink::new();
        assert!(items(r#"[{ "title": "ghost" }]"#, &sink).is_empty());
        assert_eq!(sink.entries().len(), 1);
    }
}
