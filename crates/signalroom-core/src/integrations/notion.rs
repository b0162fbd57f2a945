//! Notion adapter -- pages from a task database query.
//!
//! Database schemas are user-defined, so properties stay loosely typed and
//! are picked out by property type and a few conventional names.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::payload::FieldReader;
use crate::model::{CanonicalItem, ProviderKind};

const STATUS_PROPERTIES: [&str; 1] = ["status"];
const DUE_PROPERTIES: [&str; 3] = ["due", "due date", "deadline"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotionPage {
    pub id: Option<String>,
    pub url: Option<String>,
    pub last_edited_time: Option<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

fn prop_type(prop: &Value) -> &str {
    prop.get("type").and_then(Value::as_str).unwrap_or_default()
}

fn plain_text(rich: &Value) -> String {
    rich.as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("plain_text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}

impl NotionPage {
    /// Property whose name matches one of `names`, case-insensitively.
    fn named(&self, names: &[&str]) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(name, _)| names.contains(&name.trim().to_lowercase().as_str()))
            .map(|(_, prop)| prop)
    }

    fn first_of_type(&self, kind: &str) -> Option<&Value> {
        self.properties.values().find(|prop| prop_type(prop) == kind)
    }

    fn title(&self) -> String {
        self.first_of_type("title")
            .and_then(|prop| prop.get("title"))
            .map(plain_text)
            .unwrap_or_default()
    }

    fn status(&self) -> Option<String> {
        let prop = self.named(&STATUS_PROPERTIES)?;
        let kind = prop_type(prop);
        if kind != "status" && kind != "select" {
            return None;
        }
        prop.get(kind)?.get("name")?.as_str().map(str::to_string)
    }

    fn due(&self) -> Option<&str> {
        let prop = self.named(&DUE_PROPERTIES)?;
        if prop_type(prop) != "date" {
            return None;
        }
        prop.get("date")?.get("start")?.as_str()
    }

    fn owner(&self) -> Option<(String, Option<String>)> {
        let person = self.first_of_type("people")?.get("people")?.as_array()?.first()?;
        let name = person.get("name")?.as_str()?.to_string();
        let email = person
            .get("person")
            .and_then(|p| p.get("email"))
            .and_then(Value::as_str)
            .map(str::to_string);
        Some((name, email))
    }

    pub(crate) fn into_item(self, reader: &FieldReader<'_>) -> Option<CanonicalItem> {
        let Some(id) = self.id.clone().filter(|id| !id.trim().is_empty()) else {
            return reader.skip_unidentified("id");
        };
        let external_id = format!("{}:{}", reader.source(), id);

        let mut item = CanonicalItem::new(ProviderKind::Task, reader.source(), external_id.as_str(), self.title());

        if let Some(status) = self.status() {
            item = item.with_status(status);
        }
        if let Some((name, email)) = self.owner() {
            item = item.with_owner(name, email);
        }
        if let Some(due) = reader.date(&external_id, "properties.due", self.due()) {
            item = item.with_due_date(due);
        }
        if let Some(at) = reader.timestamp(&external_id, "last_edited_time", self.last_edited_time.as_deref()) {
            item = item.with_last_activity(at);
        }
        if let Some(url) = reader.url(&external_id, "url", self.url.as_deref()) {
            item = item.with_url(url);
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
        ProviderPayload::from_records("notion", records).unwrap().into_items(sink)
    }

    #[test]
    fn database_page_properties() {
        let sink = CollectingSink::new();
        let items = items(
            indoc! {r#"
                [{
                    "id": "1a2b",
                    "url": "https://www.notion.so/Launch-plan-1a2b",
                    "last_edited_time": "2026-03-08T09:30:00.000Z",
                    "properties": {
                        "Name": { "type": "title", "title": [
                            { "plain_text": "Launch " }, { "plain_text": "plan" }
                        ] },
                        "Status": { "type": "status", "status": { "name": "Waiting" } },
                        "Due date": { "type": "date", "date": { "start": "2026-03-11" } },
                        "Owner": { "type": "people", "people": [
                            { "name": "Priya", "person": { "email": "priya@example.com" } }
                        ] }
                    }
                }]
            "#},
            &sink,
        );

        let item = &items[0];
        assert_eq!(item.external_id, "notion:1a2b");
        assert_eq!(item.title, "Launch plan");
        assert_eq!(item.status, "waiting");
        assert_eq!(item.due_date, NaiveDate::from_ymd_opt(2026, 3, 11));
        assert_eq!(item.owner_name.as_deref(), Some("Priya"));
        assert_eq!(item.owner_email.as_deref(), Some("priya@example.com"));
        assert!(item.last_activity_at.is_some());
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn select_status_and_missing_properties() {
        let sink = CollectingSink::new();
        let items = items(
            r#"[{ "id": "p", "properties": { "status": { "type": "select", "select": { "name": "Done" } } } }]"#,
            &sink,
        );
        assert_eq!(items[0].status, "done");
        assert_eq!(items[0].title, "");
        assert_eq!(items[0].due_date, None);
        assert_eq!(items[0].owner_name, None);
    }

    #[test]
    fn malformed_due_is_reported() {
        let sink = CollectingSink::new();
        let items = items(
            r#"[{ "id": "p", "properties": { "Due": { "type": "date", "date": { "start": "soonish" } } } }]"#,
            &sink,
        );
        assert_eq!(items[0].due_date, None);
        assert_eq!(sink.entries()[0].field, "properties.due");
    }
}
