//! Slack adapter -- `conversations.history` messages with their thread
//! replies.

use serde::{Deserialize, Serialize};

use super::payload::FieldReader;
use crate::model::{CanonicalItem, ProviderKind};

/// A message as returned by the Slack Web API, with the channel it was read
/// from and its permalink filled in by the fetcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlackMessage {
    /// Epoch seconds with microsecond fraction; unique within a channel.
    pub ts: Option<String>,
    #[serde(default)]
    pub channel: String,
    pub channel_name: Option<String>,
    /// `im` for direct messages
    pub channel_type: Option<String>,
    pub user: Option<String>,
    pub user_name: Option<String>,
    #[serde(default)]
    pub text: String,
    pub permalink: Option<String>,
    #[serde(default)]
    pub replies: Vec<SlackReply>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlackReply {
    pub ts: Option<String>,
    pub user: Option<String>,
    #[serde(default)]
    pub text: String,
}

/// Slack encodes broadcasts as `<!here>`; the classifier looks for `@here`.
fn decode_broadcasts(text: &str) -> String {
    text.replace("<!here>", "@here")
        .replace("<!channel>", "@channel")
        .replace("<!everyone>", "@channel")
}

impl SlackMessage {
    pub(crate) fn into_item(self, reader: &FieldReader<'_>) -> Option<CanonicalItem> {
        let Some(ts) = self.ts.as_deref().map(str::trim).filter(|ts| !ts.is_empty()) else {
            return reader.skip_unidentified("ts");
        };
        let external_id = format!("{}:{}/{}", reader.source(), self.channel, ts);

        let posted = reader.timestamp(&external_id, "ts", Some(ts));
        let latest_reply = self
            .replies
            .iter()
            .filter_map(|r| reader.timestamp(&external_id, "replies.ts", r.ts.as_deref()))
            .max();
        let last_activity = posted.max(latest_reply);

        let mut item = CanonicalItem::new(
            ProviderKind::ChatMessage,
            reader.source(),
            external_id.as_str(),
            decode_broadcasts(self.text.trim()),
        )
        .with_direct(self.channel_type.as_deref() == Some("im"));

        if let Some(sender) = self.user_name.or(self.user) {
            item = item.with_owner(sender, None);
        }
        match self.channel_name {
            Some(name) => item = item.with_channel(format!("#{}", name.trim_start_matches('#'))),
            None if !self.channel.is_empty() => item = item.with_channel(self.channel),
            None => {}
        }
        if let Some(at) = last_activity {
            item = item.with_last_activity(at);
        }
        if let Some(url) = reader.url(&external_id, "permalink", self.permalink.as_deref()) {
            item = item.with_url(url);
        }
        for reply in self.replies {
            item = item.with_comment(decode_broadcasts(&reply.text));
        }
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use crate::integrations::ProviderPayload;
    use chrono::{TimeZone, Utc};
    use indoc::indoc;

    fn items(json: &str, sink: &CollectingSink) -> Vec<CanonicalItem> {
        let records: serde_json::Value = serde_json::from_str(json).unwrap();
        ProviderPayload::from_records("slack", records).unwrap().into_items(sink)
    }

    #[test]
    fn message_with_thread() {
        let sink = CollectingSink::new();
        let items = items(
            indoc! {r#"
                [{
                    "ts": "1700000000.000100",
                    "channel": "C01",
                    "channel_name": "launch",
                    "user": "U1",
                    "user_name": "dana",
                    "text": "<!here> can someone approve the copy?",
                    "permalink": "https://acme.slack.com/archives/C01/p1700000000000100",
                    "replies": [
                        { "ts": "1700003600.000200", "user": "U2", "text": "looking now" }
                    ]
                }]
            "#},
            &sink,
        );

        let item = &items[0];
        assert_eq!(item.external_id, "slack:C01/1700000000.000100");
        assert_eq!(item.source, "slack");
        assert_eq!(item.title, "@here can someone approve the copy?");
        assert_eq!(item.owner_name.as_deref(), Some("dana"));
        assert_eq!(item.channel_or_project.as_deref(), Some("#launch"));
        assert_eq!(item.comments_text, vec!["looking now"]);
        assert_eq!(item.last_activity_at, Utc.timestamp_opt(1_700_003_600, 200_000).single());
        assert!(!item.is_direct);
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn im_channel_is_direct() {
        let sink = CollectingSink::new();
        let items = items(r#"[{ "ts": "1.0", "channel": "D9", "channel_type": "im", "text": "hey" }]"#, &sink);
        assert!(items[0].is_direct);
        assert_eq!(items[0].channel_or_project.as_deref(), Some("D9"));
    }

    #[test]
    fn missing_ts_is_skipped_and_reported() {
        let sink = CollectingSink::new();
        let items = items(r#"[{ "channel": "C1", "text": "orphan" }, { "ts": "2.0", "text": "ok" }]"#, &sink);
        assert_eq!(items.len(), 1);
        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].field, "ts");
        assert_eq!(entries[0].external_id, None);
    }

    #[test]
    fn bad_permalink_is_dropped() {
        let sink = CollectingSink::new();
        let items = items(r#"[{ "ts": "3.0", "channel": "C1", "text": "x", "permalink": "::nope" }]"#, &sink);
        assert_eq!(items[0].url, None);
        assert_eq!(sink.entries()[0].field, "permalink");
    }
}
