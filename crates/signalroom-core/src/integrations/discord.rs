//! Discord adapter -- channel messages from the REST API.

use serde::{Deserialize, Serialize};

use super::payload::FieldReader;
use crate::model::{CanonicalItem, ProviderKind};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscordMessage {
    /// Snowflake id
    pub id: Option<String>,
    #[serde(default)]
    pub channel_id: String,
    pub channel_name: Option<String>,
    /// Absent for direct messages
    pub guild_id: Option<String>,
    pub author: Option<DiscordAuthor>,
    #[serde(default)]
    pub content: String,
    /// ISO 8601
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscordAuthor {
    #[serde(default)]
    pub username: String,
    pub global_name: Option<String>,
}

impl DiscordAuthor {
    fn display(self) -> Option<String> {
        self.global_name
            .filter(|name| !name.trim().is_empty())
            .or_else(|| (!self.username.is_empty()).then_some(self.username))
    }
}

impl DiscordMessage {
    fn message_url(&self, id: &str) -> Option<String> {
        let guild = self.guild_id.as_deref().unwrap_or("@me");
        (!self.channel_id.is_empty())
            .then(|| format!("https://discord.com/channels/{guild}/{}/{id}", self.channel_id))
    }

    pub(crate) fn into_item(self, reader: &FieldReader<'_>) -> Option<CanonicalItem> {
        let Some(id) = self.id.clone().filter(|id| !id.trim().is_empty()) else {
            return reader.skip_unidentified("id");
        };
        let external_id = format!("{}:{}/{}", reader.source(), self.channel_id, id);
        let url = reader.url(&external_id, "url", self.message_url(&id).as_deref());

        let mut item = CanonicalItem::new(
            ProviderKind::ChatMessage,
            reader.source(),
            external_id.as_str(),
            self.content.trim().replace("@everyone", "@channel"),
        )
        .with_direct(self.guild_id.is_none());

        if let Some(sender) = self.author.and_then(DiscordAuthor::display) {
            item = item.with_owner(sender, None);
        }
        if let Some(name) = self.channel_name {
            item = item.with_channel(format!("#{}", name.trim_start_matches('#')));
        }
        if let Some(at) = reader.timestamp(&external_id, "timestamp", self.timestamp.as_deref()) {
            item = item.with_last_activity(at);
        }
        if let Some(url) = url {
            item = item.with_url(url);
        }
        Some(item)
    }
}
