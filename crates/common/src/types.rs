use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

// ── Inbound messages ────────────────────────────────────────────────────────

/// A message received from a channel, tagged with its conversation group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Conversation group the message belongs to.
    pub group: String,
    /// Display name of the sender.
    pub sender_name: String,
    pub timestamp: DateTime<Utc>,
    pub content: MessageContent,
}

impl InboundMessage {
    pub fn text(
        group: impl Into<String>,
        sender_name: impl Into<String>,
        timestamp: DateTime<Utc>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            sender_name: sender_name.into(),
            timestamp,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn blocks(
        group: impl Into<String>,
        sender_name: impl Into<String>,
        timestamp: DateTime<Utc>,
        blocks: Vec<ContentBlock>,
    ) -> Self {
        Self {
            group: group.into(),
            sender_name: sender_name.into(),
            timestamp,
            content: MessageContent::Blocks(blocks),
        }
    }
}

/// Message body: plain text, or an ordered list of typed content blocks.
///
/// Serialized untagged so a JSON string maps to `Text` and a JSON array to
/// `Blocks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl MessageContent {
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Blocks(_) => None,
        }
    }
}

/// A typed unit of rich content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    Image { source: MediaSource },
    Document { source: MediaSource },
}

/// Where the bytes of an image or document block come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaSource {
    Base64 { media_type: String, data: String },
    Url { url: String },
}

// ── Agent input ─────────────────────────────────────────────────────────────

/// What the agent receives for a batch of new messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AgentInput {
    /// Escaped XML transcript of text-only messages.
    Text(String),
    /// Content blocks of the latest message in the batch.
    Blocks(Vec<ContentBlock>),
}
