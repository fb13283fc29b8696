//! Inbound transcript rendering and outbound reply cleanup.

use {
    once_cell::sync::Lazy,
    regex::Regex,
    waterline_common::{AgentInput, InboundMessage, MessageContent, time::format_timestamp},
};

/// `<internal>…</internal>` spans, non-greedy, across newlines.
#[allow(clippy::unwrap_used)] // literal pattern
static INTERNAL_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<internal>.*?</internal>").unwrap());

/// Escape `&`, `<`, `>` and `"`. Nothing else is touched.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render a batch of messages for the agent.
///
/// When any message carries content blocks, only the latest message's
/// content is forwarded as is (blocks, or its raw unescaped text) and the
/// rest of the batch is dropped. Otherwise the batch becomes an escaped
/// `<messages>` transcript, one line per message.
pub fn format_messages(messages: &[InboundMessage]) -> AgentInput {
    if messages.iter().any(|m| !m.content.is_text())
        && let Some(latest) = messages.last()
    {
        return match &latest.content {
            MessageContent::Blocks(blocks) => AgentInput::Blocks(blocks.clone()),
            MessageContent::Text(text) => AgentInput::Text(text.clone()),
        };
    }

    let lines: Vec<String> = messages
        .iter()
        .map(|m| {
            format!(
                r#"<message sender="{}" time="{}">{}</message>"#,
                escape_xml(&m.sender_name),
                escape_xml(&format_timestamp(&m.timestamp)),
                escape_xml(m.content.as_text().unwrap_or_default()),
            )
        })
        .collect();
    AgentInput::Text(format!("<messages>\n{}\n</messages>", lines.join("\n")))
}

/// Remove every `<internal>…</internal>` span and trim the remainder.
pub fn strip_internal_tags(text: &str) -> String {
    INTERNAL_TAG_RE.replace_all(text, "").trim().to_string()
}

/// Prepare an agent reply for delivery. An empty result means there is
/// nothing to send.
pub fn format_outbound(raw: &str) -> String {
    strip_internal_tags(raw)
}
