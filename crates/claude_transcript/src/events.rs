use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One object from `claude --output-format stream-json`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClaudeEvent {
    System(SystemEvent),
    Assistant(MessageEvent),
    User(MessageEvent),
    Result(ResultEvent),
    #[serde(other)]
    Ignored,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct SystemEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(flatten, default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct MessageEvent {
    #[serde(default)]
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub content: MessageContent,
}

/// Message content is either a list of typed parts or, for plain prompts, a bare string.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Parts(Vec<ContentPart>),
    Text(String),
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Parts(Vec::new())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        #[serde(default)]
        text: String,
    },
    ToolUse {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default)]
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_use_id: Option<String>,
        #[serde(default)]
        content: Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ResultEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl ResultEvent {
    /// The final answer, when `result` is a non-blank string.
    pub fn text(&self) -> Option<&str> {
        self.result
            .as_ref()
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unknown_event_types_decode_as_ignored() {
        let event: ClaudeEvent =
            serde_json::from_value(json!({"type": "stream_event", "event": {}})).unwrap();
        assert_eq!(event, ClaudeEvent::Ignored);
    }

    #[test]
    fn message_content_accepts_parts_or_plain_text() {
        let event: ClaudeEvent = serde_json::from_value(json!({
            "type": "assistant",
            "message": {
                "model": "claude-sonnet-4-5",
                "content": [
                    {"type": "thinking", "thinking": "hmm"},
                    {"type": "text", "text": "hi"}
                ]
            }
        }))
        .unwrap();
        let ClaudeEvent::Assistant(event) = event else {
            panic!("expected assistant event");
        };
        assert_eq!(event.message.model.as_deref(), Some("claude-sonnet-4-5"));
        assert_eq!(
            event.message.content,
            MessageContent::Parts(vec![
                ContentPart::Other,
                ContentPart::Text { text: "hi".into() }
            ])
        );

        let event: ClaudeEvent = serde_json::from_value(json!({
            "type": "user",
            "message": {"role": "user", "content": "run the tests"}
        }))
        .unwrap();
        let ClaudeEvent::User(event) = event else {
            panic!("expected user event");
        };
        assert_eq!(
            event.message.content,
            MessageContent::Text("run the tests".into())
        );
    }

    #[test]
    fn result_text_requires_a_non_blank_string() {
        let text = |result: Value| {
            ResultEvent {
                result: Some(result),
                ..ResultEvent::default()
            }
            .text()
            .map(str::to_string)
        };
        assert_eq!(text(json!("done")), Some("done".to_string()));
        assert_eq!(text(json!("  ")), None);
        assert_eq!(text(json!({"text": "done"})), None);
    }
}
