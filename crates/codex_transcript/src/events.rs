use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One event from `codex exec --json` or a Codex responses stream.
///
/// Event lifecycle:
/// - `thread.started` names the thread.
/// - `turn.started` / `turn.completed` bracket a turn; completion carries token usage.
/// - `item.*` events carry a [`ThreadItem`] (any event type with an `item` field is accepted).
/// - `response.completed` / `response.error` come from the responses API surface.
///
/// Anything else decodes to [`ThreadEvent::Ignored`] so new upstream events never break a
/// stream.
#[derive(Clone, Debug, PartialEq)]
pub enum ThreadEvent {
    ThreadStarted(ThreadStarted),
    TurnStarted,
    TurnCompleted(TurnCompleted),
    Error(EventError),
    Item(ItemEvent),
    ResponseCompleted(ResponseCompleted),
    ResponseError(ResponseError),
    Ignored { event_type: String },
}

impl ThreadEvent {
    /// Decodes a parsed JSON value by its `type` field.
    pub fn from_value(mut value: Value) -> Result<Self, serde_json::Error> {
        let event_type = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let event = match event_type.as_str() {
            "thread.started" => Self::ThreadStarted(serde_json::from_value(value)?),
            "turn.started" => Self::TurnStarted,
            "turn.completed" => Self::TurnCompleted(serde_json::from_value(value)?),
            "error" => Self::Error(serde_json::from_value(value)?),
            "response.completed" => Self::ResponseCompleted(serde_json::from_value(value)?),
            "response.error" => Self::ResponseError(serde_json::from_value(value)?),
            _ => match value.get_mut("item").map(Value::take) {
                Some(item) => Self::Item(ItemEvent {
                    event_type,
                    item: serde_json::from_value(item)?,
                }),
                None => Self::Ignored { event_type },
            },
        };
        Ok(event)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ThreadStarted {
    pub thread_id: String,
    #[serde(flatten, default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TurnCompleted {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(flatten, default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub cached_input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

impl Usage {
    pub fn total(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct EventError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten, default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

/// An `{item}`-wrapped event such as `item.started` or `item.completed`.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemEvent {
    pub event_type: String,
    pub item: ThreadItem,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ThreadItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub details: ItemDetails,
}

/// Item payloads, keyed by the item's `type`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemDetails {
    AgentMessage(TextItem),
    Reasoning(TextItem),
    CommandExecution(CommandExecutionItem),
    FileChange(FileChangeItem),
    McpToolCall(McpToolCallItem),
    WebSearch(WebSearchItem),
    TodoList(TodoListItem),
    Error(ErrorItem),
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct TextItem {
    #[serde(default)]
    pub text: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CommandExecutionItem {
    pub command: String,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregated_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FileChangeItem {
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default)]
    pub changes: Vec<FileUpdate>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FileUpdate {
    pub path: PathBuf,
    #[serde(default)]
    pub kind: FileChangeKind,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FileChangeKind {
    Add,
    Delete,
    #[default]
    Modify,
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct McpToolCallItem {
    pub server: String,
    pub tool: String,
    #[serde(default)]
    pub status: ItemStatus,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct WebSearchItem {
    pub query: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct TodoListItem {
    #[serde(default)]
    pub items: Vec<TodoEntry>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TodoEntry {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ErrorItem {
    #[serde(default)]
    pub message: String,
}

/// Tri-state status shared by command, file-change and tool-call items.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    InProgress,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ResponseCompleted {
    #[serde(default)]
    pub response: Value,
}

impl ResponseCompleted {
    /// Plain text of the completion: `response.text`, else every `output[].text`
    /// (or `output[].content[].text`) concatenated.
    pub fn text(&self) -> String {
        if let Some(text) = self.response.get("text").and_then(Value::as_str) {
            return text.to_string();
        }

        let mut out = String::new();
        let outputs = self
            .response
            .get("output")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for output in outputs {
            if let Some(text) = output.get("text").and_then(Value::as_str) {
                out.push_str(text);
                continue;
            }
            let parts = output
                .get("content")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            for part in parts {
                if let Some(text) = part.get("text").and_then(Value::as_str) {
                    out.push_str(text);
                }
            }
        }
        out
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ResponseError {
    #[serde(default)]
    pub error: Value,
}

impl ResponseError {
    pub fn message(&self) -> Option<&str> {
        self.error
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.trim().is_empty())
    }
}
