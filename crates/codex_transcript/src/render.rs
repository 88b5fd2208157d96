//! Markdown blocks for each Codex item kind.

use std::fmt::Write as _;
use std::path::Path;

use crate::events::{
    CommandExecutionItem, FileChangeItem, FileChangeKind, ItemDetails, ItemStatus,
    McpToolCallItem, TodoListItem, Usage,
};

pub(crate) const BLOCK_SEPARATOR: &str = "\n\n";
const UNKNOWN_ERROR: &str = "Unknown error";

pub fn status_glyph(status: ItemStatus) -> &'static str {
    match status {
        ItemStatus::Completed => "✅",
        ItemStatus::Failed => "❌",
        ItemStatus::InProgress | ItemStatus::Unknown => "⏳",
    }
}

fn change_glyph(kind: FileChangeKind) -> &'static str {
    match kind {
        FileChangeKind::Add => "➕",
        FileChangeKind::Delete => "➖",
        FileChangeKind::Modify | FileChangeKind::Other => "✏️",
    }
}

/// Renders a non-reasoning item; `None` for empty messages and unknown kinds.
pub fn item_block(details: &ItemDetails) -> Option<String> {
    match details {
        ItemDetails::AgentMessage(message) => {
            let text = message.text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        ItemDetails::Reasoning(reasoning) => reasoning_block(&reasoning.text),
        ItemDetails::CommandExecution(command) => Some(command_block(command)),
        ItemDetails::FileChange(change) => Some(file_change_block(change)),
        ItemDetails::McpToolCall(call) => Some(tool_call_block(call)),
        ItemDetails::WebSearch(search) => Some(format!("🔍 Web search: {}", search.query)),
        ItemDetails::TodoList(todo) => Some(todo_block(todo)),
        ItemDetails::Error(error) => Some(error_block(Some(&error.message))),
        ItemDetails::Unknown => None,
    }
}

pub fn reasoning_block(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| format!("_{text}_"))
}

fn command_block(command: &CommandExecutionItem) -> String {
    let mut out = format!("{} `{}`", status_glyph(command.status), command.command);
    let output = command
        .aggregated_output
        .as_deref()
        .map(|output| output.trim_end())
        .unwrap_or_default();
    if !output.is_empty() {
        let _ = write!(out, "\n```\n{output}\n```");
    }
    out
}

fn file_change_block(change: &FileChangeItem) -> String {
    let mut out = format!("{} File changes:", status_glyph(change.status));
    for update in &change.changes {
        let _ = write!(
            out,
            "\n- {} {}",
            change_glyph(update.kind),
            file_link(&update.path)
        );
    }
    out
}

fn tool_call_block(call: &McpToolCallItem) -> String {
    format!(
        "{} MCP tool `{}.{}`",
        status_glyph(call.status),
        call.server,
        call.tool
    )
}

fn todo_block(todo: &TodoListItem) -> String {
    let mut out = String::from("📋 Todo list:");
    for entry in &todo.items {
        let mark = if entry.completed { 'x' } else { ' ' };
        let _ = write!(out, "\n- [{mark}] {}", entry.text);
    }
    out
}

/// `❌ message`, falling back to a fixed text when the message is missing or blank.
pub fn error_block(message: Option<&str>) -> String {
    let message = message
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .unwrap_or(UNKNOWN_ERROR);
    format!("❌ {message}")
}

pub fn token_summary(usage: &Usage) -> String {
    let mut out = format!(
        "Tokens used: {} total ({} in, {} out)",
        format_count(usage.total()),
        format_count(usage.input_tokens),
        format_count(usage.output_tokens)
    );
    if usage.cached_input_tokens > 0 {
        let _ = write!(out, " · {} cached", format_count(usage.cached_input_tokens));
    }
    out
}

/// Groups digits in threes with commas (`1234567` -> `1,234,567`).
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, digit) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

/// A markdown link to `file://{path}`, with the label and target escaped.
pub fn file_link(path: &Path) -> String {
    let path = path.to_string_lossy();

    let mut label = String::with_capacity(path.len());
    for ch in path.chars() {
        if matches!(ch, '[' | ']' | '\\') {
            label.push('\\');
        }
        label.push(ch);
    }

    let mut target = String::from("file://");
    for ch in path.chars() {
        match ch {
            ' ' => target.push_str("%20"),
            '(' => target.push_str("%28"),
            ')' => target.push_str("%29"),
            '<' => target.push_str("%3C"),
            '>' => target.push_str("%3E"),
            other => target.push(other),
        }
    }

    format!("[{label}]({target})")
}
