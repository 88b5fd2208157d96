use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Structured view of one agent turn, re-derived from transcript markup on every parse.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAgentOutput {
    pub header: AgentHeader,
    pub meta: AgentMeta,
    /// Activity log entries with bullet glyphs removed, in transcript order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub working: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl ParsedAgentOutput {
    /// `true` when no section of the grammar was recognized.
    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
            && self.meta.is_empty()
            && self.working.is_empty()
            && self.user_instructions.is_none()
            && self.thinking.is_none()
            && self.answer.is_none()
            && self.tokens_used.is_none()
            && self.success.is_none()
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AgentHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Timestamped startup line printed before the metadata block, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

impl AgentHeader {
    pub fn is_empty(&self) -> bool {
        self.agent.is_none() && self.command.is_none() && self.banner.is_none()
    }
}

/// `key: value` lines from the metadata block.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AgentMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workdir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Every other key, spelled as it appeared.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl AgentMeta {
    pub fn insert(&mut self, key: &str, value: &str) {
        let value = value.to_string();
        match key.to_ascii_lowercase().as_str() {
            "model" => self.model = Some(value),
            "workdir" => self.workdir = Some(value),
            "provider" => self.provider = Some(value),
            _ => {
                self.extra.insert(key.to_string(), value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        match key.to_ascii_lowercase().as_str() {
            "model" => self.model.as_deref(),
            "workdir" => self.workdir.as_deref(),
            "provider" => self.provider.as_deref(),
            _ => self.extra.get(key).map(String::as_str),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.model.is_none()
            && self.workdir.is_none()
            && self.provider.is_none()
            && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkingBadge {
    Created,
    Modified,
    Read,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct WorkingItem {
    pub badge: Option<WorkingBadge>,
    pub text: String,
}

const BADGE_PREFIXES: &[(&str, WorkingBadge)] = &[
    ("created", WorkingBadge::Created),
    ("added", WorkingBadge::Created),
    ("modified", WorkingBadge::Modified),
    ("updated", WorkingBadge::Modified),
    ("changed", WorkingBadge::Modified),
    ("read", WorkingBadge::Read),
    ("scanned", WorkingBadge::Read),
];

/// Renderer-side classification of a working entry by its leading verb.
///
/// The verb is stripped for display; entries without a known verb keep their full text.
pub fn classify_working_item(entry: &str) -> WorkingItem {
    let entry = entry.trim();
    for (prefix, badge) in BADGE_PREFIXES {
        let Some(head) = entry.get(..prefix.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(prefix) {
            continue;
        }
        let rest = &entry[prefix.len()..];
        if !rest.is_empty() && !rest.starts_with(|ch: char| ch.is_whitespace() || ch == ':') {
            continue;
        }
        let rest = rest.trim_start_matches(|ch: char| ch.is_whitespace() || ch == ':');
        if rest.is_empty() {
            break;
        }
        return WorkingItem {
            badge: Some(*badge),
            text: rest.to_string(),
        };
    }

    WorkingItem {
        badge: None,
        text: entry.to_string(),
    }
}
