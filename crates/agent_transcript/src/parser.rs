//! Tolerant parser for transcript markup (see [`crate::markup`]).
//!
//! The parser is called on every new chunk while a transcript is still streaming in, so it
//! accepts any prefix of a well-formed transcript. A missing or malformed section only leaves
//! the matching field unset.

use crate::agent::AgentKind;
use crate::markup::{
    ANSWER_MARKER, BULLET, FAILURE_GLYPH, SUCCESS_GLYPH, THINKING_LABEL, TOKENS_USED_LABEL,
    USER_INSTRUCTIONS_LABEL, WORKING_MARKER,
};
use crate::output::ParsedAgentOutput;

/// Parses transcript markup into a fresh [`ParsedAgentOutput`].
///
/// Returns `None` only when nothing in `text` looks like transcript markup; callers then show
/// the raw text as-is.
pub fn parse_agent_output(text: &str) -> Option<ParsedAgentOutput> {
    let mut state = ParseState::default();
    for line in text.lines() {
        state.line(line.strip_suffix('\r').unwrap_or(line));
    }
    let output = state.finish();
    (!output.is_empty()).then_some(output)
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
enum Section {
    /// Before the first separator.
    #[default]
    Preamble,
    /// Between the first and second separators.
    Meta,
    Body,
    Working,
    Thinking,
    Answer,
    UserInstructions,
}

#[derive(Debug, Default)]
struct ParseState {
    output: ParsedAgentOutput,
    header_seen: bool,
    separators: usize,
    section: Section,
    block: Vec<String>,
    /// A separator seen inside a text block; it only ends the block if a marker follows.
    pending_separator: Option<String>,
    thinking: Vec<String>,
}

impl ParseState {
    fn line(&mut self, raw: &str) {
        let trimmed = raw.trim();

        if !self.header_seen {
            if let Some((agent, command)) = parse_header(trimmed) {
                self.header_seen = true;
                self.output.header.agent = agent;
                self.output.header.command = command;
                return;
            }
        }

        let (timestamp, rest) = split_timestamp(trimmed);

        if let Some(separator) = self.pending_separator.take() {
            let ends_block = trimmed == ANSWER_MARKER
                || trimmed == WORKING_MARKER
                || timestamp.is_some()
                || parse_tokens_used(rest).is_some()
                || parse_completion(rest).is_some();
            if ends_block {
                self.separator();
            } else {
                self.block.push(separator);
            }
        }

        if is_separator(trimmed) {
            if self.in_text_block() {
                self.pending_separator = Some(raw.to_string());
            } else {
                self.separator();
            }
            return;
        }

        if let Some(tokens) = parse_tokens_used(rest) {
            self.close_block();
            self.section = Section::Body;
            if let Some(tokens) = tokens {
                self.output.tokens_used = Some(tokens);
            }
            return;
        }

        if let Some(success) = parse_completion(rest) {
            self.close_block();
            self.section = Section::Body;
            self.output.success = Some(success);
            return;
        }

        if timestamp.is_some() {
            self.timestamped(rest);
            return;
        }

        match self.section {
            Section::Thinking | Section::Answer | Section::UserInstructions => {
                self.block.push(raw.to_string());
            }
            Section::Working => {
                if let Some(item) = working_item(trimmed) {
                    self.output.working.push(item.to_string());
                }
            }
            Section::Preamble | Section::Meta | Section::Body => self.marker_or_meta(trimmed),
        }
    }

    /// A `[<timestamp>] ...` line: opens a labelled block or ends the current one.
    fn timestamped(&mut self, rest: &str) {
        if rest.eq_ignore_ascii_case(THINKING_LABEL) {
            self.open(Section::Thinking);
        } else if let Some(inline) = strip_user_instructions(rest) {
            self.open(Section::UserInstructions);
            if !inline.is_empty() {
                self.block.push(inline.to_string());
            }
        } else if self.is_answer_label(rest) {
            self.open(Section::Answer);
        } else if self.section == Section::Working {
            if !rest.is_empty() {
                self.output.working.push(rest.to_string());
            }
        } else {
            self.close_block();
            if self.separators == 0 && !rest.is_empty() && self.output.header.banner.is_none() {
                self.output.header.banner = Some(rest.to_string());
            }
            self.section = self.resting_section();
        }
    }

    fn marker_or_meta(&mut self, trimmed: &str) {
        if trimmed == WORKING_MARKER {
            self.open(Section::Working);
        } else if trimmed == ANSWER_MARKER {
            self.open(Section::Answer);
        } else if let Some(inline) = strip_user_instructions(trimmed) {
            self.open(Section::UserInstructions);
            if !inline.is_empty() {
                self.block.push(inline.to_string());
            }
        } else if self.section == Section::Meta {
            if let Some((key, value)) = parse_meta_line(trimmed) {
                self.output.meta.insert(key, value);
            }
        }
    }

    fn is_answer_label(&self, label: &str) -> bool {
        if label.is_empty() {
            return false;
        }
        if let Some(agent) = self.output.header.agent.as_deref() {
            if agent.eq_ignore_ascii_case(label) {
                return true;
            }
        }
        AgentKind::from_name(label).is_some() || label.eq_ignore_ascii_case("assistant")
    }

    fn separator(&mut self) {
        self.close_block();
        self.separators += 1;
        self.section = if self.separators == 1 {
            Section::Meta
        } else {
            Section::Body
        };
    }

    /// Sections whose body is free text, where a lone separator may be a markdown rule.
    fn in_text_block(&self) -> bool {
        matches!(
            self.section,
            Section::Thinking | Section::Answer | Section::UserInstructions
        )
    }

    fn open(&mut self, section: Section) {
        self.close_block();
        self.section = section;
    }

    fn resting_section(&self) -> Section {
        match self.separators {
            0 => Section::Preamble,
            1 => Section::Meta,
            _ => Section::Body,
        }
    }

    fn close_block(&mut self) {
        let lines = std::mem::take(&mut self.block);
        let resting = self.resting_section();
        let section = std::mem::replace(&mut self.section, resting);
        let body = lines.join("\n");
        let body = body.trim();
        if body.is_empty() {
            return;
        }
        match section {
            Section::Thinking => self.thinking.push(body.to_string()),
            Section::Answer => self.output.answer = Some(body.to_string()),
            Section::UserInstructions => {
                if self.output.user_instructions.is_none() {
                    self.output.user_instructions = Some(body.to_string());
                }
            }
            _ => {}
        }
    }

    fn finish(mut self) -> ParsedAgentOutput {
        self.pending_separator = None;
        self.close_block();
        if !self.thinking.is_empty() {
            self.output.thinking = Some(self.thinking.join("\n\n"));
        }
        self.output
    }
}

fn parse_header(trimmed: &str) -> Option<(Option<String>, Option<String>)> {
    let rest = trimmed.strip_prefix("Agent:")?;
    let (agent, command) = rest.split_once("| Command:")?;
    Some((non_empty(agent), non_empty(command)))
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn is_separator(trimmed: &str) -> bool {
    trimmed.len() >= 8 && trimmed.bytes().all(|b| b == b'-')
}

/// Splits `[<timestamp>] rest`. Only brackets that open with a digit count, so markdown
/// links and checkboxes in free text are left alone.
fn split_timestamp(trimmed: &str) -> (Option<&str>, &str) {
    let Some(inner) = trimmed.strip_prefix('[') else {
        return (None, trimmed);
    };
    let Some((stamp, rest)) = inner.split_once(']') else {
        return (None, trimmed);
    };
    let looks_like_time = stamp.starts_with(|ch: char| ch.is_ascii_digit())
        && stamp.contains([':', '-'])
        && !stamp.contains(char::is_whitespace);
    if !looks_like_time {
        return (None, trimmed);
    }
    (Some(stamp), rest.trim())
}

/// `Some(None)` for a tokens line whose count is not a number.
fn parse_tokens_used(rest: &str) -> Option<Option<u64>> {
    let head = rest.get(..TOKENS_USED_LABEL.len())?;
    if !head.eq_ignore_ascii_case(TOKENS_USED_LABEL) {
        return None;
    }
    let digits: String = rest[TOKENS_USED_LABEL.len()..]
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, ',' | '_'))
        .collect();
    Some(digits.parse().ok())
}

fn parse_completion(rest: &str) -> Option<bool> {
    let lowered = rest.to_lowercase();
    if rest.starts_with(SUCCESS_GLYPH) && lowered.contains("completed successfully") {
        return Some(true);
    }
    if rest.starts_with(FAILURE_GLYPH)
        && ["command", "error", "failed"]
            .iter()
            .any(|needle| lowered.contains(needle))
    {
        return Some(false);
    }
    None
}

fn strip_user_instructions(text: &str) -> Option<&str> {
    let head = text.get(..USER_INSTRUCTIONS_LABEL.len())?;
    head.eq_ignore_ascii_case(USER_INSTRUCTIONS_LABEL)
        .then(|| text[USER_INSTRUCTIONS_LABEL.len()..].trim())
}

fn working_item(trimmed: &str) -> Option<&str> {
    let item = trimmed
        .strip_prefix(BULLET)
        .or_else(|| trimmed.strip_prefix('|'))
        .unwrap_or(trimmed)
        .trim();
    (!item.is_empty()).then_some(item)
}

fn parse_meta_line(trimmed: &str) -> Option<(&str, &str)> {
    let (key, value) = trimmed.split_once(':')?;
    let key = key.trim();
    let valid_key = !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_alphanumeric() || matches!(ch, ' ' | '_' | '-' | '.'));
    valid_key.then(|| (key, value.trim()))
}
