//! The line-oriented transcript markup shared by CLI agents and the stream decoders.
//!
//! ```text
//! Agent: codex | Command: exec
//! [2025-08-26T13:23:41] OpenAI Codex v0.23.0 (research preview)
//! --------
//! model: gpt-5
//! workdir: /repo
//! --------
//! [2025-08-26T13:23:42]
//! Working
//! • Read src/lib.rs
//! --------
//! [2025-08-26T13:23:45] thinking
//! **Planning**
//! [2025-08-26T13:23:46] codex
//! Done.
//! [2025-08-26T13:23:46] tokens used: 5347
//! ✅ Command completed successfully
//! ```
//!
//! Stream decoders write through [`MarkupWriter`] so that [`crate::parse_agent_output`] reads
//! their output exactly like a CLI transcript.

pub const SEPARATOR: &str = "--------";
pub const WORKING_MARKER: &str = "Working";
/// Opens the final answer in decoder-produced markup (CLI agents use `[ts] <agent>`).
pub const ANSWER_MARKER: &str = "Answer";
pub const THINKING_LABEL: &str = "thinking";
pub const USER_INSTRUCTIONS_LABEL: &str = "User instructions:";
pub const TOKENS_USED_LABEL: &str = "tokens used:";
pub const BULLET: char = '•';
pub const SUCCESS_GLYPH: char = '✅';
pub const FAILURE_GLYPH: char = '❌';

pub fn header_line(agent: &str, command: &str) -> String {
    format!("Agent: {agent} | Command: {command}")
}

/// Appends markup lines; every method leaves the output ending in a newline.
#[derive(Debug, Clone, Default)]
pub struct MarkupWriter {
    out: String,
}

impl MarkupWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&mut self, agent: &str, command: &str) -> &mut Self {
        self.line(&header_line(agent, command))
    }

    pub fn separator(&mut self) -> &mut Self {
        self.line(SEPARATOR)
    }

    pub fn meta(&mut self, key: &str, value: &str) -> &mut Self {
        self.line(&format!("{key}: {value}"))
    }

    pub fn working(&mut self) -> &mut Self {
        self.line(WORKING_MARKER)
    }

    pub fn bullet(&mut self, text: &str) -> &mut Self {
        self.line(&format!("{BULLET} {text}"))
    }

    /// Free-form body text, written verbatim.
    pub fn text(&mut self, body: &str) -> &mut Self {
        self.line(body)
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn line(&mut self, line: &str) -> &mut Self {
        self.out.push_str(line);
        if !line.ends_with('\n') {
            self.out.push('\n');
        }
        self
    }
}
