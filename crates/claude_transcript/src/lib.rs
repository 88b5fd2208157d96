#![forbid(unsafe_code)]
//! Claude dialect of the agent transcript pipeline.
//!
//! `claude --output-format stream-json` writes `system`, `assistant`, `user` and `result`
//! objects with no reliable framing. [`ClaudeTranscriptDecoder`] pulls complete objects out of
//! arbitrary chunks and writes the same markup a CLI agent prints, so
//! [`agent_transcript::parse_agent_output`] reads a live Claude session exactly like a finished
//! CLI run:
//!
//! ```text
//! Agent: claude | Command: stream-json
//! --------
//! model: claude-opus-4-1-20250805
//! --------
//! Working
//! • Bash: cargo test — run the suite
//! • BashOutput: test result: ok
//! --------
//! Answer
//! All tests pass.
//! ```

mod decoder;
mod events;

pub use decoder::{ClaudeState, ClaudeTranscriptDecoder};
pub use events::{
    ClaudeEvent, ContentPart, Message, MessageContent, MessageEvent, ResultEvent, SystemEvent,
};
