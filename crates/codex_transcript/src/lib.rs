#![forbid(unsafe_code)]
//! Codex dialect of the agent transcript pipeline.
//!
//! [`CodexTranscriptDecoder`] consumes the JSON event lines printed by `codex exec --json`
//! (optionally wrapped in server-sent-event framing) and, whenever an event changes what should
//! be displayed, rebuilds the whole transcript as markdown:
//!
//! ````text
//! _Reasoning summary_
//!
//! ✅ `cargo test`
//! ```
//! test result: ok
//! ```
//!
//! Final answer text.
//!
//! Tokens used: 1,250 total (1,000 in, 250 out)
//! ````
//!
//! Updates are [`TranscriptUpdate::Replace`](agent_transcript::TranscriptUpdate::Replace) by
//! default; set [`OutputMode::Append`](agent_transcript::OutputMode::Append) in the
//! [`DecoderConfig`](agent_transcript::DecoderConfig) to receive deltas instead.

mod decoder;
mod events;
mod render;
mod stream;

pub use decoder::{CodexState, CodexTranscriptDecoder, RenderedBlock};
pub use events::{
    CommandExecutionItem, ErrorItem, EventError, FileChangeItem, FileChangeKind, FileUpdate,
    ItemDetails, ItemEvent, ItemStatus, McpToolCallItem, ResponseCompleted, ResponseError,
    TextItem, ThreadEvent, ThreadItem, ThreadStarted, TodoEntry, TodoListItem, TurnCompleted,
    Usage, WebSearchItem,
};
pub use render::{format_count, status_glyph, token_summary};
pub use stream::{normalize_line, CodexStreamAccumulator};
