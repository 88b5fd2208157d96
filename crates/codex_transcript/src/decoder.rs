use agent_transcript::{
    sanitize_cli_output_line, AgentKind, DecoderConfig, FragmentError, FragmentReporter,
    TranscriptDecoder, TranscriptUpdate, UpdateShaper,
};
use serde_json::Value;
use tracing::trace;

use crate::events::{ItemDetails, ThreadEvent, ThreadItem, Usage};
use crate::render;
use crate::stream::{normalize_line, CodexStreamAccumulator};

const DECODER_NAME: &str = "codex";

/// A rendered block, keyed by the item id that produced it (if any).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RenderedBlock {
    pub id: Option<String>,
    pub text: String,
}

/// Everything seen so far in one Codex session.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct CodexState {
    pub thread_id: Option<String>,
    pub reasoning: Vec<RenderedBlock>,
    pub messages: Vec<RenderedBlock>,
    pub usage: Option<Usage>,
}

impl CodexState {
    /// Reasoning, then messages, then the token summary, separated by blank lines.
    pub fn render(&self) -> String {
        let usage = self.usage.as_ref().map(render::token_summary);
        self.reasoning
            .iter()
            .chain(&self.messages)
            .map(|block| block.text.as_str())
            .chain(usage.as_deref())
            .collect::<Vec<_>>()
            .join(render::BLOCK_SEPARATOR)
    }
}

/// Decodes Codex JSON events; every visible change rebuilds the whole transcript.
///
/// Item events that reuse an id replace the block that id rendered earlier, so an
/// `item.started` for a command is superseded by its `item.completed`.
#[derive(Debug)]
pub struct CodexTranscriptDecoder {
    state: CodexState,
    accumulator: CodexStreamAccumulator,
    shaper: UpdateShaper,
    reporter: FragmentReporter,
}

impl Default for CodexTranscriptDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl CodexTranscriptDecoder {
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    pub fn with_config(mut config: DecoderConfig) -> Self {
        Self {
            state: CodexState::default(),
            accumulator: CodexStreamAccumulator::with_limit(config.limits.max_pending_bytes),
            shaper: UpdateShaper::new(config.output_mode),
            reporter: FragmentReporter::from_config(DECODER_NAME, &mut config),
        }
    }

    pub fn state(&self) -> &CodexState {
        &self.state
    }

    /// Number of fragments dropped as malformed or oversized.
    pub fn dropped_fragments(&self) -> usize {
        self.reporter.dropped()
    }

    /// Decodes one complete line; returns the rebuilt transcript when it changed.
    ///
    /// Malformed lines are dropped and leave the state untouched.
    pub fn feed_line(&mut self, line: &str) -> Option<String> {
        let payload = normalize_line(line)?;
        let value: Value = match serde_json::from_str(payload) {
            Ok(value) => value,
            Err(err) => {
                self.reporter.report(FragmentError::json_parse(&err, payload));
                return None;
            }
        };

        let event_type = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let event = match ThreadEvent::from_value(value) {
            Ok(event) => event,
            Err(err) => {
                self.reporter
                    .report(FragmentError::typed_parse(&event_type, &err));
                return None;
            }
        };

        self.apply(event).then(|| self.state.render())
    }

    /// Frames an arbitrary chunk of CLI output into lines and decodes each one.
    ///
    /// Known Node.js warning noise is filtered before decoding.
    pub fn feed_chunk(&mut self, chunk: &str) -> Option<TranscriptUpdate> {
        let lines = self.accumulator.push_chunk(chunk);
        self.report_discarded();
        let latest = self.feed_lines(lines);
        latest.and_then(|text| self.shaper.shape(TranscriptUpdate::Replace(text)))
    }

    /// Applies a decoded event; `true` when the transcript changed.
    pub fn apply(&mut self, event: ThreadEvent) -> bool {
        match event {
            ThreadEvent::ThreadStarted(started) => {
                self.state.thread_id = Some(started.thread_id);
                false
            }
            ThreadEvent::TurnStarted | ThreadEvent::Error(_) => false,
            ThreadEvent::TurnCompleted(completed) => match completed.usage {
                Some(usage) => {
                    self.state.usage = Some(usage);
                    true
                }
                None => false,
            },
            ThreadEvent::Item(event) => self.apply_item(event.item),
            ThreadEvent::ResponseCompleted(completed) => {
                let text = completed.text();
                let text = text.trim();
                if text.is_empty() {
                    return false;
                }
                self.state.messages.push(RenderedBlock {
                    id: None,
                    text: text.to_string(),
                });
                true
            }
            ThreadEvent::ResponseError(error) => {
                self.state.messages.push(RenderedBlock {
                    id: None,
                    text: render::error_block(error.message()),
                });
                true
            }
            ThreadEvent::Ignored { event_type } => {
                trace!(event_type = %event_type, "ignoring unrecognized Codex event");
                false
            }
        }
    }

    fn apply_item(&mut self, item: ThreadItem) -> bool {
        let ThreadItem { id, details } = item;
        if details == ItemDetails::Unknown {
            trace!(item_id = ?id, "ignoring unrecognized Codex item");
            return false;
        }

        let Some(text) = render::item_block(&details) else {
            return false;
        };
        let blocks = if matches!(details, ItemDetails::Reasoning(_)) {
            &mut self.state.reasoning
        } else {
            &mut self.state.messages
        };
        upsert(blocks, id, text)
    }

    fn feed_lines(&mut self, lines: Vec<String>) -> Option<String> {
        let codex = AgentKind::Codex.as_str();
        let mut latest = None;
        for line in lines {
            let Some(line) = sanitize_cli_output_line(codex, &line) else {
                continue;
            };
            if let Some(text) = self.feed_line(&line) {
                latest = Some(text);
            }
        }
        latest
    }

    fn report_discarded(&mut self) {
        let max = self.accumulator.max_pending_bytes().unwrap_or_default();
        if let Some(observed) = self.accumulator.take_discarded() {
            self.reporter.report(FragmentError::oversized(observed, max));
        }
    }
}

fn upsert(blocks: &mut Vec<RenderedBlock>, id: Option<String>, text: String) -> bool {
    if let Some(id) = id.as_deref() {
        if let Some(existing) = blocks
            .iter_mut()
            .find(|block| block.id.as_deref() == Some(id))
        {
            if existing.text == text {
                return false;
            }
            existing.text = text;
            return true;
        }
    }
    blocks.push(RenderedBlock { id, text });
    true
}

impl TranscriptDecoder for CodexTranscriptDecoder {
    fn feed(&mut self, chunk: &str) -> Option<TranscriptUpdate> {
        self.feed_chunk(chunk)
    }

    fn finish(&mut self) -> Option<TranscriptUpdate> {
        let tail = self.accumulator.flush()?;
        let latest = self.feed_lines(vec![tail])?;
        self.shaper.shape(TranscriptUpdate::Replace(latest))
    }

    fn reset(&mut self) {
        self.state = CodexState::default();
        self.accumulator.reset();
        self.shaper.reset();
    }
}
