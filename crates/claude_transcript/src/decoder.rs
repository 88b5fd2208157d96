use agent_transcript::{
    AgentKind, DecoderConfig, FragmentError, FragmentReporter, JsonObjectExtractor, MarkupWriter,
    TranscriptDecoder, TranscriptUpdate, UpdateShaper,
};
use serde_json::Value;
use tracing::{debug, trace};

use crate::events::{ClaudeEvent, ContentPart, MessageContent, MessageEvent};

const DECODER_NAME: &str = "claude";
const STREAM_COMMAND: &str = "stream-json";
const TOOL_OUTPUT_LABEL: &str = "BashOutput";

/// Sections already written, plus what is known about the session.
///
/// The flags only ever go from `false` to `true` until [`TranscriptDecoder::reset`].
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ClaudeState {
    pub model: Option<String>,
    pub session_id: Option<String>,
    pub header_printed: bool,
    pub meta_printed: bool,
    pub working_printed: bool,
}

/// Decodes concatenated Claude stream-json objects into transcript markup.
///
/// Each call returns only the markup produced by that call, so applying the updates in order
/// reconstructs the whole transcript.
#[derive(Debug)]
pub struct ClaudeTranscriptDecoder {
    agent: String,
    state: ClaudeState,
    extractor: JsonObjectExtractor,
    shaper: UpdateShaper,
    reporter: FragmentReporter,
}

impl Default for ClaudeTranscriptDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaudeTranscriptDecoder {
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    pub fn with_config(mut config: DecoderConfig) -> Self {
        Self {
            agent: AgentKind::Claude.as_str().to_string(),
            state: ClaudeState::default(),
            extractor: JsonObjectExtractor::with_limit(config.limits.max_pending_bytes),
            shaper: UpdateShaper::new(config.output_mode),
            reporter: FragmentReporter::from_config(DECODER_NAME, &mut config),
        }
    }

    /// Sets the name written on the `Agent:` header line.
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = agent.into();
        self
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn state(&self) -> &ClaudeState {
        &self.state
    }

    /// Number of fragments dropped as malformed or oversized.
    pub fn dropped_fragments(&self) -> usize {
        self.reporter.dropped()
    }

    /// Applies one decoded event and returns the markup it produced (possibly empty).
    pub fn apply(&mut self, event: ClaudeEvent) -> String {
        let mut out = MarkupWriter::new();
        self.apply_into(event, &mut out);
        out.finish()
    }

    fn apply_into(&mut self, event: ClaudeEvent, out: &mut MarkupWriter) {
        match event {
            ClaudeEvent::System(system) => {
                if let Some(model) = system.model.filter(|model| !model.trim().is_empty()) {
                    self.state.model = Some(model);
                }
                if system.session_id.is_some() {
                    self.state.session_id = system.session_id;
                }
                self.ensure_header(out);
                self.ensure_meta(out);
            }
            ClaudeEvent::Assistant(event) => {
                if self.state.model.is_none() {
                    self.state.model = event.message.model.clone();
                }
                self.ensure_sections(out);
                write_assistant_parts(&event, out);
            }
            ClaudeEvent::User(event) => {
                self.ensure_sections(out);
                write_tool_results(&event, out);
            }
            ClaudeEvent::Result(result) => {
                if let Some(text) = result.text() {
                    out.separator().answer(text);
                }
            }
            ClaudeEvent::Ignored => trace!("ignoring unrecognized Claude event"),
        }
    }

    fn decode_fragment(&mut self, fragment: &str, out: &mut MarkupWriter) {
        let value: Value = match serde_json::from_str(fragment) {
            Ok(value) => value,
            Err(err) => {
                self.reporter.report(FragmentError::json_parse(&err, fragment));
                return;
            }
        };

        let event_type = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        match serde_json::from_value::<ClaudeEvent>(value) {
            Ok(event) => self.apply_into(event, out),
            Err(err) => self
                .reporter
                .report(FragmentError::typed_parse(&event_type, &err)),
        }
    }

    fn ensure_sections(&mut self, out: &mut MarkupWriter) {
        self.ensure_header(out);
        self.ensure_meta(out);
        self.ensure_working(out);
    }

    fn ensure_header(&mut self, out: &mut MarkupWriter) {
        if !self.state.header_printed {
            out.header(&self.agent, STREAM_COMMAND).separator();
            self.state.header_printed = true;
        }
    }

    fn ensure_meta(&mut self, out: &mut MarkupWriter) {
        if !self.state.meta_printed {
            if let Some(model) = self.state.model.as_deref() {
                out.meta("model", model);
            }
            out.separator();
            self.state.meta_printed = true;
        }
    }

    fn ensure_working(&mut self, out: &mut MarkupWriter) {
        if !self.state.working_printed {
            out.working();
            self.state.working_printed = true;
        }
    }

    fn report_discarded(&mut self) {
        if let Some(observed) = self.extractor.take_discarded() {
            let max = self.extractor.max_pending_bytes().unwrap_or_default();
            self.reporter.report(FragmentError::oversized(observed, max));
        }
    }
}

fn write_assistant_parts(event: &MessageEvent, out: &mut MarkupWriter) {
    match &event.message.content {
        MessageContent::Text(text) => write_text_bullets(text, out),
        MessageContent::Parts(parts) => {
            for part in parts {
                match part {
                    ContentPart::Text { text } => write_text_bullets(text, out),
                    ContentPart::ToolUse { name, input, .. } => {
                        write_labelled_bullets(name, &tool_label(input), out);
                    }
                    ContentPart::ToolResult { .. } | ContentPart::Other => {}
                }
            }
        }
    }
}

fn write_tool_results(event: &MessageEvent, out: &mut MarkupWriter) {
    let MessageContent::Parts(parts) = &event.message.content else {
        return;
    };
    for part in parts {
        if let ContentPart::ToolResult { content, .. } = part {
            let Some(content) = content.as_str().map(str::trim) else {
                continue;
            };
            if !content.is_empty() {
                write_labelled_bullets(TOOL_OUTPUT_LABEL, content, out);
            }
        }
    }
}

/// `label: <first line>`, then one bullet per further non-blank line, so no line of `text`
/// is ever read as a separator or section marker.
fn write_labelled_bullets(label: &str, text: &str, out: &mut MarkupWriter) {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
    let head = format!("{label}: {}", lines.next().unwrap_or_default());
    out.bullet(head.trim_end());
    for line in lines {
        out.bullet(line);
    }
}

/// One bullet per non-blank line, paragraph breaks included.
fn write_text_bullets(text: &str, out: &mut MarkupWriter) {
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        out.bullet(line);
    }
}

/// `command — description`, or whichever of the two is present.
fn tool_label(input: &Value) -> String {
    let field = |key: &str| {
        input
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };
    match (field("command"), field("description")) {
        (Some(command), Some(description)) => format!("{command} — {description}"),
        (Some(command), None) => command.to_string(),
        (None, Some(description)) => description.to_string(),
        (None, None) => String::new(),
    }
}

impl TranscriptDecoder for ClaudeTranscriptDecoder {
    fn feed(&mut self, chunk: &str) -> Option<TranscriptUpdate> {
        let fragments = self.extractor.feed(chunk);
        self.report_discarded();

        let mut out = MarkupWriter::new();
        for fragment in &fragments {
            self.decode_fragment(fragment, &mut out);
        }
        if out.is_empty() {
            return None;
        }
        self.shaper.shape(TranscriptUpdate::Append(out.finish()))
    }

    fn finish(&mut self) -> Option<TranscriptUpdate> {
        if self.extractor.in_object() {
            debug!(
                pending_bytes = self.extractor.pending().len(),
                "dropping incomplete trailing Claude object"
            );
        }
        self.extractor.reset();
        None
    }

    fn reset(&mut self) {
        self.state = ClaudeState::default();
        self.extractor.reset();
        self.shaper.reset();
    }
}
