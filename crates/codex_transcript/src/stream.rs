//! Line framing for Codex output.
//!
//! `codex exec --json` prints one JSON event per line, but the bytes arrive in arbitrary
//! chunks, sometimes with `\r` or `\r\n` endings and sometimes wrapped in server-sent-event
//! framing (`event:`, `id:`, `data:`). [`CodexStreamAccumulator`] turns that into a sequence of
//! bare payload lines.

use tracing::warn;

const DONE_SENTINEL: &str = "[DONE]";

/// Strips SSE framing from one line; `None` means the line carries no payload.
///
/// - blank lines, `event:` and `id:` lines are dropped;
/// - `data:` is unwrapped, and empty data or the `[DONE]` sentinel is dropped;
/// - anything else is returned trimmed.
pub fn normalize_line(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(data) = trimmed.strip_prefix("data:") {
        let data = data.trim();
        if data.is_empty() || data == DONE_SENTINEL {
            return None;
        }
        return Some(data);
    }

    if trimmed.starts_with("event:") || trimmed.starts_with("id:") {
        return None;
    }

    Some(trimmed)
}

#[derive(Debug, Clone, Default)]
pub struct CodexStreamAccumulator {
    buffer: String,
    max_pending_bytes: Option<usize>,
    discarded: Option<usize>,
}

impl CodexStreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the unterminated tail; a line that outgrows it is discarded.
    pub fn with_limit(max_pending_bytes: Option<usize>) -> Self {
        Self {
            max_pending_bytes,
            ..Self::default()
        }
    }

    /// Appends `chunk` and returns the payload of every line it terminated.
    ///
    /// `\r`, `\n` and `\r\n` all end a line; runs of separators never yield empty lines.
    pub fn push_chunk(&mut self, chunk: &str) -> Vec<String> {
        let mut lines = Vec::new();
        if chunk.is_empty() {
            return lines;
        }

        self.buffer.push_str(chunk);
        let mut start = 0usize;
        for (idx, byte) in self.buffer.bytes().enumerate() {
            if byte != b'\n' && byte != b'\r' {
                continue;
            }
            if start < idx {
                if let Some(payload) = normalize_line(&self.buffer[start..idx]) {
                    lines.push(payload.to_string());
                }
            }
            start = idx + 1;
        }

        if start > 0 {
            self.buffer.drain(..start);
        }
        self.enforce_limit();
        lines
    }

    /// Returns the payload of the unterminated tail, if any, and clears it.
    pub fn flush(&mut self) -> Option<String> {
        let tail = std::mem::take(&mut self.buffer);
        normalize_line(&tail).map(str::to_string)
    }

    pub fn pending(&self) -> &str {
        &self.buffer
    }

    pub fn max_pending_bytes(&self) -> Option<usize> {
        self.max_pending_bytes
    }

    /// Bytes thrown away by the pending-size cap since the last call.
    pub fn take_discarded(&mut self) -> Option<usize> {
        self.discarded.take()
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.discarded = None;
    }

    fn enforce_limit(&mut self) {
        let Some(max) = self.max_pending_bytes else {
            return;
        };
        let observed = self.buffer.len();
        if observed <= max {
            return;
        }

        warn!(
            observed_bytes = observed,
            max_pending_bytes = max,
            "discarding oversized unterminated Codex line"
        );
        self.buffer.clear();
        self.discarded = Some(self.discarded.unwrap_or(0) + observed);
    }
}
