//! Incremental extraction of top-level JSON object literals from unframed text.
//!
//! Producers such as `claude --output-format stream-json` may deliver objects back to back
//! with no delimiter, split at arbitrary points. [`JsonObjectExtractor`] buffers the text and
//! hands out each object's exact source text once its closing brace arrives. Braces inside
//! string literals are ignored.

use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct JsonObjectExtractor {
    buffer: String,
    /// Bytes of `buffer` already scanned.
    scanned: usize,
    depth: usize,
    in_string: bool,
    escaped: bool,
    object_start: usize,
    max_pending_bytes: Option<usize>,
    discarded: Option<usize>,
}

impl JsonObjectExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the pending buffer; a partial object that outgrows it is discarded.
    pub fn with_limit(max_pending_bytes: Option<usize>) -> Self {
        Self {
            max_pending_bytes,
            ..Self::default()
        }
    }

    /// Appends `chunk` and returns every object completed by it, in source order.
    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        let mut objects = Vec::new();
        if chunk.is_empty() {
            return objects;
        }

        self.buffer.push_str(chunk);
        let bytes = self.buffer.as_bytes();
        let mut consumed = 0usize;

        for (idx, &byte) in bytes.iter().enumerate().skip(self.scanned) {
            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if byte == b'\\' {
                    self.escaped = true;
                } else if byte == b'"' {
                    self.in_string = false;
                }
                continue;
            }

            match byte {
                b'"' if self.depth > 0 => self.in_string = true,
                b'{' => {
                    if self.depth == 0 {
                        self.object_start = idx;
                    }
                    self.depth += 1;
                }
                b'}' if self.depth > 0 => {
                    self.depth -= 1;
                    if self.depth == 0 {
                        objects.push(self.buffer[self.object_start..=idx].to_string());
                        consumed = idx + 1;
                    }
                }
                _ => {}
            }
        }

        self.scanned = self.buffer.len();
        if consumed > 0 {
            self.buffer.drain(..consumed);
            self.scanned -= consumed;
            self.object_start = self.object_start.saturating_sub(consumed);
        }

        self.enforce_limit();
        objects
    }

    /// Text received but not yet part of a complete object.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// `true` while an object has been opened but not closed.
    pub fn in_object(&self) -> bool {
        self.depth > 0
    }

    pub fn max_pending_bytes(&self) -> Option<usize> {
        self.max_pending_bytes
    }

    /// Bytes thrown away by the pending-size cap since the last call.
    pub fn take_discarded(&mut self) -> Option<usize> {
        self.discarded.take()
    }

    pub fn reset(&mut self) {
        *self = Self::with_limit(self.max_pending_bytes);
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
            "discarding oversized pending JSON fragment"
        );
        let discarded = self.discarded.unwrap_or(0) + observed;
        self.reset();
        self.discarded = Some(discarded);
    }
}
