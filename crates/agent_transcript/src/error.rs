use thiserror::Error;
use tracing::debug;

use crate::config::{DecoderConfig, ErrorDetailCapture};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FragmentErrorCode {
    JsonParse,
    TypedParse,
    Oversized,
}

/// A fragment that was dropped while decoding.
///
/// `summary` never contains the fragment text; `details` may.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("dropped fragment ({code:?}): {summary}")]
pub struct FragmentError {
    pub code: FragmentErrorCode,
    pub summary: String,
    pub details: String,
}

impl FragmentError {
    pub fn json_parse(err: &serde_json::Error, fragment: &str) -> Self {
        Self {
            code: FragmentErrorCode::JsonParse,
            summary: format!(
                "invalid JSON at line {} column {}",
                err.line(),
                err.column()
            ),
            details: format!("{err}: {fragment}"),
        }
    }

    pub fn typed_parse(event_type: &str, err: &serde_json::Error) -> Self {
        Self {
            code: FragmentErrorCode::TypedParse,
            summary: format!("`{event_type}` event did not match its expected shape"),
            details: err.to_string(),
        }
    }

    pub fn oversized(observed_bytes: usize, max_pending_bytes: usize) -> Self {
        Self {
            code: FragmentErrorCode::Oversized,
            summary: format!(
                "pending fragment exceeded {max_pending_bytes} bytes (observed {observed_bytes})"
            ),
            details: format!(
                "discarded {observed_bytes} pending bytes; limit is {max_pending_bytes}"
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorDetail {
    /// 1-based count of dropped fragments for this decoder.
    pub fragment_index: usize,
    pub code: FragmentErrorCode,
    pub decoder: &'static str,
    pub details: String,
}

pub trait ErrorDetailSink: Send + 'static {
    fn on_error(&mut self, detail: ErrorDetail);
}

/// Errors surfaced by the reader adapters. Decoding itself never fails.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("I/O error while reading agent output: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid UTF-8 in agent output at byte {offset}")]
    InvalidUtf8 { offset: usize },
}

/// Logs dropped fragments and forwards full details to an optional sink.
pub struct FragmentReporter {
    decoder: &'static str,
    capture: ErrorDetailCapture,
    sink: Option<Box<dyn ErrorDetailSink>>,
    dropped: usize,
}

impl FragmentReporter {
    pub fn new(decoder: &'static str) -> Self {
        Self {
            decoder,
            capture: ErrorDetailCapture::RedactedSummaryOnly,
            sink: None,
            dropped: 0,
        }
    }

    pub fn from_config(decoder: &'static str, config: &mut DecoderConfig) -> Self {
        Self {
            decoder,
            capture: config.error_detail_capture,
            sink: config.error_sink.take(),
            dropped: 0,
        }
    }

    pub fn report(&mut self, err: FragmentError) {
        self.dropped += 1;
        debug!(
            decoder = self.decoder,
            code = ?err.code,
            "{}",
            err.summary
        );
        if self.capture == ErrorDetailCapture::FullDetails {
            if let Some(sink) = self.sink.as_mut() {
                sink.on_error(ErrorDetail {
                    fragment_index: self.dropped,
                    code: err.code,
                    decoder: self.decoder,
                    details: err.details,
                });
            }
        }
    }

    /// Number of fragments dropped so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl std::fmt::Debug for FragmentReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FragmentReporter")
            .field("decoder", &self.decoder)
            .field("capture", &self.capture)
            .field("dropped", &self.dropped)
            .finish()
    }
}
