use crate::error::ErrorDetailSink;

/// Update semantics requested by the caller of a decoder.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum OutputMode {
    /// Whatever the decoder produces natively (Codex rebuilds, Claude appends).
    #[default]
    Native,
    /// Always hand back the whole transcript so far.
    Replace,
    /// Hand back deltas; falls back to a tagged replace when the transcript was rewritten.
    Append,
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum ErrorDetailCapture {
    #[default]
    RedactedSummaryOnly,
    FullDetails,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct DecoderLimits {
    /// Cap on unconsumed text held between feeds. `None` keeps everything.
    pub max_pending_bytes: Option<usize>,
    /// Read size used by the chunk readers.
    pub read_chunk_bytes: usize,
}

impl Default for DecoderLimits {
    fn default() -> Self {
        Self {
            max_pending_bytes: None,
            read_chunk_bytes: 8 * 1024,
        }
    }
}

pub struct DecoderConfig {
    pub limits: DecoderLimits,
    pub output_mode: OutputMode,
    pub error_detail_capture: ErrorDetailCapture,
    pub error_sink: Option<Box<dyn ErrorDetailSink>>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            limits: DecoderLimits::default(),
            output_mode: OutputMode::Native,
            error_detail_capture: ErrorDetailCapture::RedactedSummaryOnly,
            error_sink: None,
        }
    }
}

impl std::fmt::Debug for DecoderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderConfig")
            .field("limits", &self.limits)
            .field("output_mode", &self.output_mode)
            .field("error_detail_capture", &self.error_detail_capture)
            .field("error_sink", &self.error_sink.is_some())
            .finish()
    }
}
