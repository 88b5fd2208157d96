use crate::config::OutputMode;

/// Transcript text produced by a decoder, tagged with how the caller should apply it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TranscriptUpdate {
    /// The complete transcript so far; replaces whatever is displayed.
    Replace(String),
    /// Newly produced text; appended to what is displayed.
    Append(String),
}

impl TranscriptUpdate {
    pub fn text(&self) -> &str {
        match self {
            Self::Replace(text) | Self::Append(text) => text,
        }
    }

    pub fn is_replace(&self) -> bool {
        matches!(self, Self::Replace(_))
    }
}

/// A stateful per-session translator from one agent's raw output into transcript markup.
///
/// `None` means the input produced no visible change, which is distinct from an empty update.
pub trait TranscriptDecoder {
    fn feed(&mut self, chunk: &str) -> Option<TranscriptUpdate>;

    /// Flushes anything held back waiting for more input.
    fn finish(&mut self) -> Option<TranscriptUpdate>;

    fn reset(&mut self);
}

/// Caller-side view of a transcript, maintained by applying updates in order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct TranscriptBuffer {
    text: String,
}

impl TranscriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, update: &TranscriptUpdate) {
        match update {
            TranscriptUpdate::Replace(text) => {
                self.text.clear();
                self.text.push_str(text);
            }
            TranscriptUpdate::Append(text) => self.text.push_str(text),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

/// Converts a decoder's native updates into the [`OutputMode`] the caller asked for.
#[derive(Debug, Clone, Default)]
pub struct UpdateShaper {
    mode: OutputMode,
    rendered: String,
}

impl UpdateShaper {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            rendered: String::new(),
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn shape(&mut self, native: TranscriptUpdate) -> Option<TranscriptUpdate> {
        match (self.mode, native) {
            (OutputMode::Native, native) => Some(native),
            (OutputMode::Replace, TranscriptUpdate::Replace(text)) => {
                self.rendered.clone_from(&text);
                Some(TranscriptUpdate::Replace(text))
            }
            (OutputMode::Replace, TranscriptUpdate::Append(delta)) => {
                self.rendered.push_str(&delta);
                Some(TranscriptUpdate::Replace(self.rendered.clone()))
            }
            (OutputMode::Append, TranscriptUpdate::Append(delta)) => {
                self.rendered.push_str(&delta);
                Some(TranscriptUpdate::Append(delta))
            }
            (OutputMode::Append, TranscriptUpdate::Replace(text)) => {
                let shaped = match text.strip_prefix(self.rendered.as_str()) {
                    Some("") => None,
                    Some(delta) => Some(TranscriptUpdate::Append(delta.to_string())),
                    None => Some(TranscriptUpdate::Replace(text.clone())),
                };
                self.rendered = text;
                shaped
            }
        }
    }

    pub fn reset(&mut self) {
        self.rendered.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_applies_replace_and_append() {
        let mut buffer = TranscriptBuffer::new();
        buffer.apply(&TranscriptUpdate::Append("a".into()));
        buffer.apply(&TranscriptUpdate::Append("b".into()));
        assert_eq!(buffer.as_str(), "ab");
        buffer.apply(&TranscriptUpdate::Replace("z".into()));
        assert_eq!(buffer.as_str(), "z");
    }

    #[test]
    fn replace_mode_accumulates_deltas() {
        let mut shaper = UpdateShaper::new(OutputMode::Replace);
        shaper.shape(TranscriptUpdate::Append("one\n".into()));
        let out = shaper.shape(TranscriptUpdate::Append("two\n".into()));
        assert_eq!(out, Some(TranscriptUpdate::Replace("one\ntwo\n".into())));
    }

    #[test]
    fn append_mode_diffs_rebuilds_and_falls_back_on_rewrite() {
        let mut shaper = UpdateShaper::new(OutputMode::Append);
        assert_eq!(
            shaper.shape(TranscriptUpdate::Replace("ab".into())),
            Some(TranscriptUpdate::Append("ab".into()))
        );
        assert_eq!(
            shaper.shape(TranscriptUpdate::Replace("abcd".into())),
            Some(TranscriptUpdate::Append("cd".into()))
        );
        assert_eq!(shaper.shape(TranscriptUpdate::Replace("abcd".into())), None);
        assert_eq!(
            shaper.shape(TranscriptUpdate::Replace("xy".into())),
            Some(TranscriptUpdate::Replace("xy".into()))
        );
    }

    #[test]
    fn shaped_updates_rebuild_the_same_text() {
        let native = [
            TranscriptUpdate::Replace("a".into()),
            TranscriptUpdate::Replace("ab".into()),
            TranscriptUpdate::Replace("b".into()),
            TranscriptUpdate::Replace("bc".into()),
        ];
        for mode in [OutputMode::Native, OutputMode::Replace, OutputMode::Append] {
            let mut shaper = UpdateShaper::new(mode);
            let mut buffer = TranscriptBuffer::new();
            for update in native.iter().cloned() {
                if let Some(shaped) = shaper.shape(update) {
                    buffer.apply(&shaped);
                }
            }
            assert_eq!(buffer.as_str(), "bc", "{mode:?}");
        }
    }
}
