mod sync;

#[cfg(feature = "tokio")]
mod tokio;

pub use sync::SyncChunkReader;

#[cfg(feature = "tokio")]
pub use self::tokio::AsyncChunkReader;

use crate::error::ReadError;

/// Holds back a UTF-8 sequence split across reads until its remaining bytes arrive.
#[derive(Debug, Default)]
pub(crate) struct Utf8Carry {
    pending: Vec<u8>,
    offset: usize,
}

impl Utf8Carry {
    /// Decodes as much of the accumulated bytes as possible; `None` when nothing is complete yet.
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Result<Option<String>, ReadError> {
        self.pending.extend_from_slice(bytes);
        let valid = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(err) if err.error_len().is_none() => err.valid_up_to(),
            Err(err) => {
                return Err(ReadError::InvalidUtf8 {
                    offset: self.offset + err.valid_up_to(),
                })
            }
        };
        if valid == 0 {
            return Ok(None);
        }

        let text = std::str::from_utf8(&self.pending[..valid])
            .map(str::to_string)
            .map_err(|_| ReadError::InvalidUtf8 {
                offset: self.offset,
            })?;
        self.pending.drain(..valid);
        self.offset += valid;
        Ok(Some(text))
    }

    /// Fails if the stream ended in the middle of a character.
    pub(crate) fn finish(&mut self) -> Result<(), ReadError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.pending.clear();
        Err(ReadError::InvalidUtf8 {
            offset: self.offset,
        })
    }
}
