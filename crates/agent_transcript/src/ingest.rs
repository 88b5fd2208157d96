use std::io::Read;

use crate::config::DecoderLimits;
use crate::error::ReadError;
use crate::reader::SyncChunkReader;
use crate::update::{TranscriptDecoder, TranscriptUpdate};

/// Drains a byte source through a decoder, yielding each transcript update as it appears.
///
/// The decoder's `finish` is called once the source is exhausted.
pub struct TranscriptIngestor<R: Read, D: TranscriptDecoder> {
    reader: SyncChunkReader<R>,
    decoder: D,
    finished: bool,
}

impl<R: Read, D: TranscriptDecoder> TranscriptIngestor<R, D> {
    pub fn new(reader: R, decoder: D, limits: DecoderLimits) -> Self {
        Self {
            reader: SyncChunkReader::new(reader, limits.read_chunk_bytes),
            decoder,
            finished: false,
        }
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn into_decoder(self) -> D {
        self.decoder
    }
}

impl<R: Read, D: TranscriptDecoder> Iterator for TranscriptIngestor<R, D> {
    type Item = Result<TranscriptUpdate, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            match self.reader.next() {
                Some(Ok(chunk)) => {
                    if let Some(update) = self.decoder.feed(&chunk) {
                        return Some(Ok(update));
                    }
                }
                Some(Err(err)) => return Some(Err(err)),
                None => {
                    self.finished = true;
                    return self.decoder.finish().map(Ok);
                }
            }
        }
        None
    }
}

#[cfg(feature = "tokio")]
mod tokio_ingest {
    use tokio::io::AsyncRead;

    use crate::config::DecoderLimits;
    use crate::error::ReadError;
    use crate::reader::AsyncChunkReader;
    use crate::update::{TranscriptDecoder, TranscriptUpdate};

    pub struct AsyncTranscriptIngestor<R: AsyncRead + Unpin, D: TranscriptDecoder> {
        reader: AsyncChunkReader<R>,
        decoder: D,
        finished: bool,
    }

    impl<R: AsyncRead + Unpin, D: TranscriptDecoder> AsyncTranscriptIngestor<R, D> {
        pub fn new(reader: R, decoder: D, limits: DecoderLimits) -> Self {
            Self {
                reader: AsyncChunkReader::new(reader, limits.read_chunk_bytes),
                decoder,
                finished: false,
            }
        }

        pub fn into_decoder(self) -> D {
            self.decoder
        }

        pub async fn next_update(&mut self) -> Option<Result<TranscriptUpdate, ReadError>> {
            while !self.finished {
                match self.reader.next_chunk().await {
                    Some(Ok(chunk)) => {
                        if let Some(update) = self.decoder.feed(&chunk) {
                            return Some(Ok(update));
                        }
                    }
                    Some(Err(err)) => return Some(Err(err)),
                    None => {
                        self.finished = true;
                        return self.decoder.finish().map(Ok);
                    }
                }
            }
            None
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::update::TranscriptBuffer;

        #[derive(Default)]
        struct Upper;

        impl TranscriptDecoder for Upper {
            fn feed(&mut self, chunk: &str) -> Option<TranscriptUpdate> {
                Some(TranscriptUpdate::Append(chunk.to_uppercase()))
            }

            fn finish(&mut self) -> Option<TranscriptUpdate> {
                None
            }

            fn reset(&mut self) {}
        }

        #[tokio::test]
        async fn async_ingestor_drains_reader() {
            let limits = DecoderLimits {
                read_chunk_bytes: 3,
                ..DecoderLimits::default()
            };
            let mut ingestor = AsyncTranscriptIngestor::new(
                std::io::Cursor::new(b"working".to_vec()),
                Upper,
                limits,
            );

            let mut buffer = TranscriptBuffer::new();
            while let Some(update) = ingestor.next_update().await {
                buffer.apply(&update.unwrap());
            }
            assert_eq!(buffer.as_str(), "WORKING");
        }
    }
}

#[cfg(feature = "tokio")]
pub use tokio_ingest::AsyncTranscriptIngestor;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::TranscriptBuffer;

    /// Holds everything back until `finish`.
    #[derive(Default)]
    struct Deferred {
        seen: String,
    }

    impl TranscriptDecoder for Deferred {
        fn feed(&mut self, chunk: &str) -> Option<TranscriptUpdate> {
            self.seen.push_str(chunk);
            None
        }

        fn finish(&mut self) -> Option<TranscriptUpdate> {
            Some(TranscriptUpdate::Replace(std::mem::take(&mut self.seen)))
        }

        fn reset(&mut self) {
            self.seen.clear();
        }
    }

    #[test]
    fn finish_runs_once_at_end_of_input() {
        let limits = DecoderLimits {
            read_chunk_bytes: 4,
            ..DecoderLimits::default()
        };
        let ingestor = TranscriptIngestor::new(
            std::io::Cursor::new("Agent: test | Command: echo\n"),
            Deferred::default(),
            limits,
        );

        let updates: Vec<_> = ingestor.map(|update| update.unwrap()).collect();
        assert_eq!(updates.len(), 1);

        let mut buffer = TranscriptBuffer::new();
        buffer.apply(&updates[0]);
        assert_eq!(buffer.as_str(), "Agent: test | Command: echo\n");
    }
}
