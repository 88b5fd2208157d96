use tokio::io::{AsyncRead, AsyncReadExt};

use super::Utf8Carry;
use crate::error::ReadError;

/// Async counterpart of [`super::SyncChunkReader`].
pub struct AsyncChunkReader<R: AsyncRead + Unpin> {
    reader: R,
    buffer: Vec<u8>,
    carry: Utf8Carry,
    done: bool,
}

impl<R: AsyncRead + Unpin> AsyncChunkReader<R> {
    pub fn new(reader: R, chunk_bytes: usize) -> Self {
        Self {
            reader,
            buffer: vec![0u8; chunk_bytes.max(1)],
            carry: Utf8Carry::default(),
            done: false,
        }
    }

    pub async fn next_chunk(&mut self) -> Option<Result<String, ReadError>> {
        while !self.done {
            match self.reader.read(&mut self.buffer).await {
                Ok(0) => {
                    self.done = true;
                    return self.carry.finish().err().map(Err);
                }
                Ok(n) => match self.carry.push(&self.buffer[..n]) {
                    Ok(Some(text)) => return Some(Ok(text)),
                    Ok(None) => continue,
                    Err(err) => {
                        self.done = true;
                        return Some(Err(err));
                    }
                },
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.done = true;
                    return Some(Err(ReadError::Io(err)));
                }
            }
        }
        None
    }
}
