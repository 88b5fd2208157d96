use std::io::{ErrorKind, Read};

use super::Utf8Carry;
use crate::error::ReadError;

/// Reads text chunks of at most `chunk_bytes` bytes, never splitting a character.
pub struct SyncChunkReader<R: Read> {
    reader: R,
    buffer: Vec<u8>,
    carry: Utf8Carry,
    done: bool,
}

impl<R: Read> SyncChunkReader<R> {
    pub fn new(reader: R, chunk_bytes: usize) -> Self {
        Self {
            reader,
            buffer: vec![0u8; chunk_bytes.max(1)],
            carry: Utf8Carry::default(),
            done: false,
        }
    }
}

impl<R: Read> Iterator for SyncChunkReader<R> {
    type Item = Result<String, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.reader.read(&mut self.buffer) {
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
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.done = true;
                    return Some(Err(ReadError::Io(err)));
                }
            }
        }
        None
    }
}
