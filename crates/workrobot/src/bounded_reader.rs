// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Size-capped ingestion of byte streams of unknown length.
//!
//! The buffer starts at a sixteenth of the limit and doubles each time it fills up,
//! never growing past `limit + 1` bytes. Holding that one extra byte is what tells an
//! input of exactly `limit` bytes apart from an oversized one. On overflow the buffer
//! is dropped, so callers never observe a truncated prefix.

use std::io::{ErrorKind, Read};

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::errors::BoundedReadError;

#[derive(Debug)]
struct BoundedBuffer {
    buf: Vec<u8>,
    filled: usize,
    limit: usize,
}

impl BoundedBuffer {
    fn new(limit: usize) -> Self {
        let initial = (limit / 16).max(1);
        BoundedBuffer {
            buf: vec![0; initial],
            filled: 0,
            limit,
        }
    }

    fn unfilled(&mut self) -> &mut [u8] {
        &mut self.buf[self.filled..]
    }

    /// Records `n` freshly read bytes and grows the buffer once it is full.
    fn advance(&mut self, n: usize) -> Result<(), BoundedReadError> {
        self.filled += n;
        if self.filled < self.buf.len() {
            return Ok(());
        }

        if self.filled > self.limit {
            return Err(BoundedReadError::LimitExceeded { limit: self.limit });
        }

        let grown = (self.buf.len() * 2).min(self.limit + 1);
        self.buf.resize(grown, 0);
        Ok(())
    }

    fn finish(mut self) -> Vec<u8> {
        self.buf.truncate(self.filled);
        self.buf.shrink_to_fit();
        self.buf
    }
}

/// Reads `reader` to the end, failing once more than `limit` bytes were produced.
pub fn read_bounded<R: Read>(mut reader: R, limit: usize) -> Result<Vec<u8>, BoundedReadError> {
    let mut buffer = BoundedBuffer::new(limit);
    loop {
        match reader.read(buffer.unfilled()) {
            Ok(0) => return Ok(buffer.finish()),
            Ok(n) => buffer.advance(n)?,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(BoundedReadError::Io(e)),
        }
    }
}

/// Async counterpart of [`read_bounded`].
pub async fn read_bounded_async<R: AsyncRead + Unpin>(
    mut reader: R,
    limit: usize,
) -> Result<Vec<u8>, BoundedReadError> {
    let mut buffer = BoundedBuffer::new(limit);
    loop {
        match reader.read(buffer.unfilled()).await {
            Ok(0) => return Ok(buffer.finish()),
            Ok(n) => buffer.advance(n)?,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(BoundedReadError::Io(e)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    const LIMIT: usize = 4096;

    /// Hands out at most `chunk` bytes per read call.
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        chunk: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.chunk.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    struct Failing {
        interrupted_once: bool,
    }

    impl Read for Failing {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted_once {
                self.interrupted_once = true;
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            Err(io::Error::new(ErrorKind::ConnectionReset, "peer went away"))
        }
    }

    #[test]
    fn test_exact_limit_is_accepted() {
        let data = vec![7u8; LIMIT];
        let read = read_bounded(Cursor::new(data.clone()), LIMIT).unwrap();
        assert_eq!(read.len(), LIMIT);
        assert_eq!(read, data);
    }

    #[test]
    fn test_one_byte_over_limit_is_rejected() {
        let result = read_bounded(Cursor::new(vec![7u8; LIMIT + 1]), LIMIT);
        assert!(matches!(
            result,
            Err(BoundedReadError::LimitExceeded { limit: LIMIT })
        ));
    }

    #[test]
    fn test_empty_stream() {
        let read = read_bounded(Cursor::new(Vec::new()), LIMIT).unwrap();
        assert!(read.is_empty());
    }

    #[test]
    fn test_zero_limit() {
        assert!(read_bounded(Cursor::new(Vec::new()), 0).unwrap().is_empty());
        assert!(read_bounded(Cursor::new(vec![1u8]), 0).is_err());
    }

    #[test]
    fn test_small_chunks_grow_buffer() {
        let data: Vec<u8> = (0..3000u32).map(|i| (i % 251) as u8).collect();
        let reader = Trickle {
            data: data.clone(),
            pos: 0,
            chunk: 7,
        };
        let read = read_bounded(reader, LIMIT).unwrap();
        assert_eq!(read, data);
    }

    #[test]
    fn test_buffer_never_exceeds_limit_plus_one() {
        let mut buffer = BoundedBuffer::new(LIMIT);
        while buffer.filled <= LIMIT {
            let n = buffer.unfilled().len();
            if buffer.advance(n).is_err() {
                break;
            }
            assert!(buffer.buf.len() <= LIMIT + 1);
        }
        assert_eq!(buffer.filled, LIMIT + 1);
    }

    #[test]
    fn test_io_error_propagates_after_interrupt() {
        let result = read_bounded(
            Failing {
                interrupted_once: false,
            },
            LIMIT,
        );
        match result {
            Err(BoundedReadError::Io(e)) => assert_eq!(e.kind(), ErrorKind::ConnectionReset),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_async_exact_limit_and_overflow() {
        let ok = read_bounded_async(&vec![1u8; LIMIT][..], LIMIT).await.unwrap();
        assert_eq!(ok.len(), LIMIT);

        let too_large = read_bounded_async(&vec![1u8; LIMIT + 1][..], LIMIT).await;
        assert!(matches!(
            too_large,
            Err(BoundedReadError::LimitExceeded { .. })
        ));
    }
}
