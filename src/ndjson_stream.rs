//! Stream adapter for splitting newline-delimited records out of byte chunks.

use crate::Error;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

/// Longest record that may be buffered while waiting for its newline.
pub const MAX_LINE_BYTES: usize = 1_000_000;

/// A stream adapter that yields one record per line of a byte stream.
/// Maintains internal state to handle lines split across chunks.
///
/// Yielded lines have the trailing `\n` removed; blank lines are passed
/// through so the consumer decides how to treat them. A final line without
/// a trailing newline is yielded when the inner stream ends.
pub struct NdjsonStream<S> {
    /// The underlying byte stream
    inner: S,
    /// Bytes of the line currently being assembled
    buffer: Vec<u8>,
    /// Complete lines ready to be yielded
    lines: VecDeque<Bytes>,
    /// Set once the inner stream has ended or failed
    exhausted: bool,
}

impl<S> NdjsonStream<S> {
    /// Create a new line stream from a byte stream.
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            buffer: Vec::new(),
            lines: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Move every complete line in the buffer onto the ready queue.
    fn split_buffer(&mut self) {
        let mut start = 0;

        while let Some(pos) = memchr::memchr(b'\n', &self.buffer[start..]) {
            let end = start + pos;
            self.lines
                .push_back(Bytes::copy_from_slice(&self.buffer[start..end]));
            start = end + 1;
        }

        if start > 0 {
            self.buffer.drain(..start);
        }
    }
}

impl<S, E> Stream for NdjsonStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Into<crate::error::BoxError>,
{
    type Item = Result<Bytes, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            // Yield already split lines in arrival order
            if let Some(line) = self.lines.pop_front() {
                return Poll::Ready(Some(Ok(line)));
            }

            if self.exhausted {
                return Poll::Ready(None);
            }

            let chunk = match ready!(self.inner.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    self.exhausted = true;
                    self.buffer.clear();
                    return Poll::Ready(Some(Err(Error::stream_read(e))));
                }
                None => {
                    self.exhausted = true;
                    if self.buffer.is_empty() {
                        return Poll::Ready(None);
                    }
                    let rest = std::mem::take(&mut self.buffer);
                    return Poll::Ready(Some(Ok(Bytes::from(rest))));
                }
            };

            self.buffer.extend_from_slice(&chunk);
            self.split_buffer();

            // Whatever is left has no newline yet
            if self.buffer.len() > MAX_LINE_BYTES {
                self.exhausted = true;
                self.buffer.clear();
                self.lines.clear();
                return Poll::Ready(Some(Err(Error::stream_read(format!(
                    "line exceeded maximum size of {MAX_LINE_BYTES} bytes"
                )))));
            }
        }
    }
}

/// Extension trait to add line splitting to byte streams.
pub trait NdjsonStreamExt: Stream {
    /// Split this byte stream into newline-delimited records.
    fn ndjson_lines(self) -> NdjsonStream<Self>
    where
        Self: Sized,
    {
        NdjsonStream::new(self)
    }
}

impl<S: Stream> NdjsonStreamExt for S {}
