//! Decoding of streamed `/api/chat` replies.

use super::types::ChatChunk;
use crate::error::Cancelled;
use crate::Error;
use bytes::Bytes;
use futures_util::stream::FusedStream;
use futures_util::{stream, Stream, StreamExt};
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Text fragments of a streamed reply, in arrival order.
///
/// The stream is finite and single-pass. It ends after the record marked
/// `done`, or yields one error and then ends.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, Error>> + Send>>;

/// Turns newline-delimited records into the text fragments they carry.
pub struct ChunkStream<S> {
    lines: S,
    finished: bool,
}

impl<S> ChunkStream<S> {
    pub fn new(lines: S) -> Self {
        Self {
            lines,
            finished: false,
        }
    }
}

impl<S> Stream for ChunkStream<S>
where
    S: Stream<Item = Result<Bytes, Error>> + Unpin,
{
    type Item = Result<String, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            // Nothing past `done` or an error is ever read
            if self.finished {
                return Poll::Ready(None);
            }

            let line = match ready!(self.lines.poll_next_unpin(cx)) {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.finished = true;
                    return Poll::Ready(Some(Err(e)));
                }
                None => {
                    self.finished = true;
                    return Poll::Ready(None);
                }
            };

            if line.trim_ascii().is_empty() {
                continue;
            }

            let chunk: ChatChunk = match serde_json::from_slice(&line) {
                Ok(chunk) => chunk,
                Err(e) => {
                    self.finished = true;
                    return Poll::Ready(Some(Err(Error::Decoding(e))));
                }
            };

            if let Some(message) = chunk.error_message() {
                self.finished = true;
                return Poll::Ready(Some(Err(Error::provider(message))));
            }

            if chunk.done {
                self.finished = true;
            }

            if let Some(fragment) = chunk.fragment() {
                return Poll::Ready(Some(Ok(fragment)));
            }
        }
    }
}

impl<S> FusedStream for ChunkStream<S>
where
    S: Stream<Item = Result<Bytes, Error>> + Unpin,
{
    fn is_terminated(&self) -> bool {
        self.finished
    }
}

/// Race every read of `fragments` against `cancel`.
///
/// Cancellation yields a single [`Error::StreamRead`] wrapping
/// [`Cancelled`] and ends the stream, dropping the response body. A stream
/// that already ended is not raced, so a reply received in full is never
/// reported as cancelled.
pub fn cancellable<S>(fragments: S, cancel: CancellationToken) -> TextStream
where
    S: FusedStream<Item = Result<String, Error>> + Send + Unpin + 'static,
{
    let fragments = stream::unfold(Some((fragments, cancel)), |state| async move {
        let (mut fragments, cancel) = state?;
        if fragments.is_terminated() {
            return None;
        }

        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            item = fragments.next() => Some(item),
        };

        match next {
            None => Some((Err(Error::stream_read(Cancelled)), None)),
            Some(item) => item.map(|item| (item, Some((fragments, cancel)))),
        }
    });

    Box::pin(fragments)
}

/// Drain `fragments`, handing each one to `on_chunk` before reading the next.
///
/// Returns the concatenated text. On the first error the text gathered so
/// far is discarded and the error is returned.
pub async fn decode<S>(
    mut fragments: S,
    on_chunk: &mut (dyn FnMut(&str) + Send),
) -> Result<String, Error>
where
    S: Stream<Item = Result<String, Error>> + Unpin,
{
    let mut full = String::new();

    while let Some(fragment) = fragments.next().await {
        let fragment = fragment?;
        trace!(len = fragment.len(), "received chat fragment");
        on_chunk(&fragment);
        full.push_str(&fragment);
    }

    Ok(full)
}
