//! Incremental UTF-8 line decoding for the streamed response body.
//!
//! Transport chunks can end in the middle of a multi-byte character. The
//! decoder keeps the incomplete tail and prepends it to the next chunk, so a
//! character split across reads decodes exactly as if it arrived whole.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;

use super::AnalysisError;

/// Raw response body as delivered by the transport.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, AnalysisError>> + Send>>;

/// Decoded text lines, without their `\n` (or `\r\n`) terminator.
pub type LineStream = Pin<Box<dyn Stream<Item = Result<String, AnalysisError>> + Send>>;

/// Stateful byte-to-line decoder.
#[derive(Debug, Default)]
pub struct LineDecoder {
    /// Trailing bytes of an incomplete UTF-8 sequence.
    pending: Vec<u8>,
    /// Decoded text not yet terminated by `\n`.
    buffer: String,
}

impl LineDecoder {
    /// Creates an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one transport chunk, returning every line it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        self.decode_pending();
        self.drain_lines()
    }

    /// Flushes the decoder at end of stream.
    ///
    /// Returns the unterminated final fragment, or `None` if it is empty.
    /// A truncated multi-byte sequence at the very end becomes U+FFFD.
    pub fn finish(&mut self) -> Option<String> {
        if !self.pending.is_empty() {
            self.pending.clear();
            self.buffer.push(char::REPLACEMENT_CHARACTER);
        }
        let mut line = std::mem::take(&mut self.buffer);
        if line.ends_with('\r') {
            line.pop();
        }
        if line.is_empty() {
            None
        } else {
            Some(line)
        }
    }

    /// Number of bytes held back waiting for the rest of a character.
    pub fn pending_bytes(&self) -> usize {
        self.pending.len()
    }

    fn decode_pending(&mut self) {
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    self.pending.clear();
                    return;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    self.buffer
                        .push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        // Incomplete sequence at the end: wait for the next chunk.
                        None => {
                            self.pending.drain(..valid);
                            return;
                        }
                        Some(invalid) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + invalid);
                        }
                    }
                }
            }
        }
    }

    fn drain_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(end) = self.buffer.find('\n') {
            let mut line: String = self.buffer.drain(..=end).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }
        lines
    }
}

struct DecodeState {
    bytes: ByteStream,
    decoder: LineDecoder,
    ready: VecDeque<String>,
    finished: bool,
}

/// Turns a byte stream into a lazy, finite stream of lines.
///
/// Each line is yielded as soon as its terminator arrives. A transport error
/// is yielded once and ends the stream. Polling after the end keeps
/// returning `None`.
pub fn decode_lines(bytes: ByteStream) -> LineStream {
    let state = DecodeState {
        bytes,
        decoder: LineDecoder::new(),
        ready: VecDeque::new(),
        finished: false,
    };

    let lines = stream::unfold(state, |mut state| async move {
        loop {
            if let Some(line) = state.ready.pop_front() {
                return Some((Ok(line), state));
            }
            if state.finished {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let completed = state.decoder.push(&chunk);
                    state.ready.extend(completed);
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(e), state));
                }
                None => {
                    state.finished = true;
                    if let Some(tail) = state.decoder.finish() {
                        state.ready.push_back(tail);
                    }
                }
            }
        }
    });

    Box::pin(lines.fuse())
}
