//! Resynchronizing stream decoders for event and command frames.
//!
//! The state machine is byte-oriented: before a frame has started, bytes are
//! discarded until a separator is seen, which is also how the decoder
//! recovers after a malformed frame. While a frame is in progress, each
//! separator closes the accumulated token, and the token list is classified
//! after every append. A malformed classification drops the frame and
//! resumes scanning from the very next byte; a complete classification hands
//! the tokens to translation.
//!
//! Reads are chunk-buffered internally, which preserves the byte-at-a-time
//! semantics while avoiding one syscall per byte.

use std::io::{ErrorKind, Read};
use std::mem;

use bytes::{Buf, BytesMut};
use tracing::warn;

use crate::command::Command;
use crate::event::Event;
use crate::frame::{classify_command_frame, classify_event_frame, FrameCompletion, SEPARATOR};

const READ_CHUNK_SIZE: usize = 8 * 1024;
const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Token scanner shared by both frame directions.
///
/// Owns the read buffer and the in-progress frame state; the classification
/// rule is passed in per call so the event and command decoders stay thin.
struct FrameScanner {
    buf: BytesMut,
    token: String,
    tokens: Vec<String>,
    frame_started: bool,
}

impl FrameScanner {
    fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            token: String::new(),
            tokens: Vec::new(),
            frame_started: false,
        }
    }

    /// Scan until the next complete frame. `Ok(None)` means the stream ended;
    /// a partial frame at end-of-input is dropped silently.
    fn next_frame<R: Read>(
        &mut self,
        inner: &mut R,
        classify: fn(&[String]) -> FrameCompletion,
    ) -> std::io::Result<Option<Vec<String>>> {
        while let Some(byte) = self.next_byte(inner)? {
            if !self.frame_started {
                if byte == SEPARATOR {
                    self.frame_started = true;
                    self.token.clear();
                    self.tokens.clear();
                }
                continue;
            }

            if byte != SEPARATOR {
                self.token.push(byte as char);
                continue;
            }

            self.tokens.push(mem::take(&mut self.token));
            match classify(&self.tokens) {
                FrameCompletion::Complete => {
                    self.frame_started = false;
                    return Ok(Some(mem::take(&mut self.tokens)));
                }
                FrameCompletion::Malformed => {
                    warn!(tokens = ?self.tokens, "malformed frame, resynchronizing");
                    self.frame_started = false;
                    self.tokens.clear();
                }
                FrameCompletion::NotComplete => {}
            }
        }
        Ok(None)
    }

    fn next_byte<R: Read>(&mut self, inner: &mut R) -> std::io::Result<Option<u8>> {
        if self.buf.is_empty() {
            let mut chunk = [0u8; READ_CHUNK_SIZE];
            loop {
                match inner.read(&mut chunk) {
                    Ok(0) => return Ok(None),
                    Ok(n) => {
                        self.buf.extend_from_slice(&chunk[..n]);
                        break;
                    }
                    Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                    Err(err) => return Err(err),
                }
            }
        }
        Ok(Some(self.buf.get_u8()))
    }
}

/// Decodes a lazy, unbounded sequence of events from a byte stream.
///
/// Malformed frames and frames whose payload fails to decode are logged and
/// skipped; only I/O failures and end-of-input stop the sequence.
pub struct EventStreamDecoder<R> {
    inner: R,
    scanner: FrameScanner,
}

impl<R: Read> EventStreamDecoder<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            scanner: FrameScanner::new(),
        }
    }

    /// The next successfully decoded event, or `Ok(None)` once the stream
    /// ends. A truncated frame at stream close is not an error.
    pub fn next_event(&mut self) -> std::io::Result<Option<Event>> {
        loop {
            let Some(tokens) = self
                .scanner
                .next_frame(&mut self.inner, classify_event_frame)?
            else {
                return Ok(None);
            };
            match Event::from_tokens(&tokens) {
                Ok(event) => return Ok(Some(event)),
                Err(err) => warn!(%err, ?tokens, "dropping frame with undecodable payload"),
            }
        }
    }

    /// Consume the decoder and return the inner stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// Decodes a sequence of commands from a byte stream; the worker-side twin
/// of [`EventStreamDecoder`].
pub struct CommandStreamDecoder<R> {
    inner: R,
    scanner: FrameScanner,
}

impl<R: Read> CommandStreamDecoder<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            scanner: FrameScanner::new(),
        }
    }

    /// The next successfully decoded command, or `Ok(None)` once the stream ends.
    pub fn next_command(&mut self) -> std::io::Result<Option<Command>> {
        loop {
            let Some(tokens) = self
                .scanner
                .next_frame(&mut self.inner, classify_command_frame)?
            else {
                return Ok(None);
            };
            match Command::from_tokens(&tokens) {
                Ok(command) => return Ok(Some(command)),
                Err(err) => warn!(%err, ?tokens, "dropping frame with undecodable payload"),
            }
        }
    }

    /// Consume the decoder and return the inner stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}
