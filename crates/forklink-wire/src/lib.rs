//! Colon-delimited event/command wire protocol for coordinator/worker channels.
//!
//! This is the pure protocol layer of forklink. A frame is a run of tokens
//! separated by `:`, always starting with a magic token, then an opcode, then
//! the fields that opcode's category requires:
//!
//! ```text
//! :forklink-event:test-succeeded:normal-run:UTF-8:TXlUZXN0:-: ... :
//! ```
//!
//! Text fields are Base64-encoded in the frame's declared character encoding,
//! or a single `-` meaning "intentionally absent". The decoder resynchronizes
//! on malformed input instead of failing the stream.
//!
//! No I/O policy and no threading live here; see `forklink-channel` for the
//! transport and the background tasks that drive these codecs.

pub mod command;
pub mod decoder;
pub mod encoder;
pub mod encoding;
pub mod error;
pub mod event;
pub mod frame;
pub mod opcode;

pub use command::Command;
pub use decoder::{CommandStreamDecoder, EventStreamDecoder};
pub use encoder::{encode_command, encode_event};
pub use encoding::TextEncoding;
pub use error::{Result, WireError};
pub use event::{Event, ReportEntry, RunMode, StackTrace};
pub use frame::{
    classify_command_frame, classify_event_frame, FrameCompletion, COMMAND_MAGIC, EVENT_MAGIC,
    PLACEHOLDER, SEPARATOR,
};
pub use opcode::{CommandOpcode, EventOpcode, OpCategory};
