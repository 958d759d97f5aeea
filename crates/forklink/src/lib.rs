//! Reliable, ordered delivery of structured execution events and control
//! commands between a coordinating process and the worker processes it
//! spawns.
//!
//! The workspace splits into two layers, re-exported here:
//!
//! - [`forklink_wire`]: the pure protocol. Colon-delimited frames, the
//!   closed opcode sets, Base64 payload fields with per-frame character
//!   encodings, and the resynchronizing stream decoders.
//! - [`forklink_channel`]: the transports. A per-worker channel that is
//!   either a loopback TCP connection or the worker's inherited standard
//!   streams, the background consumer/feeder threads, and the shared-close
//!   coordinator for jointly-owned connections.
//!
//! A coordinator typically creates one [`SocketChannel`] (or [`PipeChannel`])
//! per worker, hands the worker its [`connection string`](WorkerChannel::connection_string),
//! opens the channel, and binds an [`EventConsumer`] and a [`CommandFeeder`]
//! to it:
//!
//! ```no_run
//! use forklink::{
//!     Command, CommandSource, Event, SharedCloser, SocketChannel, WorkerChannel,
//! };
//!
//! struct Once(Option<Command>);
//! impl CommandSource for Once {
//!     fn next_command(&mut self) -> Option<Command> {
//!         self.0.take()
//!     }
//! }
//!
//! # fn main() -> forklink::channel::Result<()> {
//! let mut channel = SocketChannel::new(1)?;
//! let connection_string = channel.connection_string(); // give to the worker
//! channel.open()?; // blocks until the worker dials back
//!
//! let closer = SharedCloser::new(1, || { /* tear down the channel */ });
//! let consumer = channel.bind_event_consumer(
//!     Box::new(|event: Event| println!("{event:?}")),
//!     closer,
//!     None,
//! )?;
//! let handle = consumer.start()?;
//! # Ok(())
//! # }
//! ```

pub use forklink_channel as channel;
pub use forklink_wire as wire;

pub use forklink_channel::{
    ChannelError, CommandFeeder, CommandFeederHandle, CommandSource, ConnectionString,
    EventConsumer, EventConsumerHandle, EventHandler, PipeChannel, SharedCloser, SocketChannel,
    WorkerChannel,
};
pub use forklink_wire::{
    encode_command, encode_event, Command, CommandOpcode, CommandStreamDecoder, Event,
    EventOpcode, EventStreamDecoder, OpCategory, ReportEntry, RunMode, StackTrace, TextEncoding,
    WireError,
};
