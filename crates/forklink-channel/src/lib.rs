//! Worker channel transports and the background threads that drive them.
//!
//! A [`WorkerChannel`] is one worker's connection slot: it owns either an
//! accepted loopback TCP connection ([`SocketChannel`]) or nothing beyond the
//! worker's inherited standard streams ([`PipeChannel`]), and it manufactures
//! the two background tasks bound to those streams: an [`EventConsumer`]
//! decoding inbound event frames and a [`CommandFeeder`] serializing outbound
//! commands.
//!
//! When both directions share one physical connection (the socket strategy),
//! the [`SharedCloser`] makes sure the connection is torn down exactly once,
//! after every cooperating thread has released it.

pub mod channel;
pub mod closer;
pub mod conn;
pub mod consumer;
pub mod error;
pub mod feeder;
pub mod pipe;
pub mod socket;

pub use channel::{CommandSource, EventHandler, WorkerChannel};
pub use closer::SharedCloser;
pub use conn::ConnectionString;
pub use consumer::{EventConsumer, EventConsumerHandle};
pub use error::{ChannelError, Result};
pub use feeder::{CommandFeeder, CommandFeederHandle};
pub use pipe::PipeChannel;
pub use socket::SocketChannel;
