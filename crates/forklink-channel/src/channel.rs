//! The channel contract shared by both transport strategies.

use std::io::{Read, Write};

use forklink_wire::{Command, Event};

use crate::closer::SharedCloser;
use crate::consumer::EventConsumer;
use crate::error::Result;
use crate::feeder::CommandFeeder;

/// Callback receiving decoded events, synchronously and in arrival order.
pub trait EventHandler: Send {
    fn handle_event(&mut self, event: Event);
}

impl<F: FnMut(Event) + Send> EventHandler for F {
    fn handle_event(&mut self, event: Event) {
        self(event)
    }
}

/// Blocking pull source of outbound commands. Returning `None` signals
/// exhaustion and stops the feeder.
pub trait CommandSource: Send {
    fn next_command(&mut self) -> Option<Command>;
}

/// One worker's connection slot.
///
/// Identified by a positive channel index stable for the worker's lifetime.
/// Implementations either own an accepted socket connection
/// ([`SocketChannel`](crate::SocketChannel)) or lean entirely on the worker's
/// inherited standard streams ([`PipeChannel`](crate::PipeChannel)).
///
/// The `std_in`/`std_out` arguments of the bind methods carry the worker's
/// inherited stream handles. Whether they must be present is fixed by the
/// strategy; mismatches are contract violations and fail loudly rather than
/// being silently ignored.
pub trait WorkerChannel: Send {
    /// The worker index, 1..N.
    fn channel_id(&self) -> u32;

    /// Make the channel ready for the worker. For the socket strategy this
    /// accepts the worker's connection and is strictly one-time; a second
    /// call fails with [`ChannelError::AlreadyConnected`](crate::ChannelError).
    fn open(&mut self) -> Result<()>;

    /// The string the worker parses to discover how to connect back.
    fn connection_string(&self) -> String;

    /// Whether the command path writes to the worker's standard input.
    fn uses_std_in(&self) -> bool;

    /// Whether the event path reads from the worker's standard output.
    fn uses_std_out(&self) -> bool;

    /// Produce the outbound feeder task bound to this channel's command path.
    fn bind_command_feeder(
        &mut self,
        commands: Box<dyn CommandSource>,
        std_in: Option<Box<dyn Write + Send>>,
    ) -> Result<CommandFeeder>;

    /// Produce the inbound consumer task bound to this channel's event path.
    /// The task releases `closer` when its read loop ends, however it ends.
    fn bind_event_consumer(
        &mut self,
        handler: Box<dyn EventHandler>,
        closer: SharedCloser,
        std_out: Option<Box<dyn Read + Send>>,
    ) -> Result<EventConsumer>;

    /// Release every owned resource. Idempotent; errors on already-severed
    /// resources are swallowed.
    fn close(&mut self) -> Result<()>;
}
