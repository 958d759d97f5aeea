//! Inherited-stream strategy: the worker's own standard streams.

use tracing::debug;

use crate::channel::{CommandSource, EventHandler, WorkerChannel};
use crate::closer::SharedCloser;
use crate::conn::ConnectionString;
use crate::consumer::EventConsumer;
use crate::error::{ChannelError, Result};
use crate::feeder::CommandFeeder;

/// A worker channel with no network resource at all.
///
/// Commands go down the worker's standard input, events come back on its
/// standard output; the connection string `pipe://<id>` tells the worker no
/// further negotiation is needed. The stream handles belong to the process
/// orchestration layer and are passed in at bind time.
pub struct PipeChannel {
    channel_id: u32,
}

impl PipeChannel {
    pub fn new(channel_id: u32) -> Self {
        Self { channel_id }
    }
}

impl WorkerChannel for PipeChannel {
    fn channel_id(&self) -> u32 {
        self.channel_id
    }

    fn open(&mut self) -> Result<()> {
        // Nothing to establish; the streams are inherited at spawn time.
        Ok(())
    }

    fn connection_string(&self) -> String {
        ConnectionString::Pipe {
            channel_id: self.channel_id,
        }
        .to_string()
    }

    fn uses_std_in(&self) -> bool {
        true
    }

    fn uses_std_out(&self) -> bool {
        true
    }

    fn bind_command_feeder(
        &mut self,
        commands: Box<dyn CommandSource>,
        std_in: Option<Box<dyn std::io::Write + Send>>,
    ) -> Result<CommandFeeder> {
        let std_in = std_in.ok_or(ChannelError::UnsupportedBinding(
            "pipe channels write commands to the worker's standard input; a stream handle is required",
        ))?;
        Ok(CommandFeeder::new(
            format!("std-in-worker-{}", self.channel_id),
            std_in,
            commands,
        ))
    }

    fn bind_event_consumer(
        &mut self,
        handler: Box<dyn EventHandler>,
        closer: SharedCloser,
        std_out: Option<Box<dyn std::io::Read + Send>>,
    ) -> Result<EventConsumer> {
        let std_out = std_out.ok_or(ChannelError::UnsupportedBinding(
            "pipe channels read events from the worker's standard output; a stream handle is required",
        ))?;
        Ok(EventConsumer::new(
            format!("std-out-worker-{}", self.channel_id),
            std_out,
            handler,
            closer,
        ))
    }

    fn close(&mut self) -> Result<()> {
        // The inherited handles are owned and closed by the orchestration layer.
        debug!(channel_id = self.channel_id, "pipe channel closed");
        Ok(())
    }
}
