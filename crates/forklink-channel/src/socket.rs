//! Socket strategy: a dedicated loopback TCP connection per worker.

use std::net::{Ipv4Addr, Shutdown, TcpListener, TcpStream};

use tracing::{debug, info};

use crate::channel::{CommandSource, EventHandler, WorkerChannel};
use crate::closer::SharedCloser;
use crate::conn::ConnectionString;
use crate::consumer::EventConsumer;
use crate::error::{ChannelError, Result};
use crate::feeder::CommandFeeder;

/// A worker channel backed by a loopback TCP listener on an ephemeral port.
///
/// The worker dials `tcp://127.0.0.1:<port>`; both directions run over that
/// one accepted connection. Accepting is strictly one-time. This strategy
/// never touches the worker's inherited standard streams.
pub struct SocketChannel {
    channel_id: u32,
    listener: Option<TcpListener>,
    port: u16,
    stream: Option<TcpStream>,
}

impl SocketChannel {
    /// Bind the listener. The port is chosen by the OS; no-delay is applied
    /// to the accepted connection, other socket options stay at the
    /// platform's defaults.
    pub fn new(channel_id: u32) -> Result<Self> {
        let listener =
            TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).map_err(ChannelError::Bind)?;
        let port = listener.local_addr().map_err(ChannelError::Bind)?.port();
        info!(channel_id, port, "listening for worker connection");
        Ok(Self {
            channel_id,
            listener: Some(listener),
            port,
            stream: None,
        })
    }

    /// The listener's chosen port.
    pub fn port(&self) -> u16 {
        self.port
    }

    fn connected_stream(&self) -> Result<&TcpStream> {
        self.stream
            .as_ref()
            .ok_or(ChannelError::NotConnected(self.channel_id))
    }
}

impl WorkerChannel for SocketChannel {
    fn channel_id(&self) -> u32 {
        self.channel_id
    }

    fn open(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Err(ChannelError::AlreadyConnected(self.channel_id));
        }
        let listener = self
            .listener
            .as_ref()
            .ok_or(ChannelError::NotConnected(self.channel_id))?;
        let (stream, peer) = listener.accept().map_err(ChannelError::Accept)?;
        if let Err(err) = stream.set_nodelay(true) {
            debug!(channel_id = self.channel_id, %err, "could not set TCP_NODELAY");
        }
        debug!(channel_id = self.channel_id, %peer, "worker connected");
        self.stream = Some(stream);
        Ok(())
    }

    fn connection_string(&self) -> String {
        ConnectionString::tcp(self.port).to_string()
    }

    fn uses_std_in(&self) -> bool {
        false
    }

    fn uses_std_out(&self) -> bool {
        false
    }

    fn bind_command_feeder(
        &mut self,
        commands: Box<dyn CommandSource>,
        std_in: Option<Box<dyn std::io::Write + Send>>,
    ) -> Result<CommandFeeder> {
        if std_in.is_some() {
            return Err(ChannelError::UnsupportedBinding(
                "socket channels never write to the worker's standard input",
            ));
        }
        let stream = self.connected_stream()?.try_clone()?;
        Ok(CommandFeeder::new(
            format!("commands-worker-{}", self.channel_id),
            Box::new(stream),
            commands,
        ))
    }

    fn bind_event_consumer(
        &mut self,
        handler: Box<dyn EventHandler>,
        closer: SharedCloser,
        std_out: Option<Box<dyn std::io::Read + Send>>,
    ) -> Result<EventConsumer> {
        if std_out.is_some() {
            return Err(ChannelError::UnsupportedBinding(
                "socket channels never read the worker's standard output",
            ));
        }
        let stream = self.connected_stream()?.try_clone()?;
        Ok(EventConsumer::new(
            format!("events-worker-{}", self.channel_id),
            Box::new(stream),
            handler,
            closer,
        ))
    }

    fn close(&mut self) -> Result<()> {
        // Already-severed resources are not an error; shutdown failures on a
        // dead connection are expected during teardown.
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        if let Some(listener) = self.listener.take() {
            drop(listener);
            debug!(channel_id = self.channel_id, "listener closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_string_has_loopback_and_positive_port() {
        let channel = SocketChannel::new(1).unwrap();
        let conn = channel.connection_string();
        assert!(conn.starts_with("tcp://127.0.0.1:"));
        let parsed: ConnectionString = conn.parse().unwrap();
        let ConnectionString::Tcp { addr } = parsed else {
            panic!("expected a tcp connection string");
        };
        assert!(addr.port() > 0);
        assert_eq!(addr.port(), channel.port());
    }

    #[test]
    fn neither_inherited_stream_is_used() {
        let channel = SocketChannel::new(2).unwrap();
        assert!(!channel.uses_std_in());
        assert!(!channel.uses_std_out());
        assert_eq!(channel.channel_id(), 2);
    }

    #[test]
    fn binding_with_inherited_stream_fails_loudly() {
        let mut channel = SocketChannel::new(1).unwrap();
        let err = channel
            .bind_command_feeder(
                Box::new(NoCommands),
                Some(Box::new(std::io::sink())),
            )
            .unwrap_err();
        assert!(matches!(err, ChannelError::UnsupportedBinding(_)));

        let err = channel
            .bind_event_consumer(
                Box::new(|_event: forklink_wire::Event| {}),
                SharedCloser::new(1, || {}),
                Some(Box::new(std::io::empty())),
            )
            .unwrap_err();
        assert!(matches!(err, ChannelError::UnsupportedBinding(_)));
    }

    #[test]
    fn binding_before_accept_fails() {
        let mut channel = SocketChannel::new(1).unwrap();
        let err = channel
            .bind_command_feeder(Box::new(NoCommands), None)
            .unwrap_err();
        assert!(matches!(err, ChannelError::NotConnected(1)));
    }

    #[test]
    fn close_is_idempotent() {
        let mut channel = SocketChannel::new(1).unwrap();
        channel.close().unwrap();
        channel.close().unwrap();
    }

    struct NoCommands;

    impl CommandSource for NoCommands {
        fn next_command(&mut self) -> Option<forklink_wire::Command> {
            None
        }
    }
}
