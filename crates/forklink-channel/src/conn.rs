//! Connection strings advertised to workers.
//!
//! The coordinator renders one of these into the worker's environment; the
//! worker parses it back to discover how to reach its channel. Two formats
//! exist, one per transport strategy: `pipe://<channel-id>` and
//! `tcp://127.0.0.1:<port>`.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;

use crate::error::ChannelError;

/// A parsed worker connection string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionString {
    /// Inherited-stream strategy; the id matches the channel index.
    Pipe { channel_id: u32 },
    /// Socket strategy; the worker dials this exact loopback address.
    Tcp { addr: SocketAddr },
}

impl ConnectionString {
    /// Build the socket form for a loopback port.
    pub fn tcp(port: u16) -> Self {
        ConnectionString::Tcp {
            addr: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, port)),
        }
    }
}

impl fmt::Display for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionString::Pipe { channel_id } => write!(f, "pipe://{channel_id}"),
            ConnectionString::Tcp { addr } => write!(f, "tcp://{addr}"),
        }
    }
}

impl FromStr for ConnectionString {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(id) = s.strip_prefix("pipe://") {
            let channel_id = id
                .parse::<u32>()
                .map_err(|_| ChannelError::InvalidConnectionString(s.to_string()))?;
            return Ok(ConnectionString::Pipe { channel_id });
        }
        if let Some(addr) = s.strip_prefix("tcp://") {
            let addr = addr
                .parse::<SocketAddr>()
                .map_err(|_| ChannelError::InvalidConnectionString(s.to_string()))?;
            return Ok(ConnectionString::Tcp { addr });
        }
        Err(ChannelError::InvalidConnectionString(s.to_string()))
    }
}
