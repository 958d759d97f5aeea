/// Errors that can occur in channel transport operations.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Failed to bind the loopback listener.
    #[error("failed to bind loopback listener: {0}")]
    Bind(std::io::Error),

    /// Failed to accept the worker's connection.
    #[error("failed to accept worker connection: {0}")]
    Accept(std::io::Error),

    /// A second accept was attempted on an already-connected channel.
    #[error("worker already connected on channel {0}")]
    AlreadyConnected(u32),

    /// A stream-bound operation ran before the worker connected.
    #[error("channel {0} has no connected worker")]
    NotConnected(u32),

    /// The bind call does not match the channel's transport strategy.
    #[error("unsupported binding: {0}")]
    UnsupportedBinding(&'static str),

    /// The shared closer was released more times than it has holders.
    #[error("shared closer released past zero")]
    ReleaseOverflow,

    /// A connection string did not parse.
    #[error("invalid connection string {0:?}")]
    InvalidConnectionString(String),

    /// An I/O error occurred on the channel.
    #[error("channel I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChannelError>;
