use std::net::SocketAddr;

use thiserror::Error;

use crate::subscription::error::SubscriberClosed;

/// Errors that can occur while running the emulator.
///
/// Routing failures of dispatched commands are not errors; they are answered with a failure
/// response.
#[derive(Debug, Error)]
pub enum EmulatorError {
    /// Failed to bind the listening socket.
    #[error("failed to bind {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The gRPC server failed while serving.
    #[error("gRPC transport error")]
    Transport(#[from] tonic::transport::Error),

    /// The server task panicked or was cancelled.
    #[error("server task failed")]
    Join(#[from] tokio::task::JoinError),

    /// A command could not be delivered to a subscriber.
    #[error(transparent)]
    SubscriberClosed(#[from] SubscriberClosed),
}
