use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tracing::{info, warn};

use super::server::{CommandServiceImpl, PlatformServiceImpl, stopping};
use crate::config::EmulatorConfig;
use crate::error::EmulatorError;
use crate::proto::command_service_server::CommandServiceServer;
use crate::proto::platform_service_server::PlatformServiceServer;
use crate::subscription::{SubscriberHandle, SubscriberSet, SubscriptionRegistry};

/// A running emulator serving the command and platform services.
///
/// The server owns its [`SubscriptionRegistry`]; every stream opened against it shares that
/// registry and nothing else, so independent servers never see each other's subscriptions.
pub struct EmulatorServer {
    local_addr: SocketAddr,
    registry: Arc<SubscriptionRegistry<SubscriberHandle>>,
    shutdown: watch::Sender<bool>,
    /// Every session task holds a clone; dropped on stop so `sessions_done` can run dry.
    sessions: mpsc::Sender<()>,
    /// Yields `None` once every session task has finished.
    sessions_done: mpsc::Receiver<()>,
    task: JoinHandle<Result<(), tonic::transport::Error>>,
    drain_timeout: Duration,
}

impl EmulatorServer {
    /// Bind `config.listen_addr` and start serving in a background task.
    pub async fn start(config: EmulatorConfig) -> Result<Self, EmulatorError> {
        let addr = config.listen_addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| EmulatorError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| EmulatorError::Bind { addr, source })?;

        let registry = Arc::new(SubscriptionRegistry::new());
        let (shutdown, shutdown_rx) = watch::channel(false);
        let (sessions, sessions_done) = mpsc::channel(1);

        let commands = CommandServiceImpl::new(
            Arc::clone(&registry),
            shutdown_rx.clone(),
            sessions.downgrade(),
            &config,
        );
        let platform = PlatformServiceImpl::new(&config, local_addr.port());

        let mut server_shutdown = shutdown_rx;
        let task = tokio::spawn(
            tonic::transport::Server::builder()
                .add_service(CommandServiceServer::new(commands))
                .add_service(PlatformServiceServer::new(platform))
                .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
                    stopping(&mut server_shutdown).await
                }),
        );

        info!(address = %local_addr, node = %config.node_name, "Emulator started");

        Ok(Self {
            local_addr,
            registry,
            shutdown,
            sessions,
            sessions_done,
            task,
            drain_timeout: config.drain_timeout,
        })
    }

    /// The address the server is actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// An `http://` URL clients can connect to.
    pub fn url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    pub fn registry(&self) -> &Arc<SubscriptionRegistry<SubscriberHandle>> {
        &self.registry
    }

    /// Snapshot the streams currently subscribed to `command_type`.
    pub fn subscribers_of(&self, command_type: &str) -> SubscriberSet<SubscriberHandle> {
        self.registry.lookup(command_type)
    }

    /// Stop the server.
    ///
    /// Ends every open command stream, waits up to the configured drain timeout before aborting
    /// whatever is still being served, then clears the registry without notifying subscribers.
    /// No session can register anything once this returns.
    pub async fn stop(self) -> Result<(), EmulatorError> {
        info!(address = %self.local_addr, "Emulator stopping");

        // Only fails when no receiver is left, in which case nothing needs signalling.
        let _ = self.shutdown.send(true);

        let mut task = self.task;
        let served = match tokio::time::timeout(self.drain_timeout, &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!(
                    address = %self.local_addr,
                    drain_timeout = ?self.drain_timeout,
                    "Emulator did not drain in time, aborting"
                );
                task.abort();
                // Resolves to a cancellation error once the abort has taken effect.
                let _ = task.await;
                Ok(Ok(()))
            }
        };

        // Sessions observe the shutdown signal before handling any further message.
        drop(self.sessions);
        let mut sessions_done = self.sessions_done;
        while sessions_done.recv().await.is_some() {}

        self.registry.clear();
        served??;

        info!(address = %self.local_addr, "Emulator stopped");
        Ok(())
    }
}
