use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status, Streaming};
use tracing::{debug, info, warn};

use crate::config::EmulatorConfig;
use crate::dispatch::{self, DispatchRequest, DispatchResponse};
use crate::proto::command_service_server::CommandService;
use crate::proto::platform_service_server::PlatformService;
use crate::proto::{
    ClientIdentification, Command, CommandProviderOutbound, CommandResponse, PlatformInfo,
    PlatformServiceInfo,
};
use crate::session::{CloseReason, StreamSession};
use crate::subscription::handle::OutboundItem;
use crate::subscription::{SubscriberHandle, SubscriptionRegistry};

pub struct CommandServiceImpl {
    registry: Arc<SubscriptionRegistry<SubscriberHandle>>,
    shutdown: watch::Receiver<bool>,
    /// Upgraded into every session task; the server waits for those to drop when stopping.
    sessions: mpsc::WeakSender<()>,
    outbound_buffer: usize,
    cleanup_on_close: bool,
}

impl CommandServiceImpl {
    pub fn new(
        registry: Arc<SubscriptionRegistry<SubscriberHandle>>,
        shutdown: watch::Receiver<bool>,
        sessions: mpsc::WeakSender<()>,
        config: &EmulatorConfig,
    ) -> Self {
        Self {
            registry,
            shutdown,
            sessions,
            outbound_buffer: config.outbound_buffer,
            cleanup_on_close: config.cleanup_on_close,
        }
    }
}

#[tonic::async_trait]
impl CommandService for CommandServiceImpl {
    type OpenStreamStream = ReceiverStream<OutboundItem>;

    async fn open_stream(
        &self,
        request: Request<Streaming<CommandProviderOutbound>>,
    ) -> Result<Response<Self::OpenStreamStream>, Status> {
        let running = self
            .sessions
            .upgrade()
            .ok_or_else(|| Status::unavailable("emulator is stopping"))?;
        let inbound = request.into_inner();

        let (outbound, outbound_rx) = mpsc::channel(self.outbound_buffer);
        let handle = SubscriberHandle::new(outbound);
        info!(subscriber_id = %handle.id(), "Command stream opened");

        let session = StreamSession::new(handle, Arc::clone(&self.registry), self.cleanup_on_close);
        tokio::spawn(run_session(
            session,
            inbound,
            self.shutdown.clone(),
            running,
        ));

        Ok(Response::new(ReceiverStream::new(outbound_rx)))
    }

    async fn dispatch(&self, request: Request<Command>) -> Result<Response<CommandResponse>, Status> {
        let request = DispatchRequest::from(request.into_inner());
        let message_identifier = request.message_identifier.clone();
        let command_name = request.command_name.clone();

        let response = dispatch::dispatch(request);
        match &response {
            DispatchResponse::Success { .. } => {
                debug!(%message_identifier, command = %command_name, "Dispatch echoed")
            }
            DispatchResponse::Failure { error_code, .. } => {
                debug!(%message_identifier, command = %command_name, %error_code, "Dispatch failed")
            }
        }

        Ok(Response::new(response.into()))
    }
}

/// Feed the stream's control messages to its session until the stream ends or the server stops.
///
/// No message is handled once shutdown has been signalled, even if more are already buffered.
async fn run_session(
    mut session: StreamSession<SubscriberHandle>,
    mut inbound: Streaming<CommandProviderOutbound>,
    mut shutdown: watch::Receiver<bool>,
    _running: mpsc::Sender<()>,
) {
    let reason = loop {
        tokio::select! {
            biased;
            _ = stopping(&mut shutdown) => break CloseReason::Shutdown,
            next = inbound.next() => match next {
                Some(Ok(message)) => session.handle_message(message.into()),
                Some(Err(status)) => {
                    warn!(subscriber_id = %session.handle().id(), error = %status, "Command stream error");
                    break CloseReason::TransportError(status.message().to_string());
                }
                None => break CloseReason::Completed,
            },
        }
    };

    session.close(reason);
}

/// Resolves once the server starts stopping.
pub(crate) async fn stopping(shutdown: &mut watch::Receiver<bool>) {
    // A dropped sender means the owning server is gone.
    let _ = shutdown.wait_for(|stopping| *stopping).await;
}

pub struct PlatformServiceImpl {
    node_name: String,
    host_name: String,
    grpc_port: u16,
}

impl PlatformServiceImpl {
    pub fn new(config: &EmulatorConfig, grpc_port: u16) -> Self {
        Self {
            node_name: config.node_name.clone(),
            host_name: config.advertised_host.clone(),
            grpc_port,
        }
    }
}

#[tonic::async_trait]
impl PlatformService for PlatformServiceImpl {
    async fn get_platform_server(
        &self,
        request: Request<ClientIdentification>,
    ) -> Result<Response<PlatformInfo>, Status> {
        let client = request.into_inner();
        debug!(
            client_id = %client.client_id,
            component = %client.component_name,
            "Platform server requested"
        );

        Ok(Response::new(PlatformInfo {
            primary: Some(PlatformServiceInfo {
                node_name: self.node_name.clone(),
                host_name: self.host_name.clone(),
                grpc_port: i32::from(self.grpc_port),
                http_port: 0,
            }),
            same_connection: true,
        }))
    }
}
