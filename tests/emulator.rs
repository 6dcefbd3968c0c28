use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use platform_emulator::dispatch::{DATAFILE_READ_ERROR, STRING_PAYLOAD_TYPE};
use platform_emulator::proto::command_provider_inbound;
use platform_emulator::proto::command_provider_outbound::Request;
use platform_emulator::proto::command_service_client::CommandServiceClient;
use platform_emulator::proto::platform_service_client::PlatformServiceClient;
use platform_emulator::proto::{
    ClientIdentification, Command, CommandProviderInbound, CommandProviderOutbound,
    CommandSubscription, FlowControl, SerializedObject,
};
use platform_emulator::{EmulatorConfig, EmulatorError, EmulatorServer, SubscriberHandle};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::Streaming;
use tonic::transport::Channel;

async fn start(cleanup_on_close: bool) -> EmulatorServer {
    let config = EmulatorConfig::builder()
        .listen_addr(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
        .drain_timeout(Duration::from_secs(1))
        .cleanup_on_close(cleanup_on_close)
        .build();

    EmulatorServer::start(config).await.unwrap()
}

/// Poll `condition` until it holds, failing the test after two seconds.
async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}

/// The client side of one command stream.
struct Provider {
    control: mpsc::Sender<CommandProviderOutbound>,
    inbound: Streaming<CommandProviderInbound>,
}

impl Provider {
    async fn open(server: &EmulatorServer) -> Provider {
        let mut client = CommandServiceClient::connect(server.url()).await.unwrap();
        let (control, control_rx) = mpsc::channel(16);
        let inbound = client
            .open_stream(ReceiverStream::new(control_rx))
            .await
            .unwrap()
            .into_inner();

        Provider { control, inbound }
    }

    async fn send(&self, request: Request) {
        let message = CommandProviderOutbound {
            instruction_id: String::new(),
            request: Some(request),
        };
        self.control.send(message).await.unwrap();
    }

    async fn subscribe(&self, command: &str) {
        self.send(Request::Subscribe(subscription(command))).await;
    }

    async fn unsubscribe(&self, command: &str) {
        self.send(Request::Unsubscribe(subscription(command))).await;
    }
}

fn subscription(command: &str) -> CommandSubscription {
    CommandSubscription {
        command: command.to_string(),
        component_name: "tests".to_string(),
        ..Default::default()
    }
}

fn command(message_identifier: &str, text: &'static str) -> Command {
    Command {
        message_identifier: message_identifier.to_string(),
        name: "CreateOrder".to_string(),
        payload: Some(SerializedObject {
            r#type: STRING_PAYLOAD_TYPE.to_string(),
            revision: String::new(),
            data: Bytes::from_static(text.as_bytes()),
        }),
        ..Default::default()
    }
}

async fn dispatcher(server: &EmulatorServer) -> CommandServiceClient<Channel> {
    CommandServiceClient::connect(server.url()).await.unwrap()
}

fn only_subscriber(server: &EmulatorServer, command_type: &str) -> SubscriberHandle {
    let subscribers = server.subscribers_of(command_type);
    assert_eq!(subscribers.len(), 1);
    subscribers.into_iter().next().unwrap()
}

#[tokio::test]
async fn unsubscribe_leaves_other_stream_subscribed() {
    let server = start(false).await;
    let s1 = Provider::open(&server).await;
    let s2 = Provider::open(&server).await;

    s1.subscribe("CreateOrder").await;
    eventually(|| server.subscribers_of("CreateOrder").len() == 1).await;
    let h1 = only_subscriber(&server, "CreateOrder");

    s2.subscribe("CreateOrder").await;
    eventually(|| server.subscribers_of("CreateOrder").len() == 2).await;

    s1.unsubscribe("CreateOrder").await;
    eventually(|| !server.subscribers_of("CreateOrder").contains(&h1)).await;

    let h2 = only_subscriber(&server, "CreateOrder");
    assert_ne!(h1, h2);

    drop((h1, h2));
    server.stop().await.unwrap();
}

#[tokio::test]
async fn repeated_subscribe_registers_once() {
    let server = start(false).await;
    let provider = Provider::open(&server).await;

    provider.subscribe("CreateOrder").await;
    provider.subscribe("CreateOrder").await;
    provider.subscribe("CreateOrder").await;
    provider.subscribe("Marker").await;
    eventually(|| !server.subscribers_of("Marker").is_empty()).await;

    assert_eq!(server.subscribers_of("CreateOrder").len(), 1);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn ignored_messages_do_not_touch_registry() {
    let server = start(false).await;
    let provider = Provider::open(&server).await;

    provider.unsubscribe("CreateOrder").await;
    provider
        .send(Request::FlowControl(FlowControl {
            client_id: "tests".to_string(),
            permits: 100,
        }))
        .await;
    provider
        .control
        .send(CommandProviderOutbound::default())
        .await
        .unwrap();
    provider.subscribe("Marker").await;
    eventually(|| !server.subscribers_of("Marker").is_empty()).await;

    assert!(server.subscribers_of("CreateOrder").is_empty());
    assert_eq!(server.registry().command_types().len(), 1);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn dispatch_with_error_marker_fails() {
    let server = start(false).await;
    let mut client = dispatcher(&server).await;

    let response = client
        .dispatch(command("m-1", "please error now"))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(response.message_identifier, "m-1");
    assert_eq!(response.error_code, DATAFILE_READ_ERROR);
    assert_eq!(response.error_message.unwrap().message, "please error now");
    assert!(response.payload.is_none());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn dispatch_without_error_marker_echoes() {
    let server = start(false).await;
    let mut client = dispatcher(&server).await;

    let response = client
        .dispatch(command("m-2", "hello"))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(response.message_identifier, "m-2");
    assert!(response.error_code.is_empty());
    let payload = response.payload.unwrap();
    assert_eq!(payload.data, Bytes::from_static(b"hello"));
    assert_eq!(payload.r#type, STRING_PAYLOAD_TYPE);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn delivered_command_reaches_subscriber() {
    let server = start(false).await;
    let mut provider = Provider::open(&server).await;

    provider.subscribe("CreateOrder").await;
    eventually(|| server.subscribers_of("CreateOrder").len() == 1).await;

    let handle = only_subscriber(&server, "CreateOrder");
    handle.deliver(command("m-3", "hello")).await.unwrap();

    let received = provider.inbound.message().await.unwrap().unwrap();
    assert_eq!(received.instruction_id, "m-3");
    match received.request {
        Some(command_provider_inbound::Request::Command(command)) => {
            assert_eq!(command.message_identifier, "m-3");
            assert_eq!(command.name, "CreateOrder");
        }
        other => panic!("expected a command, got {other:?}"),
    }

    drop(handle);
    server.stop().await.unwrap();
}

#[tokio::test]
async fn closed_stream_stays_registered() {
    let server = start(false).await;
    let provider = Provider::open(&server).await;

    provider.subscribe("CreateOrder").await;
    eventually(|| server.subscribers_of("CreateOrder").len() == 1).await;
    let handle = only_subscriber(&server, "CreateOrder");

    drop(provider);
    eventually(|| handle.is_closed()).await;

    assert!(server.subscribers_of("CreateOrder").contains(&handle));
    let error = EmulatorError::from(handle.deliver(command("m-4", "hello")).await.unwrap_err());
    assert!(matches!(error, EmulatorError::SubscriberClosed(_)));

    drop(handle);
    server.stop().await.unwrap();
}

#[tokio::test]
async fn closed_stream_is_withdrawn_with_cleanup() {
    let server = start(true).await;
    let provider = Provider::open(&server).await;

    provider.subscribe("CreateOrder").await;
    provider.subscribe("CancelOrder").await;
    eventually(|| server.subscribers_of("CancelOrder").len() == 1).await;

    drop(provider.control);
    eventually(|| {
        server.subscribers_of("CreateOrder").is_empty()
            && server.subscribers_of("CancelOrder").is_empty()
    })
    .await;

    server.stop().await.unwrap();
}

#[tokio::test]
async fn servers_do_not_share_subscriptions() {
    let first = start(false).await;
    let second = start(false).await;
    let provider = Provider::open(&first).await;

    provider.subscribe("CreateOrder").await;
    eventually(|| first.subscribers_of("CreateOrder").len() == 1).await;

    assert!(second.subscribers_of("CreateOrder").is_empty());
    assert!(second.registry().is_empty());

    first.stop().await.unwrap();
    second.stop().await.unwrap();
}

#[tokio::test]
async fn platform_server_points_at_emulator() {
    let server = start(false).await;
    let mut client = PlatformServiceClient::connect(server.url()).await.unwrap();

    let info = client
        .get_platform_server(ClientIdentification {
            client_id: "client-1".to_string(),
            component_name: "tests".to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
        .into_inner();

    let primary = info.primary.unwrap();
    assert!(info.same_connection);
    assert_eq!(primary.grpc_port, i32::from(server.local_addr().port()));
    assert_eq!(primary.host_name, "localhost");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn stop_clears_registry() {
    let server = start(false).await;
    let provider = Provider::open(&server).await;

    provider.subscribe("CreateOrder").await;
    eventually(|| server.subscribers_of("CreateOrder").len() == 1).await;

    let registry = Arc::clone(server.registry());
    server.stop().await.unwrap();

    assert!(registry.is_empty());
    drop(provider);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stop_while_subscribes_stream_in_leaves_registry_empty() {
    for _ in 0..10 {
        let server = start(false).await;
        let provider = Provider::open(&server).await;

        let control = provider.control.clone();
        let feeder = tokio::spawn(async move {
            for n in 0..100_000 {
                let message = CommandProviderOutbound {
                    instruction_id: String::new(),
                    request: Some(Request::Subscribe(subscription(&format!("Command-{n}")))),
                };
                if control.send(message).await.is_err() {
                    break;
                }
            }
        });

        let registry = Arc::clone(server.registry());
        eventually(|| registry.command_types().len() >= 50).await;

        server.stop().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(registry.is_empty());
        assert!(registry.command_types().is_empty());

        feeder.abort();
        drop(provider);
    }
}
