use std::time::Duration;

use anyhow::Result;
use bytes::Bytes;
use platform_emulator::dispatch::STRING_PAYLOAD_TYPE;
use platform_emulator::proto::command_provider_outbound::Request;
use platform_emulator::proto::command_service_client::CommandServiceClient;
use platform_emulator::proto::platform_service_client::PlatformServiceClient;
use platform_emulator::proto::{
    ClientIdentification, Command, CommandProviderOutbound, CommandSubscription, FlowControl,
    SerializedObject,
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};
use uuid::Uuid;

const COMPONENT_NAME: &str = "probe";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let url = std::env::var("EMULATOR_URL").unwrap_or_else(|_| "http://127.0.0.1:8124".to_string());
    let command_name = std::env::var("COMMAND_NAME").unwrap_or_else(|_| "CreateOrder".to_string());
    let payload = std::env::var("PAYLOAD").unwrap_or_else(|_| "hello".to_string());
    let client_id = Uuid::new_v4().to_string();

    info!(url = %url, client_id = %client_id, "Probe connecting");

    let mut platform = PlatformServiceClient::connect(url.clone()).await?;
    let platform_info = platform
        .get_platform_server(ClientIdentification {
            client_id: client_id.clone(),
            component_name: COMPONENT_NAME.to_string(),
            ..Default::default()
        })
        .await?
        .into_inner();
    info!(primary = ?platform_info.primary, "Platform server located");

    let subscription = CommandSubscription {
        message_id: Uuid::new_v4().to_string(),
        command: command_name.clone(),
        component_name: COMPONENT_NAME.to_string(),
        client_id: client_id.clone(),
        load_factor: 100,
    };

    let (control_tx, control_rx) = mpsc::channel(8);
    control_tx
        .send(outbound(Request::Subscribe(subscription.clone())))
        .await?;
    control_tx
        .send(outbound(Request::FlowControl(FlowControl {
            client_id: client_id.clone(),
            permits: 100,
        })))
        .await?;

    let mut commands = CommandServiceClient::connect(url).await?;
    let mut inbound = commands
        .open_stream(ReceiverStream::new(control_rx))
        .await?
        .into_inner();
    info!(command = %command_name, "Subscribed");

    let response = commands
        .dispatch(Command {
            message_identifier: Uuid::new_v4().to_string(),
            name: command_name.clone(),
            payload: Some(SerializedObject {
                r#type: STRING_PAYLOAD_TYPE.to_string(),
                revision: String::new(),
                data: Bytes::from(payload),
            }),
            client_id: client_id.clone(),
            component_name: COMPONENT_NAME.to_string(),
            ..Default::default()
        })
        .await?
        .into_inner();

    if response.error_code.is_empty() {
        let echoed = response.payload.map(|payload| payload.data).unwrap_or_default();
        info!(
            message_identifier = %response.message_identifier,
            echoed = %String::from_utf8_lossy(&echoed),
            "Dispatch succeeded"
        );
    } else {
        warn!(
            message_identifier = %response.message_identifier,
            error_code = %response.error_code,
            error = ?response.error_message.map(|error| error.message),
            "Dispatch failed"
        );
    }

    control_tx
        .send(outbound(Request::Unsubscribe(subscription)))
        .await?;
    drop(control_tx);

    // The stream ends once the emulator has processed the unsubscribe and our half closing.
    while let Ok(Some(message)) =
        tokio::time::timeout(Duration::from_secs(5), inbound.message()).await?
    {
        info!(instruction_id = %message.instruction_id, "Received command");
    }

    info!("Probe finished");
    Ok(())
}

fn outbound(request: Request) -> CommandProviderOutbound {
    CommandProviderOutbound {
        instruction_id: Uuid::new_v4().to_string(),
        request: Some(request),
    }
}
