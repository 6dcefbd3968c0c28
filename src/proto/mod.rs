//! Protobuf messages and generated gRPC stubs for the command and platform services.
//!
//! Messages are declared by hand with `prost` derives; the service stubs are generated by
//! `build.rs` and reference these types through `crate::proto`.

use bytes::Bytes;

/// An opaque payload together with the name of the type it was serialized from.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SerializedObject {
    #[prost(string, tag = "1")]
    pub r#type: String,
    #[prost(string, tag = "2")]
    pub revision: String,
    #[prost(bytes = "bytes", tag = "3")]
    pub data: Bytes,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ErrorMessage {
    #[prost(string, tag = "1")]
    pub message: String,
    #[prost(string, tag = "2")]
    pub location: String,
    #[prost(string, repeated, tag = "3")]
    pub details: Vec<String>,
    #[prost(string, tag = "4")]
    pub error_code: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Command {
    #[prost(string, tag = "1")]
    pub message_identifier: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(int64, tag = "3")]
    pub timestamp: i64,
    #[prost(message, optional, tag = "4")]
    pub payload: Option<SerializedObject>,
    #[prost(string, tag = "7")]
    pub client_id: String,
    #[prost(string, tag = "8")]
    pub component_name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommandResponse {
    #[prost(string, tag = "1")]
    pub message_identifier: String,
    #[prost(string, tag = "2")]
    pub error_code: String,
    #[prost(message, optional, tag = "3")]
    pub error_message: Option<ErrorMessage>,
    #[prost(message, optional, tag = "4")]
    pub payload: Option<SerializedObject>,
    #[prost(string, tag = "7")]
    pub request_identifier: String,
}

/// Registers (or withdraws) interest in a named command type.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommandSubscription {
    #[prost(string, tag = "1")]
    pub message_id: String,
    #[prost(string, tag = "2")]
    pub command: String,
    #[prost(string, tag = "3")]
    pub component_name: String,
    #[prost(string, tag = "4")]
    pub client_id: String,
    #[prost(int32, tag = "5")]
    pub load_factor: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FlowControl {
    #[prost(string, tag = "2")]
    pub client_id: String,
    #[prost(int64, tag = "3")]
    pub permits: i64,
}

/// Control traffic sent by a command provider over its stream.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommandProviderOutbound {
    #[prost(string, tag = "6")]
    pub instruction_id: String,
    #[prost(oneof = "command_provider_outbound::Request", tags = "1, 2, 3, 4")]
    pub request: Option<command_provider_outbound::Request>,
}

pub mod command_provider_outbound {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Request {
        #[prost(message, tag = "1")]
        Subscribe(super::CommandSubscription),
        #[prost(message, tag = "2")]
        Unsubscribe(super::CommandSubscription),
        #[prost(message, tag = "3")]
        FlowControl(super::FlowControl),
        #[prost(message, tag = "4")]
        CommandResponse(super::CommandResponse),
    }
}

/// Traffic pushed from the platform down to a command provider.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommandProviderInbound {
    #[prost(string, tag = "3")]
    pub instruction_id: String,
    #[prost(oneof = "command_provider_inbound::Request", tags = "2")]
    pub request: Option<command_provider_inbound::Request>,
}

pub mod command_provider_inbound {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Request {
        #[prost(message, tag = "2")]
        Command(super::Command),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClientIdentification {
    #[prost(string, tag = "1")]
    pub client_id: String,
    #[prost(string, tag = "2")]
    pub component_name: String,
    #[prost(string, tag = "4")]
    pub version: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PlatformServiceInfo {
    #[prost(string, tag = "1")]
    pub node_name: String,
    #[prost(string, tag = "2")]
    pub host_name: String,
    #[prost(int32, tag = "3")]
    pub grpc_port: i32,
    #[prost(int32, tag = "4")]
    pub http_port: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PlatformInfo {
    #[prost(message, optional, tag = "1")]
    pub primary: Option<PlatformServiceInfo>,
    #[prost(bool, tag = "2")]
    pub same_connection: bool,
}

include!(concat!(
    env!("OUT_DIR"),
    "/io.axoniq.axonserver.grpc.command.CommandService.rs"
));
include!(concat!(
    env!("OUT_DIR"),
    "/io.axoniq.axonserver.grpc.control.PlatformService.rs"
));
