use crate::proto::CommandProviderOutbound;
use crate::proto::command_provider_outbound::Request;

/// A control message received on a command stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlMessage {
    Subscribe(String),
    Unsubscribe(String),
    FlowControl { permits: i64 },
    CommandResponse { request_identifier: String },
    /// The message carried no request.
    Unset,
}

impl From<CommandProviderOutbound> for ControlMessage {
    fn from(message: CommandProviderOutbound) -> Self {
        match message.request {
            Some(Request::Subscribe(subscription)) => Self::Subscribe(subscription.command),
            Some(Request::Unsubscribe(subscription)) => Self::Unsubscribe(subscription.command),
            Some(Request::FlowControl(flow_control)) => Self::FlowControl {
                permits: flow_control.permits,
            },
            Some(Request::CommandResponse(response)) => Self::CommandResponse {
                request_identifier: response.request_identifier,
            },
            None => Self::Unset,
        }
    }
}
