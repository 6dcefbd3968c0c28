//! Content-based routing of single dispatched commands.
//!
//! Routing only looks at the payload text: a payload containing [`ERROR_MARKER`] is answered with
//! a failure, anything else is echoed back. This lets test clients pick either branch by what they
//! put in the payload.

use bytes::Bytes;

use crate::proto::{Command, CommandResponse, ErrorMessage, SerializedObject};

/// Case-sensitive substring that turns a dispatch into a failure.
pub const ERROR_MARKER: &str = "error";

/// Error code reported for failed dispatches.
pub const DATAFILE_READ_ERROR: &str = "AXONIQ-9000";

/// Type name attached to echoed payloads.
pub const STRING_PAYLOAD_TYPE: &str = "java.lang.String";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    pub message_identifier: String,
    pub command_name: String,
    pub payload: Bytes,
}

impl From<Command> for DispatchRequest {
    fn from(command: Command) -> Self {
        Self {
            message_identifier: command.message_identifier,
            command_name: command.name,
            payload: command.payload.map(|payload| payload.data).unwrap_or_default(),
        }
    }
}

/// The single response produced for a [`DispatchRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResponse {
    Success {
        message_identifier: String,
        payload: Bytes,
        payload_type: &'static str,
    },
    Failure {
        message_identifier: String,
        error_code: &'static str,
        error_message: String,
    },
}

impl DispatchResponse {
    pub fn message_identifier(&self) -> &str {
        match self {
            Self::Success {
                message_identifier, ..
            }
            | Self::Failure {
                message_identifier, ..
            } => message_identifier,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<DispatchResponse> for CommandResponse {
    fn from(response: DispatchResponse) -> Self {
        match response {
            DispatchResponse::Success {
                message_identifier,
                payload,
                payload_type,
            } => CommandResponse {
                message_identifier,
                payload: Some(SerializedObject {
                    r#type: payload_type.to_string(),
                    revision: String::new(),
                    data: payload,
                }),
                ..Default::default()
            },
            DispatchResponse::Failure {
                message_identifier,
                error_code,
                error_message,
            } => CommandResponse {
                message_identifier,
                error_code: error_code.to_string(),
                error_message: Some(ErrorMessage {
                    message: error_message,
                    ..Default::default()
                }),
                ..Default::default()
            },
        }
    }
}

/// Route `request` to exactly one response.
///
/// The payload is decoded as UTF-8, replacing invalid sequences, only to look for the marker.
/// Echoed payloads are the original bytes.
pub fn dispatch(request: DispatchRequest) -> DispatchResponse {
    let text = String::from_utf8_lossy(&request.payload);

    if text.contains(ERROR_MARKER) {
        DispatchResponse::Failure {
            message_identifier: request.message_identifier,
            error_code: DATAFILE_READ_ERROR,
            error_message: text.into_owned(),
        }
    } else {
        DispatchResponse::Success {
            message_identifier: request.message_identifier,
            payload: request.payload,
            payload_type: STRING_PAYLOAD_TYPE,
        }
    }
}
