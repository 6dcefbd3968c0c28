use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tokio::sync::mpsc;
use tonic::Status;
use uuid::Uuid;

use super::error::SubscriberClosed;
use crate::proto::command_provider_inbound::Request;
use crate::proto::{Command, CommandProviderInbound};

/// Items carried on a command stream's outbound half.
pub type OutboundItem = Result<CommandProviderInbound, Status>;

/// A unique identifier for one open command stream.
#[derive(Clone, Hash, PartialEq, Eq)]
pub struct SubscriberId(Arc<Uuid>);

impl SubscriberId {
    pub fn generate() -> Self {
        Self(Arc::new(Uuid::new_v4()))
    }
}

impl fmt::Debug for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriberId({})", self.0)
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identity of one open command stream together with its outbound channel.
///
/// Two handles are equal only if they were cloned from the handle created for the same stream.
#[derive(Clone)]
pub struct SubscriberHandle {
    id: SubscriberId,
    outbound: mpsc::Sender<OutboundItem>,
}

impl SubscriberHandle {
    pub fn new(outbound: mpsc::Sender<OutboundItem>) -> Self {
        Self {
            id: SubscriberId::generate(),
            outbound,
        }
    }

    pub fn id(&self) -> &SubscriberId {
        &self.id
    }

    /// Whether the client side of the stream has gone away.
    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }

    /// Push `command` down this subscriber's stream.
    pub async fn deliver(&self, command: Command) -> Result<(), SubscriberClosed> {
        let message = CommandProviderInbound {
            instruction_id: command.message_identifier.clone(),
            request: Some(Request::Command(command)),
        };

        self.outbound
            .send(Ok(message))
            .await
            .map_err(|_| SubscriberClosed {
                subscriber_id: self.id.clone(),
            })
    }
}

impl fmt::Debug for SubscriberHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberHandle")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// A [`SubscriberHandle`] is defined only by its [`SubscriberId`].
impl PartialEq for SubscriberHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SubscriberHandle {}

impl Hash for SubscriberHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
