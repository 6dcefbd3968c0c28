//! Per-stream handling of subscription control traffic.

mod message;

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use tracing::{debug, info};

pub use self::message::ControlMessage;
use crate::command::CommandType;
use crate::state_machine::StateMachine;
use crate::state_machine::subscription::{
    SubscriptionInput, SubscriptionMachine, SubscriptionOutput,
};
use crate::subscription::SubscriptionRegistry;

/// Why a command stream stopped delivering messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The client completed its half of the stream.
    Completed,
    TransportError(String),
    /// The server is stopping.
    Shutdown,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::TransportError(error) => write!(f, "transport error: {error}"),
            Self::Shutdown => f.write_str("shutdown"),
        }
    }
}

/// Drives one command stream's control messages into the shared [`SubscriptionRegistry`].
///
/// Messages must be fed in the order they arrived on the stream. The session never writes to the
/// stream itself.
///
/// When the stream closes the session leaves its subscriptions in the registry unless
/// `cleanup_on_close` was requested, so a closed stream's handle may stay registered until the
/// registry is cleared.
pub struct StreamSession<H> {
    handle: H,
    registry: Arc<SubscriptionRegistry<H>>,
    machine: SubscriptionMachine,
    cleanup_on_close: bool,
}

impl<H> StreamSession<H>
where
    H: Eq + Hash + Clone + fmt::Debug,
{
    pub fn new(handle: H, registry: Arc<SubscriptionRegistry<H>>, cleanup_on_close: bool) -> Self {
        Self {
            handle,
            registry,
            machine: SubscriptionMachine::new(),
            cleanup_on_close,
        }
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn machine(&self) -> &SubscriptionMachine {
        &self.machine
    }

    /// Process a single control message received on the stream.
    pub fn handle_message(&mut self, message: ControlMessage) {
        debug!(handle = ?self.handle, message = ?message, "Control message received");
        self.machine
            .process_input(SubscriptionInput::Control(message));
        self.apply_outputs();
    }

    /// Finish the session after the stream stopped for `reason`.
    pub fn close(mut self, reason: CloseReason) {
        if self.cleanup_on_close {
            self.machine.process_input(SubscriptionInput::Close);
            self.apply_outputs();
        } else {
            let stale = self.machine.subscribed().count();
            if stale > 0 {
                debug!(handle = ?self.handle, stale, "Leaving subscriptions of closed stream registered");
            }
        }

        info!(
            handle = ?self.handle,
            reason = %reason,
            permits_observed = self.machine.permits_observed(),
            responses_observed = self.machine.responses_observed(),
            "Command stream closed"
        );
    }

    fn apply_outputs(&mut self) {
        while let Some(output) = self.machine.poll_output() {
            match output {
                SubscriptionOutput::Register(command_type) => {
                    debug!(handle = ?self.handle, command_type = %command_type, "Subscribed");
                    self.registry
                        .subscribe(CommandType::from(command_type), self.handle.clone());
                }
                SubscriptionOutput::Deregister(command_type) => {
                    debug!(handle = ?self.handle, command_type = %command_type, "Unsubscribed");
                    self.registry
                        .unsubscribe(&command_type, &self.handle);
                }
            }
        }
    }
}
