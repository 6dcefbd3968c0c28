use std::collections::{BTreeSet, VecDeque};

use super::StateMachine;
use crate::session::ControlMessage;

/// Tracks the subscriptions made over a single command stream.
///
/// Every subscribe and unsubscribe is turned into a registry operation in arrival order. Flow
/// control permits and command responses are only counted; nothing is enforced from them.
#[derive(Debug, Default)]
pub struct SubscriptionMachine {
    subscribed: BTreeSet<String>,
    pending: VecDeque<SubscriptionOutput>,
    permits_observed: i64,
    responses_observed: u64,
    ignored: u64,
    closed: bool,
}

impl SubscriptionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Command types this stream is currently subscribed to.
    pub fn subscribed(&self) -> impl Iterator<Item = &str> {
        self.subscribed.iter().map(String::as_str)
    }

    /// Sum of all flow control permits granted by the client.
    pub fn permits_observed(&self) -> i64 {
        self.permits_observed
    }

    pub fn responses_observed(&self) -> u64 {
        self.responses_observed
    }

    /// Number of messages that carried no request, or arrived after close.
    pub fn ignored(&self) -> u64 {
        self.ignored
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn subscribe(&mut self, command_type: String) {
        self.subscribed.insert(command_type.clone());
        self.pending
            .push_back(SubscriptionOutput::Register(command_type));
    }

    fn unsubscribe(&mut self, command_type: String) {
        self.subscribed.remove(&command_type);
        self.pending
            .push_back(SubscriptionOutput::Deregister(command_type));
    }

    fn observe_permits(&mut self, permits: i64) {
        self.permits_observed = self.permits_observed.saturating_add(permits);
    }

    fn observe_response(&mut self) {
        self.responses_observed += 1;
    }

    fn close(&mut self) {
        self.closed = true;
        let remaining = std::mem::take(&mut self.subscribed);
        self.pending
            .extend(remaining.into_iter().map(SubscriptionOutput::Deregister));
    }
}

pub enum SubscriptionInput {
    Control(ControlMessage),
    /// The stream has ended and everything it subscribed to should be withdrawn.
    Close,
}

/// A registry operation to apply on behalf of the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionOutput {
    Register(String),
    Deregister(String),
}

impl StateMachine for SubscriptionMachine {
    type Input = SubscriptionInput;
    type Output = SubscriptionOutput;

    fn process_input(&mut self, input: Self::Input) {
        if self.closed {
            self.ignored += 1;
            return;
        }

        match input {
            SubscriptionInput::Control(ControlMessage::Subscribe(command_type)) => {
                self.subscribe(command_type)
            }
            SubscriptionInput::Control(ControlMessage::Unsubscribe(command_type)) => {
                self.unsubscribe(command_type)
            }
            SubscriptionInput::Control(ControlMessage::FlowControl { permits }) => {
                self.observe_permits(permits)
            }
            SubscriptionInput::Control(ControlMessage::CommandResponse { .. }) => {
                self.observe_response()
            }
            SubscriptionInput::Control(ControlMessage::Unset) => self.ignored += 1,
            SubscriptionInput::Close => self.close(),
        }
    }

    fn poll_output(&mut self) -> Option<Self::Output> {
        self.pending.pop_front()
    }
}
