use super::SubscriberId;

/// Indicates that a command could not be delivered because the subscriber's stream has closed.
#[derive(Debug, thiserror::Error)]
#[error("the stream of subscriber {subscriber_id} is closed")]
pub struct SubscriberClosed {
    pub subscriber_id: SubscriberId,
}
