//! An in-process emulator of a message platform's command endpoint, used to exercise command
//! provider clients.
//!
//! Clients open a command stream to subscribe and unsubscribe to command types, and dispatch
//! single commands that are answered by content: a payload containing `"error"` fails, anything
//! else is echoed back.

pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod grpc;
pub mod proto;
pub mod session;
pub mod state_machine;
pub mod subscription;

pub use command::CommandType;
pub use config::EmulatorConfig;
pub use error::EmulatorError;
pub use grpc::EmulatorServer;
pub use subscription::{SubscriberHandle, SubscriptionRegistry};
