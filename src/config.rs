use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use bon::Builder;

/// Port the emulator listens on unless configured otherwise.
pub const DEFAULT_PORT: u16 = 8124;

/// Configuration for an [`EmulatorServer`](crate::grpc::EmulatorServer).
#[derive(Debug, Clone, Builder)]
pub struct EmulatorConfig {
    /// Address to bind. Port 0 picks a free port; see
    /// [`local_addr`](crate::grpc::EmulatorServer::local_addr).
    #[builder(default = SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)))]
    pub listen_addr: SocketAddr,

    /// Host name reported to clients asking for the platform server.
    #[builder(default = "localhost".to_string())]
    pub advertised_host: String,

    /// Node name reported to clients asking for the platform server.
    #[builder(default = "emulator".to_string())]
    pub node_name: String,

    /// How long [`stop`](crate::grpc::EmulatorServer::stop) waits for open calls before
    /// aborting them.
    #[builder(default = Duration::from_secs(5))]
    pub drain_timeout: Duration,

    /// Capacity of each command stream's outbound channel.
    #[builder(default = 32)]
    pub outbound_buffer: usize,

    /// Withdraw a stream's subscriptions when it closes.
    ///
    /// Off by default: closed streams stay registered until the server stops.
    #[builder(default)]
    pub cleanup_on_close: bool,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
