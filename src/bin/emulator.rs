use std::net::SocketAddr;

use anyhow::Result;
use platform_emulator::{EmulatorConfig, EmulatorServer};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let listen_addr = std::env::var("EMULATOR_ADDR")
        .ok()
        .map(|addr| addr.parse::<SocketAddr>())
        .transpose()?;
    let cleanup_on_close = std::env::var("EMULATOR_CLEANUP_ON_CLOSE")
        .is_ok_and(|value| value == "1" || value.eq_ignore_ascii_case("true"));

    let config = EmulatorConfig::builder()
        .maybe_listen_addr(listen_addr)
        .maybe_advertised_host(std::env::var("EMULATOR_HOST").ok())
        .maybe_node_name(std::env::var("EMULATOR_NODE").ok())
        .cleanup_on_close(cleanup_on_close)
        .build();

    let server = EmulatorServer::start(config).await?;
    info!(url = %server.url(), "Waiting for clients, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    server.stop().await?;

    Ok(())
}
