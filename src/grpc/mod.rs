mod emulator;
mod server;

pub use emulator::EmulatorServer;
pub use server::{CommandServiceImpl, PlatformServiceImpl};
