pub mod channel;
pub mod error;
pub mod transport;

pub use channel::DeviceControlChannel;
pub use error::{Error, Result};
pub use transport::{AdbCli, AdbTransport, DEFAULT_BRIDGE_HOST, DEFAULT_BRIDGE_PORT};
