pub mod error;
pub mod qr;
pub mod server;

pub use error::{Error, Result};
pub use server::RelayServer;
