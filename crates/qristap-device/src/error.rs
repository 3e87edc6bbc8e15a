use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("device {index} not available ({connected} connected)")]
    DeviceUnavailable { index: usize, connected: usize },

    #[error("transfer failed: {0}")]
    Transfer(String),

    #[error("device command failed: {0}")]
    Command(String),

    #[error("device bridge unavailable: {0}")]
    Bridge(String),
}

pub type Result<T> = std::result::Result<T, Error>;
