use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("cdp error: {0}")]
    Cdp(String),

    #[error("ui interaction failed: {0}")]
    UiInteraction(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
