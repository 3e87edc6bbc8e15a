use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error("no qr_string found in the upstream response")]
    MissingCode,

    #[error("qr rendering failed: {0}")]
    Render(String),

    #[error("http server error: {0}")]
    Http(String),
}

pub type Result<T> = std::result::Result<T, Error>;
