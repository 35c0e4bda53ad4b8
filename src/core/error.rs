use std::io;

#[derive(thiserror::Error, Debug)]
pub enum VetError {
    #[error("network error: {0}")]
    Network(String),
    #[error("timeout")]
    Timeout,
    #[error("http error: {0}")]
    Http(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("state error: {0}")]
    State(String),
    #[error("source error: {0}")]
    Source(String),
    #[error("unknown error")]
    Unknown,
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<reqwest::Error> for VetError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            VetError::Timeout
        } else if err.is_connect() {
            VetError::Network(err.to_string())
        } else if err.is_status() {
            VetError::Http(err.to_string())
        } else {
            VetError::Unknown
        }
    }
}
