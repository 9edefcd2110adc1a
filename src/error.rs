use thiserror::Error;
use tokio::sync::mpsc;

use crate::process::Outcome;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Config Error: {0}")]
    Config(#[from] figment::Error),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),
    #[error("Couldn't send an outcome through a channel.")]
    RuntimeSendError,
    #[error("Worker pool semaphore closed unexpectedly. {0}")]
    RuntimeAcquire(#[from] tokio::sync::AcquireError),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl From<mpsc::error::SendError<Outcome>> for Error {
    fn from(_value: mpsc::error::SendError<Outcome>) -> Self {
        Error::RuntimeSendError
    }
}
