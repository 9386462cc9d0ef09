use cq_core::CqError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] CqError),

    #[error("invalid {what} distribution: {reason}")]
    Distribution {
        what:   &'static str,
        reason: String,
    },
}

pub type SimResult<T> = Result<T, SimError>;
