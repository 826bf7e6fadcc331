//! Controller error types.

use thiserror::Error;

pub type ControllerResult<T> = Result<T, ControllerError>;

#[derive(Debug, Error)]
pub enum ControllerError {
    /// A submit arrived while a job was still being submitted or polled.
    #[error("A job is already in progress (state: {0})")]
    Busy(&'static str),
}
