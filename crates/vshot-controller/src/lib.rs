//! Job lifecycle controller for the screenshot extraction service.
//!
//! This crate provides:
//! - Submission with local validation
//! - Periodic status polling with cancellation
//! - The idle/submitting/polling state machine
//! - Presentation events for whatever front end drives it

pub mod config;
pub mod controller;
pub mod error;
pub mod failure;
pub mod logging;
pub mod poller;
pub mod presenter;
pub mod state;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use config::ControllerConfig;
pub use controller::{JobController, JobOutcome, SubmitOutcome};
pub use error::{ControllerError, ControllerResult};
pub use poller::{PollEvent, StatusPoller};
pub use presenter::Presenter;
pub use state::{ControllerState, Input};
pub use transport::{JobSubmitter, StatusSource};
