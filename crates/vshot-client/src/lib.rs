//! Client for the screenshot extraction service.
//!
//! Wraps the three endpoints the service exposes: multipart upload, per-job
//! status, and archive download.

pub mod client;
pub mod config;
pub mod error;

pub use client::ScreenshotClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, PollError, SubmitError};
