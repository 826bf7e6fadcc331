//! Shared data models for the VShot client.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs and their status
//! - Job requests and pre-submit validation
//! - Screenshot service API bodies
//! - Presentation events

pub mod api;
pub mod event;
pub mod job;
pub mod request;
pub mod validation;

// Re-export common types
pub use api::{StatusResponse, UploadResponse};
pub use event::{JobEvent, JobEventType};
pub use job::{Job, JobId, JobResult, JobStatus, UnknownStatus};
pub use request::{estimate_processing_time, format_bytes, JobRequest, VideoFile};
pub use validation::{validate, ValidationError, ValidationResult};
