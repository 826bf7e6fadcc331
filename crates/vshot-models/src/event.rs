//! Presentation events emitted by the job controller.
//!
//! The controller never renders anything itself; UI layers receive these and
//! decide how to show them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::job::{JobId, JobStatus};
use crate::validation::ValidationError;

/// Shown when the upload request never got a usable answer.
pub const UPLOAD_NETWORK_FAILURE_MESSAGE: &str =
    "Failed to upload video. Please check your connection and try again.";

/// Shown when the server rejected an upload without saying why.
pub const UPLOAD_REJECTED_FALLBACK_MESSAGE: &str =
    "An error occurred while processing your request.";

/// Event types (wire names of [`JobEvent`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobEventType {
    ValidationFailed,
    SubmitFailed,
    JobStarted,
    JobProgress,
    JobCompleted,
    JobFailed,
}

impl JobEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobEventType::ValidationFailed => "validation_failed",
            JobEventType::SubmitFailed => "submit_failed",
            JobEventType::JobStarted => "job_started",
            JobEventType::JobProgress => "job_progress",
            JobEventType::JobCompleted => "job_completed",
            JobEventType::JobFailed => "job_failed",
        }
    }
}

/// Event envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    /// Input rejected before anything was sent
    ValidationFailed { reason: ValidationError },

    /// Upload failed or was rejected
    SubmitFailed { reason: String },

    /// Upload accepted, polling started
    JobStarted {
        job_id: JobId,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// Job still running
    JobProgress { job_id: JobId, status: Option<JobStatus> },

    /// Screenshots are ready
    JobCompleted {
        screenshot_count: u32,
        download_ref: String,
        email_sent: bool,
    },

    /// Server reported failure, or the job was given up on
    JobFailed { message: String },
}

impl JobEvent {
    pub fn validation_failed(reason: ValidationError) -> Self {
        JobEvent::ValidationFailed { reason }
    }

    pub fn submit_failed(reason: impl Into<String>) -> Self {
        JobEvent::SubmitFailed {
            reason: reason.into(),
        }
    }

    pub fn job_started(job_id: JobId, message: Option<String>) -> Self {
        JobEvent::JobStarted { job_id, message }
    }

    pub fn job_progress(job_id: JobId, status: Option<JobStatus>) -> Self {
        JobEvent::JobProgress { job_id, status }
    }

    pub fn job_completed(
        screenshot_count: u32,
        download_ref: impl Into<String>,
        email_sent: bool,
    ) -> Self {
        JobEvent::JobCompleted {
            screenshot_count,
            download_ref: download_ref.into(),
            email_sent,
        }
    }

    pub fn job_failed(message: impl Into<String>) -> Self {
        JobEvent::JobFailed {
            message: message.into(),
        }
    }

    pub fn event_type(&self) -> JobEventType {
        match self {
            JobEvent::ValidationFailed { .. } => JobEventType::ValidationFailed,
            JobEvent::SubmitFailed { .. } => JobEventType::SubmitFailed,
            JobEvent::JobStarted { .. } => JobEventType::JobStarted,
            JobEvent::JobProgress { .. } => JobEventType::JobProgress,
            JobEvent::JobCompleted { .. } => JobEventType::JobCompleted,
            JobEvent::JobFailed { .. } => JobEventType::JobFailed,
        }
    }

    /// Errors get an error-styled alert, everything else an info/success one.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            JobEvent::ValidationFailed { .. } | JobEvent::SubmitFailed { .. } | JobEvent::JobFailed { .. }
        )
    }

    /// User-facing text for the event.
    pub fn message(&self) -> String {
        match self {
            JobEvent::ValidationFailed { reason } => reason.to_string(),
            JobEvent::SubmitFailed { reason } => reason.clone(),
            JobEvent::JobStarted { message, .. } => message.clone().unwrap_or_else(|| {
                "Video uploaded successfully! Processing screenshots...".to_string()
            }),
            JobEvent::JobProgress { .. } => "Processing your video... extracting screenshots".to_string(),
            JobEvent::JobCompleted {
                screenshot_count,
                email_sent,
                ..
            } => {
                let email = if *email_sent {
                    "Email sent"
                } else {
                    "Email delivery failed"
                };
                format!(
                    "Processing Complete! Generated {} screenshots from your video. {}",
                    screenshot_count, email
                )
            }
            JobEvent::JobFailed { message } => format!("Processing failed: {}", message),
        }
    }
}
