//! Screenshot extraction job tracked by the client.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-assigned job identifier (`process_id` on the wire).
///
/// Opaque: only compared for equality when routing poll results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Job status as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Upload accepted, processing not started yet
    #[default]
    Uploading,
    /// Screenshots are being extracted
    Processing,
    /// Archive is ready
    Completed,
    /// Server gave up on the job
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Uploading => "uploading",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        }
    }

    /// Completed and error end polling.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }

    /// Whether moving from `self` to `next` keeps the status monotonic.
    ///
    /// Reporting the current status again is allowed for non-terminal states.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        match (self, next) {
            (JobStatus::Uploading, _) => true,
            (JobStatus::Processing, JobStatus::Uploading) => false,
            (JobStatus::Processing, _) => true,
            (JobStatus::Completed, _) | (JobStatus::Error, _) => false,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploading" => Ok(JobStatus::Uploading),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "error" => Ok(JobStatus::Error),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Status string outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown job status: {0}")]
pub struct UnknownStatus(pub String);

/// Summary of a completed job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct JobResult {
    /// Number of screenshots extracted
    pub screenshot_count: u32,
    /// Archive name, usable with the download endpoint
    pub archive_ref: String,
    /// Whether the server mailed the archive
    pub email_sent: bool,
}

/// A submitted job.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    /// Server-assigned ID
    pub id: JobId,

    /// Last accepted status
    pub status: JobStatus,

    /// Result (set once completed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResult>,

    /// Server error message (set once failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// When the upload was accepted
    pub submitted_at: DateTime<Utc>,

    /// Last status change
    pub updated_at: DateTime<Utc>,

    /// Number of status responses applied
    #[serde(default)]
    pub poll_count: u32,
}

impl Job {
    /// Create a job for a freshly accepted upload.
    pub fn new(id: impl Into<JobId>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            status: JobStatus::Uploading,
            result: None,
            error_message: None,
            submitted_at: now,
            updated_at: now,
            poll_count: 0,
        }
    }

    /// Record a non-terminal status report.
    ///
    /// Returns `false` and leaves the status untouched when the report would
    /// move the job backwards or out of a terminal state.
    pub fn observe(&mut self, status: JobStatus) -> bool {
        self.poll_count += 1;
        if status == self.status {
            return !self.status.is_terminal();
        }
        if !self.status.can_transition_to(status) {
            return false;
        }
        self.status = status;
        self.updated_at = Utc::now();
        true
    }

    /// Mark job as completed.
    pub fn complete(&mut self, result: JobResult) -> bool {
        if !self.observe(JobStatus::Completed) {
            return false;
        }
        self.result = Some(result);
        true
    }

    /// Mark job as failed.
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if !self.observe(JobStatus::Error) {
            return false;
        }
        self.error_message = Some(message.into());
        true
    }
}
