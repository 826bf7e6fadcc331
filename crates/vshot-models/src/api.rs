//! Request/response bodies of the screenshot service HTTP API.
//!
//! Field names match the server's JSON exactly.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::job::{JobResult, JobStatus};

/// Response of `POST /api/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response of `GET /api/status/{process_id}`.
///
/// `status` stays a plain string: anything the client does not recognise is
/// treated as "still running".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_sent: Option<bool>,
}

impl StatusResponse {
    /// Response carrying only a status string.
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: None,
            screenshot_count: None,
            zip_file: None,
            email_sent: None,
        }
    }

    /// Known status, if the string is one.
    pub fn job_status(&self) -> Option<JobStatus> {
        self.status.parse().ok()
    }

    pub fn is_terminal(&self) -> bool {
        self.job_status().is_some_and(|s| s.is_terminal())
    }

    /// Result summary; missing fields fall back to zero, empty and `false`.
    pub fn result(&self) -> JobResult {
        JobResult {
            screenshot_count: self.screenshot_count.unwrap_or(0),
            archive_ref: self.zip_file.clone().unwrap_or_default(),
            email_sent: self.email_sent.unwrap_or(false),
        }
    }

    /// Server error message, or a placeholder when none was sent.
    pub fn error_message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}
