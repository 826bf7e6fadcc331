//! Network seams used by the controller.
//!
//! The controller and poller only see these traits, so tests can script the
//! server side without HTTP.

use async_trait::async_trait;

use vshot_client::{PollError, ScreenshotClient, SubmitError};
use vshot_models::{Job, JobId, JobRequest, StatusResponse};

/// Turns a validated request into a running job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobSubmitter: Send + Sync {
    async fn submit(&self, request: &JobRequest) -> Result<Job, SubmitError>;
}

/// Answers one status query per call.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, job_id: &JobId) -> Result<StatusResponse, PollError>;
}

#[async_trait]
impl JobSubmitter for ScreenshotClient {
    async fn submit(&self, request: &JobRequest) -> Result<Job, SubmitError> {
        ScreenshotClient::submit(self, request).await
    }
}

#[async_trait]
impl StatusSource for ScreenshotClient {
    async fn fetch_status(&self, job_id: &JobId) -> Result<StatusResponse, PollError> {
        self.status(job_id).await
    }
}
