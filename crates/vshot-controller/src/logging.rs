//! Job lifecycle logging.

use tracing::{debug, error, info, info_span, warn, Span};
use vshot_models::{JobId, JobRequest, JobResult, JobStatus, StatusResponse};

/// Logs the milestones of one job. Every line carries the job id.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: JobId,
}

impl JobLogger {
    pub fn new(job_id: &JobId) -> Self {
        Self {
            job_id: job_id.clone(),
        }
    }

    /// The server accepted the upload and returned this job's id.
    pub fn accepted(&self, request: &JobRequest) {
        let (file_name, size) = request
            .file
            .as_ref()
            .map(|file| (file.name.as_str(), file.size))
            .unwrap_or_default();
        info!(
            job_id = %self.job_id,
            file = file_name,
            size,
            interval = %request.interval_field(),
            "Upload accepted, polling for status"
        );
    }

    pub fn status_reported(&self, status: &StatusResponse, polls: u32) {
        debug!(
            job_id = %self.job_id,
            status = %status.status,
            polls,
            "Job still running"
        );
    }

    /// A report that would move the job backwards was dropped.
    pub fn status_ignored(&self, current: JobStatus, reported: JobStatus) {
        warn!(
            job_id = %self.job_id,
            %current,
            %reported,
            "Ignoring status report"
        );
    }

    pub fn completed(&self, result: &JobResult) {
        info!(
            job_id = %self.job_id,
            screenshot_count = result.screenshot_count,
            archive = %result.archive_ref,
            email_sent = result.email_sent,
            "Job completed"
        );
    }

    pub fn failed(&self, message: &str) {
        error!(job_id = %self.job_id, message, "Job failed");
    }

    /// Local teardown while the server still works on the job.
    pub fn abandoned(&self, status: JobStatus) {
        warn!(
            job_id = %self.job_id,
            %status,
            "Job abandoned locally; it keeps running on the server"
        );
    }

    /// Span for the job's status poll task.
    pub fn poll_span(&self) -> Span {
        info_span!("status_poll", job_id = %self.job_id)
    }
}
