//! Scripted server side for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use vshot_client::PollError;
use vshot_models::{JobId, StatusResponse};

use crate::transport::StatusSource;

/// Replays status answers in order; once the script runs out every call is a
/// transport failure. Each call is reported on the returned channel.
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<StatusResponse, PollError>>>,
    calls: AtomicUsize,
    calls_tx: mpsc::UnboundedSender<JobId>,
}

impl ScriptedSource {
    pub fn new(
        script: Vec<Result<StatusResponse, PollError>>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<JobId>) {
        let (calls_tx, calls_rx) = mpsc::unbounded_channel();
        let source = Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
            calls_tx,
        });
        (source, calls_rx)
    }

    /// Source that never answers successfully.
    pub fn failing() -> (Arc<Self>, mpsc::UnboundedReceiver<JobId>) {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn fetch_status(&self, job_id: &JobId) -> Result<StatusResponse, PollError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _ = self.calls_tx.send(job_id.clone());
        let next = self.script.lock().map(|mut s| s.pop_front()).unwrap_or(None);
        next.unwrap_or(Err(PollError::HttpStatus(503)))
    }
}

pub fn status(s: &str) -> Result<StatusResponse, PollError> {
    Ok(StatusResponse::with_status(s))
}

pub fn completed(count: u32, zip: &str, email_sent: bool) -> Result<StatusResponse, PollError> {
    Ok(StatusResponse {
        status: "completed".to_string(),
        message: None,
        screenshot_count: Some(count),
        zip_file: Some(zip.to_string()),
        email_sent: Some(email_sent),
    })
}

pub fn failed(message: &str) -> Result<StatusResponse, PollError> {
    Ok(StatusResponse {
        message: Some(message.to_string()),
        ..StatusResponse::with_status("error")
    })
}

pub fn transport_failure() -> Result<StatusResponse, PollError> {
    Err(PollError::InvalidResponse("connection reset".to_string()))
}
