//! Job lifecycle controller.
//!
//! Owns the single active-job slot and the status poller, and turns
//! submitter/poller results into [`JobEvent`]s for the presenter. Every path
//! ends back in [`ControllerState::Idle`] with a message.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use vshot_client::ScreenshotClient;
use vshot_models::{validate, Job, JobEvent, JobId, JobRequest, JobResult, JobStatus, ValidationError};

use crate::config::ControllerConfig;
use crate::error::{ControllerError, ControllerResult};
use crate::logging::JobLogger;
use crate::poller::{PollEvent, StatusPoller};
use crate::presenter::Presenter;
use crate::state::{ControllerState, Input};
use crate::transport::{JobSubmitter, StatusSource};

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Upload accepted; the job is being polled
    Started(JobId),
    /// Rejected locally, nothing was sent
    Invalid(ValidationError),
    /// Upload failed or was rejected by the server
    Failed(String),
}

/// How a polled job ended.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed(JobResult),
    Failed(String),
}

pub struct JobController<P: Presenter> {
    submitter: Arc<dyn JobSubmitter>,
    poller: StatusPoller<dyn StatusSource>,
    presenter: P,
    state: ControllerState,
    active_job: Option<Job>,
    logger: Option<JobLogger>,
    events_tx: mpsc::UnboundedSender<PollEvent>,
    events_rx: mpsc::UnboundedReceiver<PollEvent>,
}

impl<P: Presenter> JobController<P> {
    pub fn new(
        submitter: Arc<dyn JobSubmitter>,
        status_source: Arc<dyn StatusSource>,
        presenter: P,
        config: ControllerConfig,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            submitter,
            poller: StatusPoller::new(status_source, config),
            presenter,
            state: ControllerState::Idle,
            active_job: None,
            logger: None,
            events_tx,
            events_rx,
        }
    }

    /// Controller talking to a real screenshot service.
    pub fn with_client(client: Arc<ScreenshotClient>, presenter: P, config: ControllerConfig) -> Self {
        Self::new(client.clone(), client, presenter, config)
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn active_job(&self) -> Option<&Job> {
        self.active_job.as_ref()
    }

    /// The UI gate: submitting is only allowed while idle.
    pub fn can_submit(&self) -> bool {
        self.state.is_idle()
    }

    /// Whether a status poll task is running.
    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Validate and upload `request`, then start polling on success.
    ///
    /// Validation and upload failures are reported to the presenter and
    /// leave the controller idle. Fails only when a job is already active.
    pub async fn submit(&mut self, request: &JobRequest) -> ControllerResult<SubmitOutcome> {
        if !self.transition(Input::Submit) {
            warn!(state = self.state.name(), "Submit refused while a job is active");
            return Err(ControllerError::Busy(self.state.name()));
        }

        if let Err(reason) = validate(request) {
            debug!(%reason, "Job request failed validation");
            self.transition(Input::ValidationFailed);
            self.presenter.present(&JobEvent::validation_failed(reason));
            return Ok(SubmitOutcome::Invalid(reason));
        }

        match self.submitter.submit(request).await {
            Ok(job) => {
                let job_id = job.id.clone();
                self.transition(Input::SubmitSucceeded(job_id.clone()));

                let logger = JobLogger::new(&job_id);
                logger.accepted(request);
                self.logger = Some(logger);
                self.active_job = Some(job);

                self.poller.start(job_id.clone(), self.events_tx.clone());
                self.presenter
                    .present(&JobEvent::job_started(job_id.clone(), None));
                Ok(SubmitOutcome::Started(job_id))
            }
            Err(e) => {
                warn!(error = %e, "Job submission failed");
                self.transition(Input::SubmitFailed);
                let message = e.user_message();
                self.presenter.present(&JobEvent::submit_failed(message.clone()));
                Ok(SubmitOutcome::Failed(message))
            }
        }
    }

    /// Apply one poll event. Returns the outcome when the job finished.
    ///
    /// Events for any job other than the one being polled are dropped.
    pub fn handle_poll_event(&mut self, event: PollEvent) -> Option<JobOutcome> {
        let input = if event.is_terminal() {
            Input::PollTerminal(event.job_id().clone())
        } else {
            Input::PollUpdate(event.job_id().clone())
        };
        if !self.transition(input) {
            debug!(
                job_id = %event.job_id(),
                state = self.state.name(),
                "Ignoring poll event for inactive job"
            );
            return None;
        }

        match event {
            PollEvent::Update { job_id, status } => {
                let reported = status.job_status();
                if let Some(job) = self.active_job.as_mut() {
                    let current = job.status;
                    let applied = reported.map_or(true, |next| job.observe(next));
                    if let Some(logger) = &self.logger {
                        match reported {
                            Some(next) if !applied => logger.status_ignored(current, next),
                            _ => logger.status_reported(&status, job.poll_count),
                        }
                    }
                }
                self.presenter
                    .present(&JobEvent::job_progress(job_id, reported));
                None
            }
            PollEvent::Terminal { status, .. } => {
                self.poller.stop();
                let outcome = match status.job_status() {
                    Some(JobStatus::Completed) => JobOutcome::Completed(status.result()),
                    _ => JobOutcome::Failed(status.error_message()),
                };
                Some(self.finish(outcome))
            }
            PollEvent::Unreachable { failures, .. } => {
                self.poller.stop();
                Some(self.finish(JobOutcome::Failed(format!(
                    "Lost contact with the server after {} failed status checks",
                    failures
                ))))
            }
        }
    }

    /// Drive poll events until the active job finishes.
    ///
    /// Returns `None` right away when no job is being polled.
    pub async fn run_until_idle(&mut self) -> Option<JobOutcome> {
        while self.state.active_job_id().is_some() {
            let event = self.events_rx.recv().await?;
            if let Some(outcome) = self.handle_poll_event(event) {
                return Some(outcome);
            }
        }
        None
    }

    /// Unconditional teardown: stop polling and drop the active job.
    pub fn shutdown(&mut self) {
        self.poller.stop();
        if let Some(job) = self.active_job.take() {
            if let Some(logger) = self.logger.take() {
                logger.abandoned(job.status);
            }
        }
        self.logger = None;
        self.state = ControllerState::Idle;
        while self.events_rx.try_recv().is_ok() {}
    }

    fn finish(&mut self, outcome: JobOutcome) -> JobOutcome {
        let event = match &outcome {
            JobOutcome::Completed(result) => JobEvent::job_completed(
                result.screenshot_count,
                result.archive_ref.clone(),
                result.email_sent,
            ),
            JobOutcome::Failed(message) => JobEvent::job_failed(message.clone()),
        };

        if let Some(mut job) = self.active_job.take() {
            match &outcome {
                JobOutcome::Completed(result) => {
                    job.complete(result.clone());
                }
                JobOutcome::Failed(message) => {
                    job.fail(message.clone());
                }
            }
        }
        if let Some(logger) = self.logger.take() {
            match &outcome {
                JobOutcome::Completed(result) => logger.completed(result),
                JobOutcome::Failed(message) => logger.failed(message),
            }
        }

        self.presenter.present(&event);
        outcome
    }

    fn transition(&mut self, input: Input) -> bool {
        match self.state.next(&input) {
            Some(next) => {
                debug!(from = self.state.name(), to = next.name(), "Controller transition");
                self.state = next;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use vshot_client::SubmitError;
    use vshot_models::{StatusResponse, VideoFile};

    use super::*;
    use crate::test_support::{completed, failed, status, transport_failure, ScriptedSource};
    use crate::transport::MockJobSubmitter;

    const MIB: u64 = 1024 * 1024;

    fn valid_request() -> JobRequest {
        JobRequest::new(VideoFile::new("/videos/clip.mp4", "clip.mp4", 10 * MIB), 1.0)
    }

    fn accepting(job_id: &'static str) -> MockJobSubmitter {
        let mut submitter = MockJobSubmitter::new();
        submitter
            .expect_submit()
            .times(1)
            .returning(move |_| Ok(Job::new(job_id)));
        submitter
    }

    fn controller(
        submitter: MockJobSubmitter,
        source: Arc<ScriptedSource>,
        config: ControllerConfig,
    ) -> JobController<Vec<JobEvent>> {
        JobController::new(Arc::new(submitter), source, Vec::new(), config)
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_request_never_reaches_submitter() {
        let mut submitter = MockJobSubmitter::new();
        submitter.expect_submit().times(0);
        let (source, _calls) = ScriptedSource::failing();
        let mut ctl = controller(submitter, source.clone(), ControllerConfig::default());

        let request = JobRequest::new(VideoFile::new("/v/notes.txt", "notes.txt", MIB), 1.0);
        let outcome = ctl.submit(&request).await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Invalid(ValidationError::BadType));
        assert_eq!(
            ctl.presenter(),
            &vec![JobEvent::validation_failed(ValidationError::BadType)]
        );
        assert!(ctl.state().is_idle());
        assert!(!ctl.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_submit_returns_to_idle() {
        let mut submitter = MockJobSubmitter::new();
        submitter
            .expect_submit()
            .times(1)
            .returning(|_| Err(SubmitError::Rejected("bad codec".to_string())));
        let (source, _calls) = ScriptedSource::failing();
        let mut ctl = controller(submitter, source.clone(), ControllerConfig::default());

        let outcome = ctl.submit(&valid_request()).await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Failed("bad codec".to_string()));
        assert_eq!(ctl.presenter(), &vec![JobEvent::submit_failed("bad codec")]);
        assert!(ctl.can_submit());
        assert!(ctl.active_job().is_none());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_uses_connection_message() {
        let mut submitter = MockJobSubmitter::new();
        submitter
            .expect_submit()
            .returning(|_| Err(SubmitError::NetworkFailure("connection refused".to_string())));
        let (source, _calls) = ScriptedSource::failing();
        let mut ctl = controller(submitter, source, ControllerConfig::default());

        ctl.submit(&valid_request()).await.unwrap();

        assert_eq!(
            ctl.presenter(),
            &vec![JobEvent::submit_failed(
                "Failed to upload video. Please check your connection and try again."
            )]
        );
        assert!(ctl.state().is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_sequence_completes_once() {
        let (source, _calls) = ScriptedSource::new(vec![
            status("processing"),
            status("processing"),
            completed(42, "a.zip", true),
        ]);
        let mut ctl = controller(accepting("job-1"), source.clone(), ControllerConfig::default());

        let started = ctl.submit(&valid_request()).await.unwrap();
        assert_eq!(started, SubmitOutcome::Started(JobId::from("job-1")));
        assert_eq!(ctl.state(), &ControllerState::Polling(JobId::from("job-1")));

        let outcome = ctl.run_until_idle().await;
        assert_eq!(
            outcome,
            Some(JobOutcome::Completed(JobResult {
                screenshot_count: 42,
                archive_ref: "a.zip".to_string(),
                email_sent: true,
            }))
        );
        assert!(ctl.state().is_idle());
        assert!(ctl.active_job().is_none());

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(source.calls(), 3);
        assert!(!ctl.is_polling());

        let events = ctl.presenter();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], JobEvent::job_started(JobId::from("job-1"), None));
        assert_eq!(
            events[1],
            JobEvent::job_progress(JobId::from("job-1"), Some(JobStatus::Processing))
        );
        let completions: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, JobEvent::JobCompleted { .. }))
            .collect();
        assert_eq!(completions, vec![&JobEvent::job_completed(42, "a.zip", true)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_error_is_surfaced() {
        let (source, _calls) =
            ScriptedSource::new(vec![status("processing"), failed("No screenshots extracted")]);
        let mut ctl = controller(accepting("job-1"), source, ControllerConfig::default());

        ctl.submit(&valid_request()).await.unwrap();
        let outcome = ctl.run_until_idle().await;

        assert_eq!(
            outcome,
            Some(JobOutcome::Failed("No screenshots extracted".to_string()))
        );
        let last = ctl.presenter().last().unwrap();
        assert_eq!(last.message(), "Processing failed: No screenshots extracted");
        assert!(ctl.can_submit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failures_keep_polling() {
        let (source, mut calls) = ScriptedSource::failing();
        let mut ctl = controller(accepting("job-1"), source.clone(), ControllerConfig::default());

        ctl.submit(&valid_request()).await.unwrap();
        for _ in 0..10 {
            calls.recv().await.unwrap();
        }

        assert_eq!(source.calls(), 10);
        assert_eq!(ctl.state(), &ControllerState::Polling(JobId::from("job-1")));
        assert!(ctl.is_polling());
        assert_eq!(ctl.presenter().len(), 1);

        ctl.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_limit_surfaces_job_failed() {
        let (source, _calls) = ScriptedSource::new(vec![status("processing")]);
        let config = ControllerConfig::default().with_max_poll_failures(Some(5));
        let mut ctl = controller(accepting("job-1"), source.clone(), config);

        ctl.submit(&valid_request()).await.unwrap();
        let outcome = ctl.run_until_idle().await;

        assert!(matches!(outcome, Some(JobOutcome::Failed(ref m)) if m.contains("5 failed status checks")));
        assert_eq!(source.calls(), 6);
        assert!(ctl.state().is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_while_polling_is_refused() {
        let (source, _calls) = ScriptedSource::failing();
        let mut ctl = controller(accepting("job-1"), source, ControllerConfig::default());

        ctl.submit(&valid_request()).await.unwrap();
        assert!(!ctl.can_submit());

        let err = ctl.submit(&valid_request()).await.unwrap_err();
        assert!(matches!(err, ControllerError::Busy("polling")));
        assert_eq!(ctl.state(), &ControllerState::Polling(JobId::from("job-1")));

        ctl.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_events_are_ignored() {
        let (source, _calls) = ScriptedSource::failing();
        let mut ctl = controller(accepting("job-2"), source, ControllerConfig::default());
        ctl.submit(&valid_request()).await.unwrap();

        let stale = PollEvent::Terminal {
            job_id: JobId::from("job-1"),
            status: StatusResponse::with_status("completed"),
        };
        assert_eq!(ctl.handle_poll_event(stale), None);
        assert_eq!(ctl.state(), &ControllerState::Polling(JobId::from("job-2")));
        assert_eq!(ctl.presenter().len(), 1);

        ctl.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_regressive_status_is_not_applied() {
        let (source, _calls) = ScriptedSource::failing();
        let mut ctl = controller(accepting("job-1"), source, ControllerConfig::default());
        ctl.submit(&valid_request()).await.unwrap();

        let job_id = JobId::from("job-1");
        ctl.handle_poll_event(PollEvent::Update {
            job_id: job_id.clone(),
            status: StatusResponse::with_status("processing"),
        });
        ctl.handle_poll_event(PollEvent::Update {
            job_id,
            status: StatusResponse::with_status("uploading"),
        });

        assert_eq!(ctl.active_job().unwrap().status, JobStatus::Processing);
        ctl.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_polling() {
        let (source, mut calls) = ScriptedSource::failing();
        let mut ctl = controller(accepting("job-1"), source.clone(), ControllerConfig::default());

        ctl.submit(&valid_request()).await.unwrap();
        calls.recv().await.unwrap();
        ctl.shutdown();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.calls(), 1);
        assert!(ctl.state().is_idle());
        assert!(ctl.active_job().is_none());
        assert!(!ctl.is_polling());
        assert_eq!(ctl.run_until_idle().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_job_after_completion() {
        let mut submitter = MockJobSubmitter::new();
        let mut seq = mockall::Sequence::new();
        submitter
            .expect_submit()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Job::new("first")));
        submitter
            .expect_submit()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Job::new("second")));
        let (source, _calls) = ScriptedSource::new(vec![
            completed(1, "first.zip", false),
            transport_failure(),
            completed(2, "second.zip", true),
        ]);
        let mut ctl = controller(submitter, source, ControllerConfig::default());

        ctl.submit(&valid_request()).await.unwrap();
        let first = ctl.run_until_idle().await;
        ctl.submit(&valid_request()).await.unwrap();
        let second = ctl.run_until_idle().await;

        assert!(matches!(first, Some(JobOutcome::Completed(ref r)) if r.archive_ref == "first.zip"));
        assert!(matches!(second, Some(JobOutcome::Completed(ref r)) if r.archive_ref == "second.zip"));
    }
}
