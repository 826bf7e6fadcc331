//! Status polling for the active job.
//!
//! One poll task per job, cancelled through a [`CancellationToken`]. Ticks are
//! strictly sequential: the next wait starts only after the previous answer
//! (or failure) has been handled, so status queries never overlap.
//!
//! Transport failures are absorbed here. They produce no event and leave the
//! timer running, unless a failure limit is configured.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};

use vshot_models::{JobId, StatusResponse};

use crate::config::ControllerConfig;
use crate::failure::{FailureAction, FailureStreak};
use crate::logging::JobLogger;
use crate::transport::StatusSource;

/// What a poll tick reports back to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    /// Job still running
    Update { job_id: JobId, status: StatusResponse },
    /// Job reached completed or error; polling has stopped
    Terminal { job_id: JobId, status: StatusResponse },
    /// Failure limit reached; polling has stopped
    Unreachable { job_id: JobId, failures: u32 },
}

impl PollEvent {
    pub fn job_id(&self) -> &JobId {
        match self {
            PollEvent::Update { job_id, .. }
            | PollEvent::Terminal { job_id, .. }
            | PollEvent::Unreachable { job_id, .. } => job_id,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollEvent::Update { .. })
    }
}

struct ActivePoll {
    job_id: JobId,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns at most one running poll task.
pub struct StatusPoller<S: StatusSource + ?Sized> {
    source: Arc<S>,
    config: ControllerConfig,
    active: Option<ActivePoll>,
}

impl<S: StatusSource + ?Sized + 'static> StatusPoller<S> {
    pub fn new(source: Arc<S>, config: ControllerConfig) -> Self {
        Self {
            source,
            config,
            active: None,
        }
    }

    /// Start polling `job_id`, stopping any previous poll first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, job_id: JobId, events: mpsc::UnboundedSender<PollEvent>) {
        self.stop();

        let cancel = CancellationToken::new();
        let span = JobLogger::new(&job_id).poll_span();
        let handle = tokio::spawn(
            poll_loop(
                Arc::clone(&self.source),
                job_id.clone(),
                self.config.clone(),
                cancel.clone(),
                events,
            )
            .instrument(span),
        );

        debug!(job_id = %job_id, "Status polling started");
        self.active = Some(ActivePoll {
            job_id,
            cancel,
            handle,
        });
    }

    /// Cancel the running poll, if any. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
            debug!(job_id = %active.job_id, "Status polling stopped");
        }
    }

    /// Whether a poll task is alive.
    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.handle.is_finished())
    }

    pub fn active_job(&self) -> Option<&JobId> {
        self.active.as_ref().map(|active| &active.job_id)
    }
}

impl<S: StatusSource + ?Sized> Drop for StatusPoller<S> {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
        }
    }
}

async fn poll_loop<S: StatusSource + ?Sized>(
    source: Arc<S>,
    job_id: JobId,
    config: ControllerConfig,
    cancel: CancellationToken,
    events: mpsc::UnboundedSender<PollEvent>,
) {
    let mut failures = FailureStreak::from_config(&config);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(config.poll_interval) => {}
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = source.fetch_status(&job_id) => result,
        };

        let event = match result {
            Ok(status) => {
                let recovered = failures.reset();
                if recovered > config.logged_poll_failures {
                    info!(failures = recovered, "Status checks answering again");
                }
                if status.is_terminal() {
                    PollEvent::Terminal {
                        job_id: job_id.clone(),
                        status,
                    }
                } else {
                    PollEvent::Update {
                        job_id: job_id.clone(),
                        status,
                    }
                }
            }
            Err(e) => match failures.record() {
                FailureAction::Report { streak } => {
                    warn!(error = %e, streak, "Status check failed, retrying on next tick");
                    continue;
                }
                FailureAction::Silence { streak } => {
                    warn!(
                        error = %e,
                        streak,
                        "Status checks keep failing, further failures are not logged"
                    );
                    continue;
                }
                FailureAction::Retry => continue,
                FailureAction::GiveUp { streak } => {
                    warn!(error = %e, streak, "Giving up on status checks");
                    PollEvent::Unreachable {
                        job_id: job_id.clone(),
                        failures: streak,
                    }
                }
            },
        };

        let terminal = event.is_terminal();
        if terminal {
            debug!("Status polling finished");
        }
        if events.send(event).is_err() {
            warn!("Controller went away, stopping status polling");
            break;
        }
        if terminal {
            break;
        }
    }
}
