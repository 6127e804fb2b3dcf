//! Single-slot job runner.
//!
//! At most one job runs at a time; a submit while one is running is rejected.
//! The job executes on a tokio task and posts [`JobEvent`]s over a channel, so
//! the presentation layer applies progress and results on its own thread.

use super::{Job, JobError, JobOutput, run_job};
use crate::tts::TtsBackend;
use log::{info, warn};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Lifecycle of the runner's single slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Messages from a running job to the presentation layer.
#[derive(Debug)]
pub enum JobEvent {
    /// Overall progress in percent, never decreasing.
    Progress(f64),
    /// Terminal outcome. Always the last event.
    Finished(Result<JobOutput, JobError>),
}

fn lock(state: &Mutex<JobState>) -> MutexGuard<'_, JobState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Marks the slot as failed if the task ends without recording an outcome
/// (e.g. it panicked).
struct SlotGuard {
    state: Arc<Mutex<JobState>>,
    finished: bool,
}

impl SlotGuard {
    fn finish(&mut self, outcome: JobState) {
        *lock(&self.state) = outcome;
        self.finished = true;
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        if !self.finished {
            *lock(&self.state) = JobState::Failed;
        }
    }
}

/// Runs jobs one at a time against a shared TTS backend.
pub struct JobRunner {
    backend: Arc<dyn TtsBackend>,
    state: Arc<Mutex<JobState>>,
}

impl JobRunner {
    pub fn new(backend: Arc<dyn TtsBackend>) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(JobState::Idle)),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> JobState {
        *lock(&self.state)
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.state() == JobState::Running
    }

    /// Return to Idle after the outcome has been shown to the user.
    pub fn acknowledge(&self) {
        let mut state = lock(&self.state);
        if *state != JobState::Running {
            *state = JobState::Idle;
        }
    }

    /// Start a job on a background task.
    ///
    /// Must be called within a tokio runtime. Returns `JobError::Busy` if a job
    /// is already running.
    pub fn submit(&self, job: Job) -> Result<JobHandle, JobError> {
        {
            let mut state = lock(&self.state);
            if *state == JobState::Running {
                warn!("Rejecting job: another job is running");
                return Err(JobError::Busy);
            }
            *state = JobState::Running;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let backend = Arc::clone(&self.backend);
        let mut guard = SlotGuard {
            state: Arc::clone(&self.state),
            finished: false,
        };

        let task = tokio::spawn(async move {
            info!("Job started ({} backend)", backend.name());
            let progress_tx = tx.clone();
            let result = run_job(backend.as_ref(), &job, move |percent| {
                let _ = progress_tx.send(JobEvent::Progress(percent));
            })
            .await;

            match &result {
                Ok(output) => info!("Job succeeded: {}", output.path.display()),
                Err(e) => warn!("Job failed: {}", e),
            }

            // Free the slot before notifying so a resubmit on Finished is accepted
            guard.finish(if result.is_ok() {
                JobState::Succeeded
            } else {
                JobState::Failed
            });
            let _ = tx.send(JobEvent::Finished(result));
        });

        Ok(JobHandle { events: rx, task })
    }
}

/// Receiving end of a submitted job.
pub struct JobHandle {
    events: mpsc::UnboundedReceiver<JobEvent>,
    task: JoinHandle<()>,
}

impl JobHandle {
    /// Next event, or `None` once the job is gone.
    #[cfg(test)]
    pub async fn next_event(&mut self) -> Option<JobEvent> {
        self.events.recv().await
    }

    /// Drain events until the job finishes, passing progress to `on_progress`.
    pub async fn wait<F>(mut self, mut on_progress: F) -> Result<JobOutput, JobError>
    where
        F: FnMut(f64),
    {
        while let Some(event) = self.events.recv().await {
            match event {
                JobEvent::Progress(percent) => on_progress(percent),
                JobEvent::Finished(result) => return result,
            }
        }

        match self.task.await {
            Err(e) => Err(JobError::Aborted(e.to_string())),
            Ok(()) => Err(JobError::Aborted("no result was posted".to_string())),
        }
    }
}
