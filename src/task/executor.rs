//! Executors that run [`Job`]s either inline or on tokio workers.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use super::{TaskError, TaskStatus};

/// Largest accepted concurrency limit for [`TokioTaskExecutor`].
const MAX_CONCURRENT_TASKS: usize = 100;

/// Default concurrency limit for [`TokioTaskExecutor`].
pub const DEFAULT_MAX_CONCURRENT_TASKS: usize = 4;

/// A type-erased task ready to be scheduled.
pub struct Job {
    name: String,
    future: Pin<Box<dyn Future<Output = TaskStatus> + Send + 'static>>,
}

impl Job {
    pub fn new(
        name: impl Into<String>,
        future: impl Future<Output = TaskStatus> + Send + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            future: Box::pin(future),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn run(self) -> TaskStatus {
        self.future.await
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Handle to a submitted job.
#[derive(Debug)]
pub struct TaskHandle {
    name: String,
    state: HandleState,
}

#[derive(Debug)]
enum HandleState {
    Finished(TaskStatus),
    Spawned(JoinHandle<TaskStatus>),
}

impl TaskHandle {
    fn finished(name: String, status: TaskStatus) -> Self {
        Self {
            name,
            state: HandleState::Finished(status),
        }
    }

    fn spawned(name: String, handle: JoinHandle<TaskStatus>) -> Self {
        Self {
            name,
            state: HandleState::Spawned(handle),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        match &self.state {
            HandleState::Finished(_) => true,
            HandleState::Spawned(handle) => handle.is_finished(),
        }
    }

    /// Requests cancellation of a job still running on a worker.
    ///
    /// Work dropped this way never reaches its handlers. Jobs that already
    /// finished are unaffected.
    pub fn abort(&self) {
        if let HandleState::Spawned(handle) = &self.state {
            handle.abort();
        }
    }

    /// Waits for the job to settle.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Panicked`] or [`TaskError::Aborted`] when the
    /// worker did not run the job to completion.
    pub async fn wait(self) -> Result<TaskStatus, TaskError> {
        match self.state {
            HandleState::Finished(status) => Ok(status),
            HandleState::Spawned(handle) => handle.await.map_err(|error| {
                if error.is_panic() {
                    TaskError::Panicked { name: self.name }
                } else {
                    TaskError::Aborted { name: self.name }
                }
            }),
        }
    }
}

/// Schedules jobs. Implementations must run every submitted job at most
/// once and must not change its outcome.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    async fn submit(&self, job: Job) -> TaskHandle;
}

/// Runs each job to completion inside `submit`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CurrentThreadTaskExecutor;

#[async_trait]
impl TaskExecutor for CurrentThreadTaskExecutor {
    #[instrument(level = "debug", skip(self, job), fields(task = %job.name()))]
    async fn submit(&self, job: Job) -> TaskHandle {
        let name = job.name().to_string();
        let status = job.run().await;
        TaskHandle::finished(name, status)
    }
}

/// Spawns each job on the tokio runtime, with at most `max_concurrent`
/// jobs running at once.
#[derive(Debug, Clone)]
pub struct TokioTaskExecutor {
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
}

impl TokioTaskExecutor {
    /// # Errors
    ///
    /// Returns [`TaskError::InvalidConcurrency`] unless `max_concurrent` is
    /// within 1..=100.
    pub fn new(max_concurrent: usize) -> Result<Self, TaskError> {
        if !(1..=MAX_CONCURRENT_TASKS).contains(&max_concurrent) {
            return Err(TaskError::InvalidConcurrency {
                value: max_concurrent,
                max: MAX_CONCURRENT_TASKS,
            });
        }
        debug!(max_concurrent, "creating tokio task executor");
        Ok(Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        })
    }

    #[must_use]
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
}

impl Default for TokioTaskExecutor {
    fn default() -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENT_TASKS)),
            max_concurrent: DEFAULT_MAX_CONCURRENT_TASKS,
        }
    }
}

#[async_trait]
impl TaskExecutor for TokioTaskExecutor {
    #[instrument(level = "debug", skip(self, job), fields(task = %job.name()))]
    async fn submit(&self, job: Job) -> TaskHandle {
        let name = job.name().to_string();
        let semaphore = Arc::clone(&self.semaphore);
        let handle = tokio::spawn(async move {
            // Permit is released when the job finishes.
            let _permit = semaphore.acquire_owned().await.ok();
            job.run().await
        });
        TaskHandle::spawned(name, handle)
    }
}
