//! Units of background work with success and failure continuations.
//!
//! A [`BackgroundTask`] wraps a future producing `Result<T, DownloadError>`
//! together with at most one success handler and one failure handler.
//! Exactly one of them runs, once, when the future settles. Tasks are handed
//! to a [`TaskExecutor`], which decides whether they run inline or on a
//! worker; the observable result is the same either way.

mod executor;

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use thiserror::Error;
use tracing::{debug, warn};

use crate::download::DownloadError;

pub use executor::{
    CurrentThreadTaskExecutor, DEFAULT_MAX_CONCURRENT_TASKS, Job, TaskExecutor, TaskHandle,
    TokioTaskExecutor,
};

type Work<T> = Pin<Box<dyn Future<Output = Result<T, DownloadError>> + Send + 'static>>;
type SuccessHandler<T> = Box<dyn FnOnce(T) + Send + 'static>;
type FailureHandler = Box<dyn FnOnce(&DownloadError) + Send + 'static>;

/// How a submitted task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// The work returned `Ok` and the success handler ran.
    Succeeded,
    /// The work returned `Err` and the failure handler ran.
    Failed,
}

/// Errors raised by the executor itself rather than by the task's work.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("invalid concurrency value {value}: must be between 1 and {max}")]
    InvalidConcurrency { value: usize, max: usize },

    #[error("task '{name}' panicked on the worker")]
    Panicked { name: String },

    #[error("task '{name}' was aborted before completion")]
    Aborted { name: String },
}

/// A deferred unit of work plus its continuations.
pub struct BackgroundTask<T> {
    name: String,
    work: Work<T>,
    on_success: Option<SuccessHandler<T>>,
    on_failure: Option<FailureHandler>,
}

impl<T: Send + 'static> BackgroundTask<T> {
    /// Wraps `work` without running it.
    pub fn new<F>(name: impl Into<String>, work: F) -> Self
    where
        F: Future<Output = Result<T, DownloadError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            work: Box::pin(work),
            on_success: None,
            on_failure: None,
        }
    }

    /// Sets the handler called with the result on success. Replaces any
    /// previously set success handler.
    #[must_use]
    pub fn on_success(mut self, handler: impl FnOnce(T) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(handler));
        self
    }

    /// Sets the handler called with the cause on failure. Replaces any
    /// previously set failure handler.
    #[must_use]
    pub fn on_failure(mut self, handler: impl FnOnce(&DownloadError) + Send + 'static) -> Self {
        self.on_failure = Some(Box::new(handler));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the work to completion and dispatches to one handler.
    pub async fn run(self) -> TaskStatus {
        let Self {
            name,
            work,
            on_success,
            on_failure,
        } = self;

        match work.await {
            Ok(value) => {
                debug!(task = %name, "task succeeded");
                if let Some(handler) = on_success {
                    handler(value);
                }
                TaskStatus::Succeeded
            }
            Err(error) => {
                warn!(task = %name, error = %error, "task failed");
                if let Some(handler) = on_failure {
                    handler(&error);
                }
                TaskStatus::Failed
            }
        }
    }

    /// Erases the result type so an executor can schedule the task.
    #[must_use]
    pub fn into_job(self) -> Job {
        let name = self.name.clone();
        Job::new(name, self.run())
    }
}

impl<T> fmt::Debug for BackgroundTask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundTask")
            .field("name", &self.name)
            .field("has_on_success", &self.on_success.is_some())
            .field("has_on_failure", &self.on_failure.is_some())
            .finish_non_exhaustive()
    }
}
