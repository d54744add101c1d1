//! The batch orchestrator: one worker, one item at a time, no item can stop the batch.

use crate::encoder::Encoder;
use crate::events::{BatchEvent, EventSink};
use crate::input::WorkItem;
use crate::pipeline::{ItemFailure, ItemOutcome, Pipeline};
use crate::service::VideoService;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
}

/// Why a batch did not start. Nothing has been touched when this is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartError {
    #[error("Please select an output folder first.")]
    NoOutputDir,
    #[error("{0}")]
    NoItems(&'static str),
    /// Another batch is running; the request is ignored.
    #[error("A batch is already running.")]
    Busy,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub completed: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<ItemFailure>,
}

impl BatchSummary {
    fn record(&mut self, result: Result<ItemOutcome, ItemFailure>) {
        match result {
            Ok(ItemOutcome::Completed { path }) => self.completed.push(path),
            Ok(ItemOutcome::Skipped { path }) => self.skipped.push(path),
            Err(failure) => self.failed.push(failure),
        }
    }

    /// Number of items processed, whatever their outcome.
    pub fn processed(&self) -> usize {
        self.completed.len() + self.skipped.len() + self.failed.len()
    }
}

/// A running batch.
pub struct BatchHandle {
    pub events: UnboundedReceiver<BatchEvent>,
    worker: JoinHandle<BatchSummary>,
}

impl BatchHandle {
    /// Waits for the worker to go through every item.
    pub async fn wait(self) -> Result<BatchSummary, tokio::task::JoinError> {
        self.worker.await
    }

    /// Splits the handle for callers that drain events and await the worker separately.
    pub fn into_parts(self) -> (UnboundedReceiver<BatchEvent>, JoinHandle<BatchSummary>) {
        (self.events, self.worker)
    }
}

/// Owns the run state and starts batches on a background task.
pub struct Orchestrator<S, E> {
    pipeline: Pipeline<S, E>,
    state: Arc<Mutex<RunState>>,
}

impl<S: VideoService, E: Encoder> Orchestrator<S, E> {
    pub fn new(pipeline: Pipeline<S, E>) -> Self {
        Self {
            pipeline,
            state: Arc::new(Mutex::new(RunState::Idle)),
        }
    }

    pub fn state(&self) -> RunState {
        *lock(&self.state)
    }

    /// Validates the request and spawns the worker.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// [`StartError::Busy`] while another batch runs, otherwise the first failed pre-flight check.
    pub fn start(
        &self,
        items: Vec<WorkItem>,
        output_dir: Option<PathBuf>,
        empty_warning: &'static str,
    ) -> Result<BatchHandle, StartError> {
        let mut state = lock(&self.state);
        if *state == RunState::Running {
            log::debug!("Start requested while a batch is running, ignoring");
            return Err(StartError::Busy);
        }
        let output_dir = output_dir
            .filter(|dir| !dir.as_os_str().is_empty())
            .ok_or(StartError::NoOutputDir)?;
        if items.is_empty() {
            return Err(StartError::NoItems(empty_warning));
        }
        *state = RunState::Running;
        drop(state);

        let (tx, rx) = mpsc::unbounded_channel();
        let guard = RunGuard(Arc::clone(&self.state));
        let pipeline = self.pipeline.clone();
        let worker = tokio::spawn(async move {
            let summary = run_batch(&pipeline, &items, output_dir, EventSink::new(tx)).await;
            drop(guard);
            summary
        });

        Ok(BatchHandle { events: rx, worker })
    }
}

async fn run_batch<S: VideoService, E: Encoder>(
    pipeline: &Pipeline<S, E>,
    items: &[WorkItem],
    output_dir: PathBuf,
    events: EventSink,
) -> BatchSummary {
    let total = items.len();
    let mut summary = BatchSummary {
        total,
        ..BatchSummary::default()
    };

    events.emit(BatchEvent::Started { total });
    events.emit(BatchEvent::Progress { done: 0, total });
    events.info(format!("--- Started: Processing {} items ---", total));
    if let Err(e) = tokio::fs::create_dir_all(&output_dir).await {
        events.error(format!(
            "Could not create output folder {}: {}",
            output_dir.display(),
            e
        ));
    }

    for (index, item) in items.iter().enumerate().map(|(i, item)| (i + 1, item)) {
        let result = pipeline.process(index, total, item, &output_dir, &events).await;
        if let Err(failure) = &result {
            events.error(format!("ERROR ({}): {}", failure.item, failure.error));
        }
        summary.record(result);
        events.emit(BatchEvent::Progress { done: index, total });
    }

    events.status("All tasks completed.");
    events.info("--- FINISHED ---");
    events.emit(BatchEvent::Finished {
        completed: summary.completed.len(),
        skipped: summary.skipped.len(),
        failed: summary.failed.len(),
    });
    summary
}

/// Puts the orchestrator back to idle when the worker is done, even if it was torn down early.
struct RunGuard(Arc<Mutex<RunState>>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        *lock(&self.0) = RunState::Idle;
    }
}

fn lock(state: &Mutex<RunState>) -> MutexGuard<'_, RunState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
