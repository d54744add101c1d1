//! Processing of a single work item, from resolution to the finished MP3.

use crate::encoder::Encoder;
use crate::error::ItemError;
use crate::events::EventSink;
use crate::file_system::{self, OutputPaths};
use crate::input::WorkItem;
use crate::metadata::tag_mp3;
use crate::resolve::resolve;
use crate::service::{AudioStreamInfo, VideoService};
use futures_util::FutureExt;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where an item is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolving,
    FetchingInfo,
    CheckingExisting,
    Downloading,
    Converting,
    CleaningUp,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Resolving => "resolving",
            Stage::FetchingInfo => "fetching info",
            Stage::CheckingExisting => "checking existing",
            Stage::Downloading => "downloading",
            Stage::Converting => "converting",
            Stage::CleaningUp => "cleaning up",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Completed { path: PathBuf },
    /// The MP3 was already there and has not been touched.
    Skipped { path: PathBuf },
}

#[derive(Debug)]
pub struct ItemFailure {
    pub item: WorkItem,
    pub stage: Stage,
    pub error: ItemError,
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (while {}): {}", self.item, self.stage, self.error)
    }
}

/// Picks the audio stream with the highest average bitrate, the first one on ties.
pub fn select_audio_stream(streams: &[AudioStreamInfo]) -> Option<&AudioStreamInfo> {
    streams.iter().fold(None, |best, stream| match best {
        Some(best) if best.average_bitrate >= stream.average_bitrate => Some(best),
        _ => Some(stream),
    })
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Write title and source tags into the finished MP3.
    pub tag: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { tag: true }
    }
}

/// Runs items through resolve, fetch, download, encode and cleanup.
pub struct Pipeline<S, E> {
    service: Arc<S>,
    encoder: Arc<E>,
    options: PipelineOptions,
}

impl<S, E> Clone for Pipeline<S, E> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            encoder: Arc::clone(&self.encoder),
            options: self.options.clone(),
        }
    }
}

impl<S: VideoService, E: Encoder> Pipeline<S, E> {
    pub fn new(service: Arc<S>, encoder: Arc<E>, options: PipelineOptions) -> Self {
        Self {
            service,
            encoder,
            options,
        }
    }

    /// Processes the item at the 1-based `index`.
    ///
    /// Never panics and never leaks an error past its return value: whatever goes wrong
    /// is reported as an [`ItemFailure`] carrying the stage it happened in.
    pub async fn process(
        &self,
        index: usize,
        total: usize,
        item: &WorkItem,
        output_dir: &Path,
        events: &EventSink,
    ) -> Result<ItemOutcome, ItemFailure> {
        let mut stage = Stage::Resolving;
        let result = AssertUnwindSafe(self.run(index, total, item, output_dir, events, &mut stage))
            .catch_unwind()
            .await;

        let error = match result {
            Ok(Ok(outcome)) => return Ok(outcome),
            Ok(Err(error)) => error,
            Err(panic) => ItemError::Panicked(panic_message(panic.as_ref())),
        };

        Err(ItemFailure {
            item: item.clone(),
            stage,
            error,
        })
    }

    async fn run(
        &self,
        index: usize,
        total: usize,
        item: &WorkItem,
        output_dir: &Path,
        events: &EventSink,
        stage: &mut Stage,
    ) -> Result<ItemOutcome, ItemError> {
        events.status(format!("Processing ({}/{}): Analyzing link...", index, total));
        let target = resolve(self.service.as_ref(), item, events).await?;

        *stage = Stage::FetchingInfo;
        let video = self.service.fetch_info(&target.url).await?;
        let stream = select_audio_stream(&video.audio_streams)
            .ok_or_else(|| ItemError::NoAudioStream(target.url.clone()))?;
        log::debug!(
            "Selected {} stream at {} bit/s for {}",
            stream.mime,
            stream.average_bitrate,
            target.url
        );

        *stage = Stage::CheckingExisting;
        let paths = OutputPaths::new(output_dir, index, &video.title);
        if tokio::fs::try_exists(&paths.output).await? {
            events.info(format!("SKIPPED (Exists): {}", paths.output_name()));
            return Ok(ItemOutcome::Skipped { path: paths.output });
        }

        *stage = Stage::Downloading;
        let safe_title = file_system::sanitize_title(&video.title);
        events.status(format!("Downloading ({}/{}): {}", index, total, safe_title));
        events.info(format!("Downloading: {}...", safe_title));
        let bytes = self.service.download(stream, &paths.intermediate).await?;
        log::debug!("Downloaded {} bytes to {:?}", bytes, paths.intermediate);

        *stage = Stage::Converting;
        events.status(format!("Converting ({}/{}): {}", index, total, safe_title));
        self.encoder.encode(&paths.intermediate, &paths.output).await?;

        *stage = Stage::CleaningUp;
        file_system::remove_temp_file(&paths.intermediate).await;
        if self.options.tag {
            let path = paths.output.clone();
            let (title, url) = (video.title.clone(), target.url.clone());
            let tagged = tokio::task::spawn_blocking(move || {
                tag_mp3(&path, &title, &url).map_err(|e| e.to_string())
            })
            .await
            .unwrap_or_else(|e| Err(e.to_string()));
            if let Err(e) = tagged {
                events.warn(format!("Could not tag {}: {}", paths.output_name(), e));
            }
        }

        *stage = Stage::Done;
        events.info(format!("COMPLETED: {}", paths.output_name()));
        Ok(ItemOutcome::Completed { path: paths.output })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}
