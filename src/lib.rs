//! Batch YouTube to MP3 conversion.
//!
//! Items (links or search phrases) are normalized by [`input`], then handed to a
//! [`batch::Orchestrator`] which processes them one by one on a background task and
//! reports everything it does as [`events::BatchEvent`]s.

pub mod batch;
pub mod config;
pub mod encoder;
pub mod error;
pub mod events;
pub mod executor;
pub mod file_system;
pub mod input;
mod metadata;
pub mod pipeline;
pub mod resolve;
pub mod service;
pub mod youtube;

pub use batch::{BatchHandle, BatchSummary, Orchestrator, RunState, StartError};
pub use encoder::{Encoder, FfmpegEncoder};
pub use error::{Error, ItemError, Result};
pub use events::{BatchEvent, LogLevel, LogLine};
pub use input::{InputBuffer, InputMode, WorkItem, normalize};
pub use pipeline::{ItemFailure, ItemOutcome, Pipeline, PipelineOptions, Stage};
pub use service::{AudioStreamInfo, SearchHit, VideoInfo, VideoService};
pub use youtube::YoutubeClient;
