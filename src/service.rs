//! The contract the orchestrator needs from a video platform.

use crate::error::ItemError;
use std::future::Future;
use std::path::Path;

/// Title and audio streams of one video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub title: String,
    /// Audio-only streams, in the order the platform reported them.
    pub audio_streams: Vec<AudioStreamInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioStreamInfo {
    pub url: String,
    /// Average bitrate in bits per second.
    pub average_bitrate: u32,
    pub mime: String,
}

/// One result of a free-text search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    /// Canonical watch URL.
    pub url: String,
}

/// Resolves, describes and downloads videos.
///
/// Every call may be slow and may fail; failures only ever affect the item being processed.
pub trait VideoService: Send + Sync + 'static {
    /// Fetches the title and audio streams of the video at `url`.
    fn fetch_info(&self, url: &str) -> impl Future<Output = Result<VideoInfo, ItemError>> + Send;

    /// Searches for videos, best match first.
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<SearchHit>, ItemError>> + Send;

    /// Writes `stream` to `destination`, returning the number of bytes written.
    fn download(
        &self,
        stream: &AudioStreamInfo,
        destination: &Path,
    ) -> impl Future<Output = Result<u64, ItemError>> + Send;
}
