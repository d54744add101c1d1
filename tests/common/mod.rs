#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, mpsc::UnboundedReceiver};
use yt2mp3::{
    AudioStreamInfo, BatchEvent, Encoder, ItemError, Orchestrator, Pipeline, PipelineOptions,
    SearchHit, VideoInfo, VideoService, WorkItem,
};

pub fn video(title: &str, bitrates: &[u32]) -> VideoInfo {
    VideoInfo {
        title: title.to_string(),
        audio_streams: bitrates
            .iter()
            .map(|bitrate| AudioStreamInfo {
                url: format!("https://media.example/{}/{}", title, bitrate),
                average_bitrate: *bitrate,
                mime: "audio/mp4".to_string(),
            })
            .collect(),
    }
}

/// In-memory video platform. Unknown URLs fail to fetch, unknown queries find nothing.
#[derive(Default)]
pub struct FakeService {
    pub videos: HashMap<String, VideoInfo>,
    pub results: HashMap<String, Vec<SearchHit>>,
    /// Queries whose search call errors out.
    pub broken_queries: Vec<String>,
    /// URLs whose metadata fetch panics.
    pub panicking_urls: Vec<String>,
    /// When set, every download waits for a permit.
    pub gate: Option<Arc<Notify>>,
    pub searches: Mutex<Vec<String>>,
    pub downloads: Mutex<Vec<PathBuf>>,
}

impl FakeService {
    pub fn with_video(mut self, url: &str, info: VideoInfo) -> Self {
        self.videos.insert(url.to_string(), info);
        self
    }

    pub fn with_results(mut self, query: &str, hits: Vec<SearchHit>) -> Self {
        self.results.insert(query.to_string(), hits);
        self
    }

    pub fn download_count(&self) -> usize {
        self.downloads.lock().unwrap().len()
    }

    pub fn search_count(&self) -> usize {
        self.searches.lock().unwrap().len()
    }
}

impl VideoService for FakeService {
    async fn fetch_info(&self, url: &str) -> Result<VideoInfo, ItemError> {
        if self.panicking_urls.iter().any(|u| u == url) {
            panic!("player response for {} is garbage", url);
        }
        self.videos
            .get(url)
            .cloned()
            .ok_or_else(|| ItemError::Metadata(format!("video unavailable: {}", url)))
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ItemError> {
        self.searches.lock().unwrap().push(query.to_string());
        if self.broken_queries.iter().any(|q| q == query) {
            return Err(ItemError::Search("connection reset".to_string()));
        }
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }

    async fn download(
        &self,
        stream: &AudioStreamInfo,
        destination: &Path,
    ) -> Result<u64, ItemError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.downloads.lock().unwrap().push(destination.to_path_buf());
        let body = format!("audio from {}", stream.url);
        tokio::fs::write(destination, &body).await?;
        Ok(body.len() as u64)
    }
}

/// Copies input to output, failing for inputs whose name contains `fail_on`.
#[derive(Default)]
pub struct FakeEncoder {
    pub fail_on: Option<String>,
    pub calls: Mutex<Vec<PathBuf>>,
}

impl FakeEncoder {
    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_on: Some(marker.to_string()),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Encoder for FakeEncoder {
    async fn encode(&self, input: &Path, output: &Path) -> Result<(), ItemError> {
        self.calls.lock().unwrap().push(input.to_path_buf());
        let name = input.to_string_lossy().into_owned();
        if self.fail_on.as_deref().is_some_and(|marker| name.contains(marker)) {
            return Err(ItemError::Encode {
                code: 1,
                stderr: "simulated encoder failure".to_string(),
            });
        }
        let audio = tokio::fs::read(input).await?;
        tokio::fs::write(output, [b"mp3:".as_slice(), audio.as_slice()].concat()).await?;
        Ok(())
    }
}

pub fn orchestrator(
    service: Arc<FakeService>,
    encoder: Arc<FakeEncoder>,
) -> Orchestrator<FakeService, FakeEncoder> {
    Orchestrator::new(Pipeline::new(service, encoder, PipelineOptions { tag: false }))
}

pub fn items(lines: &[&str]) -> Vec<WorkItem> {
    lines.iter().filter_map(|line| WorkItem::new(line)).collect()
}

pub async fn drain(mut events: UnboundedReceiver<BatchEvent>) -> Vec<BatchEvent> {
    let mut collected = Vec::new();
    while let Some(event) = events.recv().await {
        collected.push(event);
    }
    collected
}

pub fn log_lines(events: &[BatchEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            BatchEvent::Log(line) => Some(line.message.clone()),
            _ => None,
        })
        .collect()
}

pub fn last_progress(events: &[BatchEvent]) -> Option<(usize, usize)> {
    events.iter().rev().find_map(|event| match event {
        BatchEvent::Progress { done, total } => Some((*done, *total)),
        _ => None,
    })
}
