use crate::error::ItemError;
use crate::file_system;
use crate::service::{AudioStreamInfo, SearchHit, VideoInfo, VideoService};
use futures_util::StreamExt;
use regex::Regex;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_RANGE, HeaderMap, RANGE};
use rustypipe::client::RustyPipe;
use rustypipe::model::VideoItem;
use std::path::Path;
use std::sync::LazyLock;
use tokio::io::AsyncWriteExt;

/// Size of one ranged request. YouTube throttles single requests for a whole stream.
const CHUNK_SIZE: u64 = 10 * 1024 * 1024;

static VIDEO_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[?&]v=|youtu\.be/|/shorts/|/embed/|/live/)([a-zA-Z0-9_-]{11})")
        .expect("hard-coded pattern is valid")
});

/// Extracts the 11 character video id from a watch, short, embed or live link.
pub fn extract_video_id(url: &str) -> Option<&str> {
    VIDEO_ID
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str())
}

pub fn watch_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", id)
}

/// [`VideoService`] backed by RustyPipe for metadata and search, and reqwest for downloads.
pub struct YoutubeClient {
    rp: RustyPipe,
    http: reqwest::Client,
}

impl YoutubeClient {
    pub fn new() -> Self {
        Self {
            rp: RustyPipe::new(),
            http: reqwest::Client::new(),
        }
    }
}

impl Default for YoutubeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoService for YoutubeClient {
    async fn fetch_info(&self, url: &str) -> Result<VideoInfo, ItemError> {
        let id = extract_video_id(url).ok_or_else(|| ItemError::InvalidUrl(url.to_string()))?;
        log::debug!("Fetching player for video {}", id);

        let player = self
            .rp
            .query()
            .player(id)
            .await
            .map_err(|e| ItemError::Metadata(e.to_string()))?;

        let audio_streams = player
            .audio_streams
            .iter()
            .map(|stream| AudioStreamInfo {
                url: stream.url.clone(),
                average_bitrate: stream.average_bitrate,
                mime: stream.mime.clone(),
            })
            .collect();

        Ok(VideoInfo {
            title: video_title(player.details.name.as_deref(), id),
            audio_streams,
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ItemError> {
        let results = self
            .rp
            .query()
            .search::<VideoItem, _>(query)
            .await
            .map_err(|e| ItemError::Search(e.to_string()))?;

        Ok(results
            .items
            .items
            .into_iter()
            .map(|video| SearchHit {
                url: watch_url(&video.id),
                title: video.name,
            })
            .collect())
    }

    async fn download(
        &self,
        stream: &AudioStreamInfo,
        destination: &Path,
    ) -> Result<u64, ItemError> {
        log::debug!("Downloading {} stream to {:?}", stream.mime, destination);
        fetch_ranged(&self.http, &stream.url, destination, CHUNK_SIZE).await
    }
}

/// The title used for file names. Players without one fall back to the video id.
fn video_title(name: Option<&str>, id: &str) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            log::debug!("No title for video {}, using its id", id);
            id.to_string()
        }
    }
}

/// Downloads `url` to `destination` in `chunk_size` ranged requests.
///
/// Stops when the `Content-Range` total is reached or, when the server does not tell,
/// at the first short chunk. A server that ignores the range on the first request is
/// read to the end in one go.
async fn fetch_ranged(
    http: &reqwest::Client,
    url: &str,
    destination: &Path,
    chunk_size: u64,
) -> Result<u64, ItemError> {
    let mut file = file_system::create_file(destination).await?;
    let mut position: u64 = 0;

    loop {
        let range = format!("bytes={}-{}", position, position + chunk_size - 1);
        let response = http
            .get(url)
            .header(RANGE, range)
            .send()
            .await?
            .error_for_status()?;

        let partial = response.status() == StatusCode::PARTIAL_CONTENT;
        if !partial && position > 0 {
            return Err(ItemError::Download(format!(
                "server ignored the range request after {} bytes",
                position
            )));
        }
        let total = if partial {
            content_range_total(response.headers())
        } else {
            None
        };

        let mut body = response.bytes_stream();
        let mut received: u64 = 0;
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            received += chunk.len() as u64;
        }
        position += received;

        if !partial {
            break;
        }
        if received > chunk_size {
            return Err(ItemError::Download(format!(
                "server sent {} bytes for a {} byte range",
                received, chunk_size
            )));
        }
        match total {
            Some(total) if position == total => break,
            Some(total) if position > total => {
                return Err(ItemError::Download(format!(
                    "received {} bytes of a {} byte stream",
                    position, total
                )));
            }
            Some(total) if received == 0 => {
                return Err(ItemError::Download(format!(
                    "stream ended at {} of {} bytes",
                    position, total
                )));
            }
            Some(_) => continue,
            None if received == chunk_size => continue,
            None => break,
        }
    }

    file.flush().await?;
    Ok(position)
}

/// Reads the full length out of a `Content-Range: bytes 0-99/1234` header.
fn content_range_total(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_RANGE)?
        .to_str()
        .ok()?
        .rsplit('/')
        .next()?
        .parse()
        .ok()
}
