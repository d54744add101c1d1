//! MP3 encoding through an external `ffmpeg` process.

use crate::error::ItemError;
use crate::executor::Executor;
use std::future::Future;
use std::path::{Path, PathBuf};

/// Turns a downloaded media file into an MP3.
pub trait Encoder: Send + Sync + 'static {
    fn encode(
        &self,
        input: &Path,
        output: &Path,
    ) -> impl Future<Output = Result<(), ItemError>> + Send;
}

/// Runs `ffmpeg` with a fixed high quality VBR profile.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    executable: PathBuf,
}

impl FfmpegEncoder {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Picks the executable: explicit path, then the `FFMPEG` environment variable,
    /// then `ffmpeg` on `PATH`.
    pub fn locate(explicit: Option<PathBuf>) -> Self {
        let executable = explicit
            .or_else(|| std::env::var_os("FFMPEG").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("ffmpeg"));
        Self::new(executable)
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// The full argument list for one conversion.
    pub fn args(input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            input.to_string_lossy().into_owned(),
            "-vn".to_string(),
            "-acodec".to_string(),
            "libmp3lame".to_string(),
            // VBR quality 2, roughly 170-210 kbit/s
            "-q:a".to_string(),
            "2".to_string(),
            "-y".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            output.to_string_lossy().into_owned(),
        ]
    }
}

impl Encoder for FfmpegEncoder {
    async fn encode(&self, input: &Path, output: &Path) -> Result<(), ItemError> {
        let executor = Executor {
            executable_path: self.executable.clone(),
            args: Self::args(input, output),
        };

        let result = executor.execute().await?;
        if !result.stderr.is_empty() {
            log::debug!("ffmpeg: {}", result.stderr);
        }
        Ok(())
    }
}
