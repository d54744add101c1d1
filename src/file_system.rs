//! Tools for working with the file system.

use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};

/// Characters that are not allowed in file names on at least one platform.
const ILLEGAL_CHARS: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Removes every character that cannot appear in a file name, keeping everything else as is.
pub fn sanitize_title(title: &str) -> String {
    title.chars().filter(|c| !ILLEGAL_CHARS.contains(c)).collect()
}

/// The files one item reads and writes inside the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// `"{index}- {title}"`, shared by both files.
    pub base_name: String,
    /// The downloaded stream, deleted after a successful encode.
    pub intermediate: PathBuf,
    /// The MP3 file.
    pub output: PathBuf,
}

impl OutputPaths {
    /// Builds the paths for the item at the 1-based `index`.
    pub fn new(output_dir: impl AsRef<Path>, index: usize, title: &str) -> Self {
        let base_name = format!("{}- {}", index, sanitize_title(title));
        let dir = output_dir.as_ref();

        Self {
            intermediate: dir.join(format!("{}.mp4", base_name)),
            output: dir.join(format!("{}.mp3", base_name)),
            base_name,
        }
    }

    /// The file name of the MP3, for display.
    pub fn output_name(&self) -> String {
        format!("{}.mp3", self.base_name)
    }
}

/// Creates (or truncates) a file at the given destination.
///
/// # Arguments
///
/// * `destination` - The path to create the file at.
pub async fn create_file(destination: impl AsRef<Path>) -> std::io::Result<File> {
    let mut open_options = OpenOptions::new();
    open_options.write(true);
    open_options.create(true);
    open_options.truncate(true);

    open_options.open(destination).await
}

/// Removes a temporary file and logs any errors.
/// Does not propagate errors to avoid interrupting the execution flow.
///
/// # Returns
///
/// `true` if the file was deleted, `false` if it was missing or could not be removed.
pub async fn remove_temp_file(file_path: impl AsRef<Path>) -> bool {
    let path = file_path.as_ref();
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return false;
    }

    let result = tokio::fs::remove_file(path).await;
    if let Err(ref e) = result {
        log::warn!("Failed to remove temporary file {:?}: {}", path, e);
    }

    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_removes_illegal_chars() {
        assert_eq!(sanitize_title("a/b:c*d"), "abcd");
        assert_eq!(sanitize_title(r#"\/*?:"<>|"#), "");
    }

    #[test]
    fn test_sanitize_keeps_everything_else() {
        let title = "Daft Punk - One More Time (Official Video) [HD] #1 & é 日本";
        assert_eq!(sanitize_title(title), title);
    }

    #[test]
    fn test_output_paths() {
        let paths = OutputPaths::new("/music", 3, "AC/DC: Thunderstruck");
        assert_eq!(paths.base_name, "3- ACDC Thunderstruck");
        assert_eq!(paths.intermediate, PathBuf::from("/music/3- ACDC Thunderstruck.mp4"));
        assert_eq!(paths.output, PathBuf::from("/music/3- ACDC Thunderstruck.mp3"));
        assert_eq!(paths.output_name(), "3- ACDC Thunderstruck.mp3");
    }

    #[tokio::test]
    async fn test_remove_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1- x.mp4");
        std::fs::write(&path, b"data").unwrap();

        assert!(remove_temp_file(&path).await);
        assert!(!path.exists());
        assert!(!remove_temp_file(&path).await);
    }
}
