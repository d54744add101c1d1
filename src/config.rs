//! Optional user defaults read from `<config dir>/yt2mp3/config.toml`.

use crate::error::{Error, Result};
use crate::input::InputMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything is optional; command line flags win over these values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub output_dir: Option<PathBuf>,
    pub ffmpeg: Option<PathBuf>,
    pub mode: Option<InputMode>,
    pub tags: Option<bool>,
}

impl Config {
    /// `None` when the platform has no config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("yt2mp3").join("config.toml"))
    }

    /// Reads the config at `path`. A missing or empty file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file exists but is not valid TOML for this struct.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() || fs::metadata(path)?.len() == 0 {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        toml::from_str::<Config>(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the config from its default location, if there is one.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parses_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "output_dir = \"/home/me/Music\"\nffmpeg = \"/usr/bin/ffmpeg\"\nmode = \"links\"\ntags = false\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.output_dir, Some(PathBuf::from("/home/me/Music")));
        assert_eq!(config.ffmpeg, Some(PathBuf::from("/usr/bin/ffmpeg")));
        assert_eq!(config.mode, Some(InputMode::LinksOnly));
        assert_eq!(config.tags, Some(false));
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "mode = \"search\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.mode, Some(InputMode::LinksOrSearch));
        assert!(config.output_dir.is_none());
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "mode = [not toml").unwrap();

        assert!(matches!(Config::load(&path), Err(Error::Config { .. })));
    }
}
