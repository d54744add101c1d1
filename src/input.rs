//! Turning raw user text into a batch of work items.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

static YOUTUBE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?(?:youtube\.com/watch\?v=|youtu\.be/)[a-zA-Z0-9_-]+")
        .expect("hard-coded pattern is valid")
});

/// How the input text is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum InputMode {
    /// Only YouTube watch and short links found anywhere in the text.
    #[value(name = "links")]
    #[serde(rename = "links")]
    LinksOnly,
    /// One item per line, each either a URL or a search phrase.
    #[default]
    #[value(name = "search")]
    #[serde(rename = "search")]
    LinksOrSearch,
}

impl InputMode {
    /// The warning shown when the input yields nothing to do.
    pub fn empty_warning(&self) -> &'static str {
        match self {
            InputMode::LinksOnly => "No valid YouTube links found.",
            InputMode::LinksOrSearch => "No links or search terms found.",
        }
    }
}

/// A single trimmed, non-empty line of work: a URL or a search phrase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkItem(String);

impl WorkItem {
    /// Returns `None` when the text is empty after trimming.
    pub fn new(text: impl AsRef<str>) -> Option<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the item is already a URL and needs no search.
    pub fn is_url(&self) -> bool {
        self.0.to_lowercase().starts_with("http")
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parses `text` into a deduplicated list of items, keeping first-seen order.
pub fn normalize(text: &str, mode: InputMode) -> Vec<WorkItem> {
    let candidates: Box<dyn Iterator<Item = &str> + '_> = match mode {
        InputMode::LinksOnly => Box::new(YOUTUBE_LINK.find_iter(text).map(|m| m.as_str())),
        InputMode::LinksOrSearch => Box::new(text.lines()),
    };

    let mut seen = HashSet::new();
    candidates
        .filter_map(WorkItem::new)
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Accumulates raw input text from every source before it is normalized.
#[derive(Debug, Default, Clone)]
pub struct InputBuffer {
    text: String,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: impl AsRef<str>) {
        self.text.push_str(line.as_ref());
        self.text.push('\n');
    }

    /// Appends the whole content of a text file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Import`] if the file cannot be read as UTF-8 text.
    pub fn import_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::Import {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("File loaded: {}", path.display());
        self.push_line(content);
        Ok(())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn items(&self, mode: InputMode) -> Vec<WorkItem> {
        normalize(&self.text, mode)
    }
}
