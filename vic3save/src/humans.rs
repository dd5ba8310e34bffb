//! The list of human-played country tags.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::LoadError;

/// Default file name, looked up in the working directory.
pub const DEFAULT_HUMANS_FILE: &str = "humans.txt";

/// Tags read from a humans file: one per line, `#` comments and blanks ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HumanFilter {
    tags: BTreeSet<String>,
}

impl HumanFilter {
    pub fn parse(text: &str) -> Self {
        let tags = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { tags }
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        let filter = Self::parse(&text);
        log::info!("Loaded {} human countries from {}", filter.len(), path.display());
        Ok(filter)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// An empty filter lets everything through.
    pub fn allows(&self, tag: &str) -> bool {
        self.tags.is_empty() || self.contains(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
