use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{GateError, Result};

use super::list::PublicSuffixList;

/// Default update interval: 7 days
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Default download location of the Public Suffix List
pub const DEFAULT_SUFFIX_LIST_URL: &str = "https://publicsuffix.org/list/public_suffix_list.dat";

/// Default cache file name of the Public Suffix List
pub const DEFAULT_SUFFIX_LIST_FILENAME: &str = "public_suffix_list.dat";

/// Trait for loading the public suffix dataset
pub trait SuffixLoader: Send + Sync {
    /// Load the suffix list. Called at most once per run.
    fn load(&self) -> Result<PublicSuffixList>;
}

/// File-based SuffixLoader
pub struct FileSuffixLoader {
    path: PathBuf,
    include_private: bool,
}

impl FileSuffixLoader {
    /// Create a new FileSuffixLoader
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            include_private: false,
        }
    }

    /// Also honour rules from the PRIVATE section
    pub fn with_private_domains(mut self, include: bool) -> Self {
        self.include_private = include;
        self
    }
}

impl SuffixLoader for FileSuffixLoader {
    fn load(&self) -> Result<PublicSuffixList> {
        load_suffix_file(&self.path, self.include_private)
    }
}

/// Nil SuffixLoader - always unavailable
pub struct NilSuffixLoader;

impl SuffixLoader for NilSuffixLoader {
    fn load(&self) -> Result<PublicSuffixList> {
        Err(GateError::SuffixList(
            "public suffix list not available".to_string(),
        ))
    }
}

/// In-memory SuffixLoader for testing
pub struct MemorySuffixLoader {
    text: String,
    include_private: bool,
}

impl MemorySuffixLoader {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            include_private: false,
        }
    }

    pub fn with_private_domains(mut self, include: bool) -> Self {
        self.include_private = include;
        self
    }
}

impl SuffixLoader for MemorySuffixLoader {
    fn load(&self) -> Result<PublicSuffixList> {
        Ok(PublicSuffixList::parse(&self.text, self.include_private))
    }
}

// Helper functions

/// Load and parse a suffix list file, rejecting files without any rule
pub(crate) fn load_suffix_file(path: &Path, include_private: bool) -> Result<PublicSuffixList> {
    let text = fs::read_to_string(path).map_err(|e| {
        GateError::SuffixList(format!("Failed to read '{}': {}", path.display(), e))
    })?;
    let list = PublicSuffixList::parse(&text, include_private);
    if list.is_empty() {
        return Err(GateError::SuffixList(format!(
            "'{}' contains no suffix rules",
            path.display()
        )));
    }
    Ok(list)
}

/// Verify a downloaded suffix list before it replaces the cached copy
pub(crate) fn verify_suffix_file(path: &Path) -> Result<()> {
    load_suffix_file(path, true).map(|_| ())
}
