use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::{GateError, Result};
use crate::source::http;

use super::list::PublicSuffixList;
use super::loader::{
    load_suffix_file, verify_suffix_file, SuffixLoader, DEFAULT_SUFFIX_LIST_FILENAME,
    DEFAULT_SUFFIX_LIST_URL, DEFAULT_UPDATE_INTERVAL,
};

/// Auto SuffixLoader with download support.
///
/// Keeps a cached copy of the list and refreshes it once it is older than
/// `update_interval`. A failed refresh falls back to the stale copy.
pub struct AutoSuffixLoader {
    pub path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub url: String,
    pub update_interval: Duration,
    pub include_private: bool,

    download_lock: Mutex<()>,
}

impl AutoSuffixLoader {
    /// Create a new AutoSuffixLoader
    pub fn new() -> Self {
        Self {
            path: None,
            data_dir: None,
            url: DEFAULT_SUFFIX_LIST_URL.to_string(),
            update_interval: DEFAULT_UPDATE_INTERVAL,
            include_private: false,
            download_lock: Mutex::new(()),
        }
    }

    /// Set data directory
    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Set explicit cache file path (overrides data directory)
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set custom download URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set update interval for checking file freshness
    /// Default is 7 days (DEFAULT_UPDATE_INTERVAL)
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    /// Also honour rules from the PRIVATE section
    pub fn with_private_domains(mut self, include: bool) -> Self {
        self.include_private = include;
        self
    }

    /// Get cache file path
    pub fn cache_path(&self) -> PathBuf {
        if let Some(ref path) = self.path {
            return path.clone();
        }

        match self.data_dir {
            Some(ref dir) => dir.join(DEFAULT_SUFFIX_LIST_FILENAME),
            None => PathBuf::from(DEFAULT_SUFFIX_LIST_FILENAME),
        }
    }

    /// Check if file needs download
    fn should_download(&self, path: &Path) -> bool {
        match fs::metadata(path) {
            Ok(meta) => {
                if meta.len() == 0 {
                    return true;
                }
                match meta.modified() {
                    Ok(mtime) => SystemTime::now()
                        .duration_since(mtime)
                        .map(|d| d > self.update_interval)
                        .unwrap_or(true),
                    Err(_) => true,
                }
            }
            Err(_) => true,
        }
    }

    /// Download file from URL
    fn download(&self, path: &Path) -> Result<()> {
        let _lock = self.download_lock.lock();

        // Double-check after acquiring lock
        if !self.should_download(path) {
            return Ok(());
        }

        info!("Downloading {} from {}", path.display(), self.url);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let bytes = http::get_bytes(&self.url, http::DEFAULT_TIMEOUT)
            .map_err(|e| GateError::SuffixList(format!("Download failed: {}", e)))?;

        // Download to temporary file
        let tmp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(&bytes)?;
        file.flush()?;
        drop(file);

        if let Err(e) = verify_suffix_file(&tmp_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(GateError::SuffixList(format!("Verification failed: {}", e)));
        }

        fs::rename(&tmp_path, path)?;

        info!("Downloaded {} successfully", path.display());
        Ok(())
    }

    /// Ensure the suffix list is downloaded and available
    fn ensure_downloaded(&self) -> Result<PathBuf> {
        let path = self.cache_path();
        debug!("Checking suffix list file: {}", path.display());

        if self.should_download(&path) {
            if let Err(e) = self.download(&path) {
                if !path.exists() {
                    return Err(e);
                }
                warn!("Download failed, using existing file: {}", e);
            }
        }

        Ok(path)
    }
}

impl Default for AutoSuffixLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SuffixLoader for AutoSuffixLoader {
    fn load(&self) -> Result<PublicSuffixList> {
        let path = self.ensure_downloaded()?;
        load_suffix_file(&path, self.include_private)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_loader_builder_pattern() {
        let loader = AutoSuffixLoader::new()
            .with_data_dir("/tmp/test")
            .with_url("http://example.com/psl.dat")
            .with_update_interval(Duration::from_secs(3600))
            .with_private_domains(true);

        assert_eq!(loader.url, "http://example.com/psl.dat");
        assert_eq!(loader.update_interval, Duration::from_secs(3600));
        assert!(loader.include_private);
        assert_eq!(
            loader.cache_path(),
            PathBuf::from("/tmp/test").join(DEFAULT_SUFFIX_LIST_FILENAME)
        );
    }

    #[test]
    fn test_auto_loader_uses_fresh_cache_without_network() {
        let dir = std::env::temp_dir().join("dnsgate_test_psl_auto_fresh");
        let _ = fs::create_dir_all(&dir);
        let path = dir.join(DEFAULT_SUFFIX_LIST_FILENAME);
        fs::write(&path, "com\nco.uk\n").unwrap();

        // Unroutable URL: any download attempt would fail
        let loader = AutoSuffixLoader::new()
            .with_data_dir(&dir)
            .with_url("http://127.0.0.1:9/public_suffix_list.dat");

        let list = loader.load().unwrap();
        assert_eq!(list.len(), 2);

        let _ = fs::remove_file(&path);
        let _ = fs::remove_dir(&dir);
    }

    #[test]
    fn test_auto_loader_stale_cache_fallback() {
        let dir = std::env::temp_dir().join("dnsgate_test_psl_auto_stale");
        let _ = fs::create_dir_all(&dir);
        let path = dir.join(DEFAULT_SUFFIX_LIST_FILENAME);
        fs::write(&path, "com\n").unwrap();

        // Zero interval: the copy is always considered stale
        let loader = AutoSuffixLoader::new()
            .with_path(&path)
            .with_url("http://127.0.0.1:9/public_suffix_list.dat")
            .with_update_interval(Duration::ZERO);

        let list = loader.load().unwrap();
        assert_eq!(list.len(), 1);

        let _ = fs::remove_file(&path);
        let _ = fs::remove_dir(&dir);
    }

    #[test]
    fn test_auto_loader_no_cache_no_network() {
        let dir = std::env::temp_dir().join("dnsgate_test_psl_auto_missing");
        let _ = fs::remove_dir_all(&dir);

        let loader = AutoSuffixLoader::new()
            .with_data_dir(&dir)
            .with_url("http://127.0.0.1:9/public_suffix_list.dat");

        assert!(loader.load().is_err());

        let _ = fs::remove_dir_all(&dir);
    }
}
