use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::{GateError, Result, SourceErrorKind};

use super::http;
use super::local::append_unique_line;
use super::{is_http_url, SourceFetcher};

/// Default cache expiry for remote lists: 48 hours
pub const DEFAULT_CACHE_EXPIRE: Duration = Duration::from_secs(2 * 24 * 60 * 60);

/// Name of the `<cache file> <url>` index kept next to the cached lists
pub const CACHE_INDEX_FILENAME: &str = "sha256_index";

/// HTTP fetcher backed by an on-disk cache with expiry.
///
/// Each URL is cached as `sha256(url)_hosts`. A copy older than `expire`
/// is renamed to `*.expired` and fetched again.
pub struct CachedFetcher {
    pub cache_dir: PathBuf,
    pub expire: Duration,
    pub no_cache: bool,
    pub timeout: Duration,

    write_lock: Mutex<()>,
}

impl CachedFetcher {
    /// Create a new CachedFetcher
    pub fn new(cache_dir: impl AsRef<Path>) -> Self {
        Self {
            cache_dir: cache_dir.as_ref().to_path_buf(),
            expire: DEFAULT_CACHE_EXPIRE,
            no_cache: false,
            timeout: http::DEFAULT_TIMEOUT,
            write_lock: Mutex::new(()),
        }
    }

    /// Set how long a cached copy stays fresh
    pub fn with_expire(mut self, expire: Duration) -> Self {
        self.expire = expire;
        self
    }

    /// Do not write fetched lists to the cache
    pub fn with_no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Cache file for `url`
    pub fn cache_file(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        self.cache_dir.join(format!("{}_hosts", hex::encode(digest)))
    }

    /// Return the cached copy if it has not expired yet.
    /// An expired copy is moved aside so the next write starts clean.
    fn fresh_cached_copy(&self, url: &str) -> Option<PathBuf> {
        let path = self.cache_file(url);
        let mtime = fs::metadata(&path).and_then(|m| m.modified()).ok()?;

        let age = SystemTime::now()
            .duration_since(mtime)
            .unwrap_or(Duration::ZERO);
        if age < self.expire {
            return Some(path);
        }

        let mut expired = path.clone().into_os_string();
        expired.push(".expired");
        if let Err(e) = fs::rename(&path, &expired) {
            warn!("failed to expire cache file {}: {}", path.display(), e);
        }
        None
    }

    /// Write `bytes` to the cache and record it in the index
    fn store(&self, url: &str, bytes: &[u8]) -> Result<()> {
        let _lock = self.write_lock.lock();

        fs::create_dir_all(&self.cache_dir).map_err(|e| {
            GateError::source(SourceErrorKind::Cache, url, e.to_string())
        })?;

        let path = self.cache_file(url);
        let tmp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.flush()?;
        drop(file);
        fs::rename(&tmp_path, &path)?;

        let index = self.cache_dir.join(CACHE_INDEX_FILENAME);
        append_unique_line(&index, &format!("{} {}", path.display(), url))?;
        Ok(())
    }
}

impl SourceFetcher for CachedFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if !is_http_url(url) {
            return Err(GateError::source(
                SourceErrorKind::InvalidUrl,
                url,
                "must start with http:// or https://",
            ));
        }

        if let Some(path) = self.fresh_cached_copy(url) {
            info!("Using cached copy: {}", path.display());
            return fs::read(&path)
                .map_err(|e| GateError::source(SourceErrorKind::Cache, url, e.to_string()));
        }

        let bytes = http::get_bytes(url, self.timeout)?;

        if !self.no_cache {
            match self.store(url, &bytes) {
                Ok(()) => debug!("cached {} as {}", url, self.cache_file(url).display()),
                Err(e) => warn!("failed to cache {}: {}", url, e),
            }
        }

        Ok(bytes)
    }
}
