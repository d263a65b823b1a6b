//! Blacklist sources.
//!
//! Remote lists come in through a [`SourceFetcher`]; local lists are plain
//! files handled by [`local`]. Neither ever fails a run: an unreadable source
//! contributes no domains and leaves a warning behind.

pub mod cache;
pub mod http;
pub mod local;

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::diagnostics::{Warning, WarningSink};
use crate::error::{GateError, Result, SourceErrorKind};
use crate::normalize::parse_domains;
use crate::types::{DomainSet, Source};

pub use cache::{CachedFetcher, DEFAULT_CACHE_EXPIRE};
pub use local::{append_domain, ensure_list_file, read_list_bytes, read_local_list};

/// Accepted remote source identifiers
static SOURCE_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[^\s/?#]+[^\s]*$")
        .expect("SOURCE_URL_PATTERN: hardcoded regex is invalid")
});

/// True if `url` is an http(s) URL usable as a remote source
pub fn is_http_url(url: &str) -> bool {
    SOURCE_URL_PATTERN.is_match(url)
}

/// Trait for fetching remote hosts-format lists
pub trait SourceFetcher: Send + Sync {
    /// Fetch the raw bytes behind `url`
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// In-memory SourceFetcher for testing
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    lists: HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.lists.insert(url.into(), bytes.into());
    }

    pub fn with(mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.add(url, bytes);
        self
    }
}

impl SourceFetcher for MemoryFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.lists
            .get(url)
            .cloned()
            .ok_or_else(|| GateError::source(SourceErrorKind::Network, url, "404 Not Found"))
    }
}

/// Fetch and normalize every remote source, unioning the results.
///
/// Failed sources are reported to `sink` and skipped.
pub fn fetch_remote_domains(
    fetcher: &dyn SourceFetcher,
    urls: &[String],
    sink: &WarningSink,
) -> DomainSet {
    let mut combined = DomainSet::new();

    for url in urls {
        let source = Source::Remote(url.clone());
        match fetcher.fetch(url) {
            Ok(bytes) => {
                let domains = parse_domains(&bytes, &source, sink);
                combined.extend(domains);
                debug!("{} domains combined so far", combined.len());
            }
            Err(e) => {
                sink.push(Warning::SourceUnavailable {
                    source,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!("{} domains from remote blacklist(s)", combined.len());
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_url_pattern_regex_compiles() {
        assert!(SOURCE_URL_PATTERN.is_match("http://example.com"));
    }

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("http://winhelp2002.mvps.org/hosts.txt"));
        assert!(is_http_url(
            "http://pgl.yoyo.org/adservers/serverlist.php?hostformat=hosts;showintro=0"
        ));
        assert!(is_http_url("https://adaway.org/hosts.txt"));
        assert!(!is_http_url("ftp://example.com/hosts"));
        assert!(!is_http_url("/etc/hosts"));
        assert!(!is_http_url("http://"));
        assert!(!is_http_url("http://exa mple.com/hosts"));
    }

    #[test]
    fn test_fetch_remote_domains_skips_failed_source() {
        let fetcher = MemoryFetcher::new()
            .with("http://a.example/hosts", "0.0.0.0 ads.example.com\n0.0.0.0 x.example.net\n")
            .with("http://b.example/hosts", "0.0.0.0 ads.example.com\n");
        let urls = vec![
            "http://a.example/hosts".to_string(),
            "http://missing.example/hosts".to_string(),
            "http://b.example/hosts".to_string(),
        ];
        let sink = WarningSink::new();

        let domains = fetch_remote_domains(&fetcher, &urls, &sink);

        assert_eq!(domains.len(), 2);
        let warnings = sink.snapshot();
        assert_eq!(warnings.len(), 1);
        match &warnings[0] {
            Warning::SourceUnavailable { source, .. } => {
                assert_eq!(source, &Source::Remote("http://missing.example/hosts".into()));
            }
            other => panic!("expected SourceUnavailable, got {:?}", other),
        }
    }
}
