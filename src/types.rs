use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Output format of the generated blacklist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// dnsmasq include file (`server=/.example.com/`)
    Dnsmasq,
    /// /etc/hosts format (`127.0.0.1 example.com`)
    Hosts,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Dnsmasq => "dnsmasq",
            Mode::Hosts => "hosts",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized DNS name.
///
/// Always ASCII (IDNA encoded), lowercase, without leading/trailing dots
/// and without empty labels. Construct through [`crate::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Domain(String);

impl Domain {
    /// Wrap an already-normalized name. Callers guarantee the invariants.
    pub(crate) fn from_normalized(name: String) -> Self {
        debug_assert!(!name.is_empty());
        debug_assert!(!name.starts_with('.') && !name.ends_with('.'));
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Labels TLD first: `a.example.com` -> `com`, `example`, `a`
    pub fn reversed_labels(&self) -> impl Iterator<Item = &str> {
        self.0.rsplit('.')
    }

    /// Every proper ancestor, nearest first.
    /// `a.b.example.com` -> `b.example.com`, `example.com`, `com`
    pub fn ancestors(&self) -> impl Iterator<Item = &str> {
        self.0.match_indices('.').map(move |(pos, _)| &self.0[pos + 1..])
    }

    /// True if `self` is a strict ancestor of `other` (`example.com` of `a.example.com`).
    pub fn is_ancestor_of(&self, other: &Domain) -> bool {
        other.0.len() > self.0.len()
            && other.0.ends_with(self.0.as_str())
            && other.0.as_bytes()[other.0.len() - self.0.len() - 1] == b'.'
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for Domain {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Unordered set of unique domains
pub type DomainSet = HashSet<Domain>;

/// Where a domain set came from. Only used for precedence and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Remote hosts-format list
    Remote(String),
    /// Local blacklist file (overrides the whitelist)
    LocalBlacklist(PathBuf),
    /// Local whitelist file
    LocalWhitelist(PathBuf),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Remote(url) => write!(f, "{}", url),
            Source::LocalBlacklist(path) => write!(f, "blacklist {}", path.display()),
            Source::LocalWhitelist(path) => write!(f, "whitelist {}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Domain {
        Domain::from_normalized(s.to_string())
    }

    #[test]
    fn test_ancestors() {
        let domain = d("a.b.example.com");
        let ancestors: Vec<&str> = domain.ancestors().collect();
        assert_eq!(ancestors, vec!["b.example.com", "example.com", "com"]);

        assert_eq!(d("com").ancestors().count(), 0);
    }

    #[test]
    fn test_reversed_labels() {
        let domain = d("tracker.example.com");
        let rev: Vec<&str> = domain.reversed_labels().collect();
        assert_eq!(rev, vec!["com", "example", "tracker"]);
    }

    #[test]
    fn test_is_ancestor_of() {
        assert!(d("example.com").is_ancestor_of(&d("a.example.com")));
        assert!(d("com").is_ancestor_of(&d("a.example.com")));
        assert!(!d("example.com").is_ancestor_of(&d("example.com")));
        assert!(!d("ample.com").is_ancestor_of(&d("example.com")));
        assert!(!d("a.example.com").is_ancestor_of(&d("example.com")));
    }

    #[test]
    fn test_set_lookup_by_str() {
        let mut set = DomainSet::new();
        set.insert(d("example.com"));
        assert!(set.contains("example.com"));
        assert!(!set.contains("www.example.com"));
    }

    #[test]
    fn test_mode_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Dnsmasq).unwrap(), "\"dnsmasq\"");
        let mode: Mode = serde_json::from_str("\"hosts\"").unwrap();
        assert_eq!(mode, Mode::Hosts);
    }
}
