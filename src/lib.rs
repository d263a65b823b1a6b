//! dnsgate - merge DNS blacklists into one minimal rule set
//!
//! This library turns several hosts-format blacklists plus a local
//! blacklist/whitelist pair into one deduplicated, redundancy-free list of
//! domains, rendered for dnsmasq or /etc/hosts:
//! - Normalization of hosts-format and plain domain lines (IDNA encoded)
//! - Optional collapse of hosts to their registrable root (Public Suffix List)
//! - Whitelist subtraction, with the local blacklist always winning
//! - Removal of rules already covered by an ancestor domain
//! - Output grouped by TLD
//!
//! # Example
//!
//! ```rust
//! use dnsgate::{normalize_token, order, prune, reconcile, DomainSet};
//! use dnsgate::{ReconcileInput, ReconcileOptions, WarningSink};
//!
//! let set = |items: &[&str]| -> DomainSet {
//!     items.iter().map(|s| normalize_token(s).unwrap()).collect()
//! };
//!
//! let input = ReconcileInput {
//!     blacklist: set(&["ads.example.com", "a.b.example.com", "example.com", "lwn.net"]),
//!     whitelist: set(&["lwn.net"]),
//!     local_blacklist: set(&["tracker.example.org"]),
//! };
//!
//! let sink = WarningSink::new();
//! let reconciled = reconcile(&input, &ReconcileOptions::default(), None, &sink).unwrap();
//! let rules = order(&prune(&reconciled.domains));
//!
//! let rules: Vec<String> = rules.iter().map(|d| d.to_string()).collect();
//! assert_eq!(rules, vec!["example.com", "tracker.example.org"]);
//! ```
//!
//! # Input formats
//!
//! | Format | Example | Notes |
//! |--------|---------|-------|
//! | hosts | `0.0.0.0 ads.example.com # ad server` | second field is the domain |
//! | dnsgate | `example.com` | one domain per line, blocks all subdomains |
//!
//! `#` starts a comment in both formats. Invalid entries are skipped and
//! reported through the [`WarningSink`].

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod normalize;
pub mod order;
pub mod pipeline;
pub mod prune;
pub mod psl;
pub mod reconcile;
pub mod render;
pub mod source;
pub mod types;

// Re-export commonly used items
pub use config::{Config, GenerateOptions, Paths, DEFAULT_CONFIG_DIR, DEFAULT_REMOTE_BLACKLISTS};
pub use diagnostics::{Warning, WarningSink};
pub use error::{ConfigErrorKind, GateError, Result, SourceErrorKind};
pub use normalize::{normalize_line, normalize_token, parse_domains};
pub use order::order;
pub use pipeline::{build_rule_set, generate, RuleSet};
pub use prune::prune;
pub use psl::{
    AutoSuffixLoader, FileSuffixLoader, MemorySuffixLoader, NilSuffixLoader, PublicSuffixList,
    SuffixLoader,
};
pub use reconcile::{reconcile, ReconcileInput, ReconcileOptions, Reconciled};
pub use render::{render, render_header, render_line, write_output, HeaderInfo};
pub use source::{CachedFetcher, MemoryFetcher, SourceFetcher};
pub use types::{Domain, DomainSet, Mode, Source};
