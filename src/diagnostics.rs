//! Run-scoped warning sink.
//!
//! Recoverable problems (bad entries, unreachable sources, blacklist/whitelist
//! conflicts) never abort a run. Components push them here instead, and the
//! caller decides how to report them once the run is done.

use std::fmt;

use parking_lot::Mutex;
use tracing::warn;

use crate::types::{Domain, Source};

/// A non-fatal event raised during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// An entry was skipped because it is not a valid domain
    Validation {
        source: Source,
        entry: String,
        reason: String,
    },
    /// A source contributed no domains because it could not be read
    SourceUnavailable { source: Source, reason: String },
    /// A domain is both blacklisted and whitelisted; the local blacklist wins
    PrecedenceConflict { domain: Domain },
    /// Root reduction is on but the whitelist is empty
    EmptyWhitelist,
    /// No remote source produced any domain
    NoRemoteDomains,
    /// The suffix list could not be loaded; conflicts are matched exactly
    SuffixListUnavailable { reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Validation {
                source,
                entry,
                reason,
            } => write!(f, "{}: '{}' is not a valid domain ({}), skipping", source, entry, reason),
            Warning::SourceUnavailable { source, reason } => {
                write!(f, "failed to read {}, skipping: {}", source, reason)
            }
            Warning::PrecedenceConflict { domain } => write!(
                f,
                "{} is listed in both the blacklist and the whitelist, the local blacklist takes precedence",
                domain
            ),
            Warning::EmptyWhitelist => f.write_str(
                "block_at_psl is enabled and the whitelist is empty; \
                 whitelist any domain that is blocked by accident",
            ),
            Warning::NoRemoteDomains => f.write_str(
                "0 domains were retrieved from remote sources, only the local blacklist will be used",
            ),
            Warning::SuffixListUnavailable { reason } => write!(
                f,
                "public suffix list not loaded ({}), whitelist conflicts are matched by exact name",
                reason
            ),
        }
    }
}

/// Collects warnings for one run
#[derive(Debug, Default)]
pub struct WarningSink {
    warnings: Mutex<Vec<Warning>>,
}

impl WarningSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and emit it as a tracing event
    pub fn push(&self, warning: Warning) {
        warn!("{}", warning);
        self.warnings.lock().push(warning);
    }

    pub fn len(&self) -> usize {
        self.warnings.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.lock().is_empty()
    }

    /// Copy of everything recorded so far
    pub fn snapshot(&self) -> Vec<Warning> {
        self.warnings.lock().clone()
    }

    /// Take all recorded warnings, leaving the sink empty
    pub fn drain(&self) -> Vec<Warning> {
        std::mem::take(&mut *self.warnings.lock())
    }

    /// Domains reported as blacklist/whitelist conflicts
    pub fn conflicts(&self) -> Vec<Domain> {
        self.warnings
            .lock()
            .iter()
            .filter_map(|w| match w {
                Warning::PrecedenceConflict { domain } => Some(domain.clone()),
                _ => None,
            })
            .collect()
    }
}
