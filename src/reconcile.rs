//! Blacklist/whitelist reconciliation.
//!
//! Precedence, lowest to highest: remote blacklists, the local whitelist,
//! the local blacklist. With root reduction enabled every remote entry is
//! first collapsed to its registrable root, then the whitelist punches holes
//! back into it.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::diagnostics::{Warning, WarningSink};
use crate::error::{ConfigErrorKind, GateError, Result};
use crate::psl::PublicSuffixList;
use crate::types::{Domain, DomainSet, Mode};

/// Already-normalized inputs of one reconciliation
#[derive(Debug, Clone, Default)]
pub struct ReconcileInput {
    /// Domains from the remote sources, before any reduction
    pub blacklist: DomainSet,
    /// Local whitelist
    pub whitelist: DomainSet,
    /// Local blacklist, always wins over the whitelist
    pub local_blacklist: DomainSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub mode: Mode,
    /// Block whole registrable domains instead of individual hosts
    pub root_reduction: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Dnsmasq,
            root_reduction: false,
        }
    }
}

/// Result of [`reconcile`]
#[derive(Debug, Clone, Default)]
pub struct Reconciled {
    pub domains: DomainSet,
    /// Whitelisted domains that stay blocked because the local blacklist wins.
    /// Sorted.
    pub conflicts: Vec<Domain>,
}

/// Reject option combinations that can never produce a correct rule set.
pub fn check_options(options: &ReconcileOptions) -> Result<()> {
    if options.root_reduction && options.mode == Mode::Hosts {
        return Err(GateError::config(
            ConfigErrorKind::InvalidCombination,
            "block_at_psl is not possible in hosts mode",
        ));
    }
    Ok(())
}

/// Merge the blacklist, whitelist and local blacklist into the final set.
///
/// `suffixes` is required when root reduction is enabled. When present it is
/// also used to match whitelist entries against the result by root when
/// looking for precedence conflicts.
pub fn reconcile(
    input: &ReconcileInput,
    options: &ReconcileOptions,
    suffixes: Option<&PublicSuffixList>,
    sink: &WarningSink,
) -> Result<Reconciled> {
    check_options(options)?;

    let mut combined = if options.root_reduction {
        let suffixes = suffixes.ok_or_else(|| {
            GateError::config(
                ConfigErrorKind::Missing,
                "block_at_psl requires a public suffix list",
            )
        })?;
        reduce_to_roots(input, suffixes)
    } else {
        input.blacklist.clone()
    };

    // whitelist goes before the local blacklist
    combined.retain(|d| !input.whitelist.contains(d));
    info!(
        "{} blacklisted domains after subtracting the {} whitelisted domains",
        combined.len(),
        input.whitelist.len()
    );

    if !input.local_blacklist.is_empty() {
        info!(
            "Re-adding {} domains from the local blacklist to override the whitelist",
            input.local_blacklist.len()
        );
        combined.extend(input.local_blacklist.iter().cloned());
    }

    let conflicts = find_conflicts(&combined, &input.whitelist, suffixes);
    for domain in &conflicts {
        sink.push(Warning::PrecedenceConflict {
            domain: domain.clone(),
        });
    }

    Ok(Reconciled {
        domains: combined,
        conflicts,
    })
}

/// Collapse the blacklist to registrable roots, honour the whitelist, then
/// restore hosts whose root did not end up blocked.
fn reduce_to_roots(input: &ReconcileInput, suffixes: &PublicSuffixList) -> DomainSet {
    let whitelist = &input.whitelist;

    let mut reduced: DomainSet = input
        .blacklist
        .iter()
        .map(|d| suffixes.public_root(d))
        .collect();
    info!(
        "{} blacklisted domains left after stripping to public roots",
        reduced.len()
    );

    if !whitelist.is_empty() {
        reduced.retain(|d| !whitelist.contains(d));
        // A whitelisted host must also defeat the block on its root
        for w in whitelist {
            reduced.remove(&suffixes.public_root(w));
        }
    }

    // Decide against a snapshot so additions cannot shadow later candidates
    let snapshot = reduced.clone();
    for d in &input.blacklist {
        if whitelist.contains(d) || snapshot.contains(d) {
            continue;
        }
        let root = suffixes.public_root(d);
        if snapshot.contains(&root) || whitelist.contains(&root) {
            continue;
        }
        debug!("Re-adding: {}", d);
        reduced.insert(d.clone());
    }
    info!(
        "{} blacklisted domains after re-adding hosts whose root is not blocked",
        reduced.len()
    );

    reduced
}

fn find_conflicts(
    domains: &DomainSet,
    whitelist: &DomainSet,
    suffixes: Option<&PublicSuffixList>,
) -> Vec<Domain> {
    let conflicts: BTreeSet<Domain> = whitelist
        .iter()
        .filter(|w| match suffixes {
            Some(list) => domains.contains(&list.public_root(w)),
            None => domains.contains(*w),
        })
        .cloned()
        .collect();
    conflicts.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_token;

    const SUFFIXES: &str = "com\nnet\nuk\nco.uk\n";

    fn set(items: &[&str]) -> DomainSet {
        items.iter().map(|s| normalize_token(s).unwrap()).collect()
    }

    fn suffixes() -> PublicSuffixList {
        PublicSuffixList::parse(SUFFIXES, false)
    }

    fn reduce_opts() -> ReconcileOptions {
        ReconcileOptions {
            mode: Mode::Dnsmasq,
            root_reduction: true,
        }
    }

    #[test]
    fn test_plain_subtract_and_override() {
        let input = ReconcileInput {
            blacklist: set(&["ads.example.com", "tracker.example.com", "lwn.net"]),
            whitelist: set(&["lwn.net", "tracker.example.com"]),
            local_blacklist: set(&["tracker.example.com", "biz"]),
        };
        let sink = WarningSink::new();

        let out = reconcile(&input, &ReconcileOptions::default(), None, &sink).unwrap();

        assert_eq!(out.domains, set(&["ads.example.com", "tracker.example.com", "biz"]));
        assert_eq!(out.conflicts, vec![normalize_token("tracker.example.com").unwrap()]);
        assert_eq!(sink.conflicts(), out.conflicts);
    }

    #[test]
    fn test_conflicts_match_by_root_without_reduction() {
        let input = ReconcileInput {
            blacklist: set(&["ads.example.com"]),
            whitelist: set(&["www.example.com"]),
            local_blacklist: set(&["example.com"]),
        };
        let sink = WarningSink::new();

        let out = reconcile(&input, &ReconcileOptions::default(), Some(&suffixes()), &sink).unwrap();

        assert_eq!(out.domains, set(&["ads.example.com", "example.com"]));
        assert_eq!(out.conflicts, vec![normalize_token("www.example.com").unwrap()]);

        // exact matching misses it
        let exact = reconcile(&input, &ReconcileOptions::default(), None, &WarningSink::new()).unwrap();
        assert!(exact.conflicts.is_empty());
    }

    #[test]
    fn test_hosts_mode_rejects_root_reduction() {
        let input = ReconcileInput::default();
        let options = ReconcileOptions {
            mode: Mode::Hosts,
            root_reduction: true,
        };
        let list = suffixes();

        for psl in [None, Some(&list)] {
            match reconcile(&input, &options, psl, &WarningSink::new()) {
                Err(GateError::Config { kind, .. }) => {
                    assert_eq!(kind, ConfigErrorKind::InvalidCombination)
                }
                other => panic!("expected InvalidCombination, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_root_reduction_requires_suffix_list() {
        let input = ReconcileInput {
            blacklist: set(&["ads.example.com"]),
            ..Default::default()
        };
        match reconcile(&input, &reduce_opts(), None, &WarningSink::new()) {
            Err(GateError::Config { kind, .. }) => assert_eq!(kind, ConfigErrorKind::Missing),
            other => panic!("expected Missing, got {:?}", other),
        }
    }

    #[test]
    fn test_root_reduction_collapses_hosts() {
        let input = ReconcileInput {
            blacklist: set(&["a.ads.example.com", "b.example.com", "x.tracker.co.uk"]),
            ..Default::default()
        };
        let out = reconcile(&input, &reduce_opts(), Some(&suffixes()), &WarningSink::new()).unwrap();
        assert_eq!(out.domains, set(&["example.com", "tracker.co.uk"]));
    }

    #[test]
    fn test_whitelisted_root_blocks_readdition() {
        let input = ReconcileInput {
            blacklist: set(&["ads.example.com"]),
            whitelist: set(&["example.com"]),
            ..Default::default()
        };
        let sink = WarningSink::new();
        let out = reconcile(&input, &reduce_opts(), Some(&suffixes()), &sink).unwrap();

        assert!(out.domains.is_empty());
        assert!(out.conflicts.is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_whitelisted_host_restores_siblings() {
        // s3.amazonaws.com is whitelisted: the root block is lifted and the
        // other hosts come back at full specificity
        let input = ReconcileInput {
            blacklist: set(&["evil.s3.amazonaws.com", "ads.amazonaws.com", "s3.amazonaws.com"]),
            whitelist: set(&["s3.amazonaws.com"]),
            ..Default::default()
        };
        let out = reconcile(&input, &reduce_opts(), Some(&suffixes()), &WarningSink::new()).unwrap();

        assert_eq!(out.domains, set(&["evil.s3.amazonaws.com", "ads.amazonaws.com"]));
    }

    #[test]
    fn test_local_blacklist_overrides_whitelisted_root() {
        let input = ReconcileInput {
            blacklist: set(&["ads.example.com"]),
            whitelist: set(&["www.example.com"]),
            local_blacklist: set(&["example.com"]),
        };
        let sink = WarningSink::new();
        let out = reconcile(&input, &reduce_opts(), Some(&suffixes()), &sink).unwrap();

        assert_eq!(out.domains, set(&["ads.example.com", "example.com"]));
        assert_eq!(out.conflicts, vec![normalize_token("www.example.com").unwrap()]);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_suffix_itself_is_kept() {
        let input = ReconcileInput {
            blacklist: set(&["co.uk"]),
            ..Default::default()
        };
        let out = reconcile(&input, &reduce_opts(), Some(&suffixes()), &WarningSink::new()).unwrap();
        assert_eq!(out.domains, set(&["co.uk"]));
    }
}
