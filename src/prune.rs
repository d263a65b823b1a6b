use tracing::debug;

use crate::types::DomainSet;

/// Remove every domain already covered by one of its ancestors.
///
/// `a.b.example.com` goes when `b.example.com`, `example.com` or `com` is in
/// the set. Decisions are made against `domains` as given, so the result does
/// not depend on iteration order.
pub fn prune(domains: &DomainSet) -> DomainSet {
    let pruned: DomainSet = domains
        .iter()
        .filter(|d| !d.ancestors().any(|ancestor| domains.contains(ancestor)))
        .cloned()
        .collect();

    debug!(
        "{} redundant rules removed, {} left",
        domains.len() - pruned.len(),
        pruned.len()
    );
    pruned
}
