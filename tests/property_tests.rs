//! Property tests for the pruner, the sorter and the reconciler

use std::collections::HashSet;

use proptest::prelude::*;

use dnsgate::{
    normalize_token, order, prune, reconcile, ConfigErrorKind, Domain, DomainSet, GateError, Mode,
    PublicSuffixList, ReconcileInput, ReconcileOptions, WarningSink,
};

const SUFFIXES: &str = "com\nnet\nuk\nco.uk\n";

/// Few distinct labels so that generated names often share ancestors
fn domain() -> impl Strategy<Value = Domain> {
    prop::collection::vec(
        prop::sample::select(vec!["a", "b", "ads", "example", "co", "uk", "com", "net"]),
        1..5,
    )
    .prop_map(|labels| normalize_token(&labels.join(".")).unwrap())
}

fn domain_set() -> impl Strategy<Value = DomainSet> {
    prop::collection::hash_set(domain(), 0..24)
}

proptest! {
    #[test]
    fn prune_is_idempotent(set in domain_set()) {
        let once = prune(&set);
        prop_assert_eq!(prune(&once), once);
    }

    #[test]
    fn pruned_set_has_no_covered_domain(set in domain_set()) {
        let pruned = prune(&set);
        for d1 in &pruned {
            for d2 in &pruned {
                prop_assert!(!d2.is_ancestor_of(d1), "{} covers {}", d2, d1);
            }
        }
        prop_assert!(pruned.is_subset(&set));
    }

    #[test]
    fn pruning_keeps_coverage(set in domain_set()) {
        // every input name is still blocked by itself or an ancestor
        let pruned = prune(&set);
        for d in &set {
            prop_assert!(
                pruned.contains(d) || d.ancestors().any(|a| pruned.contains(a)),
                "{} lost its rule", d
            );
        }
    }

    #[test]
    fn order_is_a_sorted_permutation(set in domain_set()) {
        let ordered = order(&set);
        prop_assert_eq!(ordered.len(), set.len());
        let unique: HashSet<&Domain> = ordered.iter().collect();
        prop_assert_eq!(unique.len(), set.len());
        prop_assert!(ordered.iter().all(|d| set.contains(d)));

        for pair in ordered.windows(2) {
            prop_assert!(pair[0].reversed_labels().le(pair[1].reversed_labels()));
        }
    }

    #[test]
    fn whitelist_wins_without_override(blacklist in domain_set(), whitelist in domain_set()) {
        let input = ReconcileInput { blacklist, whitelist, local_blacklist: DomainSet::new() };
        let out = reconcile(&input, &ReconcileOptions::default(), None, &WarningSink::new()).unwrap();
        for w in &input.whitelist {
            prop_assert!(!out.domains.contains(w));
        }
    }

    #[test]
    fn local_blacklist_always_wins(
        blacklist in domain_set(),
        whitelist in domain_set(),
        local_blacklist in domain_set(),
        root_reduction in any::<bool>(),
    ) {
        let suffixes = PublicSuffixList::parse(SUFFIXES, false);
        let input = ReconcileInput { blacklist, whitelist, local_blacklist };
        let options = ReconcileOptions { mode: Mode::Dnsmasq, root_reduction };
        let out = reconcile(&input, &options, Some(&suffixes), &WarningSink::new()).unwrap();
        for d in &input.local_blacklist {
            prop_assert!(out.domains.contains(d));
        }
    }

    #[test]
    fn hosts_mode_rejects_root_reduction(
        blacklist in domain_set(),
        whitelist in domain_set(),
        local_blacklist in domain_set(),
    ) {
        let suffixes = PublicSuffixList::parse(SUFFIXES, false);
        let input = ReconcileInput { blacklist, whitelist, local_blacklist };
        let options = ReconcileOptions { mode: Mode::Hosts, root_reduction: true };
        match reconcile(&input, &options, Some(&suffixes), &WarningSink::new()) {
            Err(GateError::Config { kind, .. }) => {
                prop_assert_eq!(kind, ConfigErrorKind::InvalidCombination)
            }
            other => prop_assert!(false, "expected InvalidCombination, got {:?}", other.map(|r| r.domains.len())),
        }
    }

    #[test]
    fn normalize_is_stable(d in domain()) {
        prop_assert_eq!(normalize_token(d.as_str()).unwrap(), d);
    }
}
