use crate::types::{Domain, DomainSet};

/// Sort domains so that everything under one suffix is contiguous.
///
/// The key is the label sequence read right to left, compared label by
/// label as bytes. `com` < `example.com` < `ads.example.com` < `b.net`.
pub fn order(domains: &DomainSet) -> Vec<Domain> {
    let mut ordered: Vec<Domain> = domains.iter().cloned().collect();
    ordered.sort_unstable_by(|a, b| a.reversed_labels().cmp(b.reversed_labels()));
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_token;

    fn ordered(items: &[&str]) -> Vec<String> {
        let set: DomainSet = items.iter().map(|s| normalize_token(s).unwrap()).collect();
        order(&set).iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_order_siblings() {
        assert_eq!(
            ordered(&["tracker.example.com", "ads.example.com"]),
            vec!["ads.example.com", "tracker.example.com"]
        );
    }

    #[test]
    fn test_order_groups_by_tld() {
        assert_eq!(
            ordered(&["b.net", "z.example.com", "a.org", "com", "a.b.example.com", "example.com"]),
            vec!["com", "example.com", "a.b.example.com", "z.example.com", "b.net", "a.org"]
        );
    }

    #[test]
    fn test_order_is_label_wise_not_string_wise() {
        // As plain strings "a-b.com" < "a.com"; label-wise "a" < "a-b"
        assert_eq!(
            ordered(&["x.a-b.com", "x.a.com"]),
            vec!["x.a.com", "x.a-b.com"]
        );
    }
}
