//! Public Suffix List parsing and registrable-root lookup.

use std::collections::HashSet;

use tracing::debug;

use crate::types::Domain;

const BEGIN_PRIVATE: &str = "===BEGIN PRIVATE DOMAINS===";
const END_PRIVATE: &str = "===END PRIVATE DOMAINS===";

/// Parsed public suffix rules.
///
/// All rules are stored IDNA encoded, so lookups work on [`Domain`] values
/// directly.
#[derive(Debug, Clone, Default)]
pub struct PublicSuffixList {
    /// Plain rules: `com`, `co.uk`
    exact: HashSet<String>,
    /// Wildcard rules stored by parent: `*.ck` is stored as `ck`
    wildcard: HashSet<String>,
    /// Exception rules stored without the `!`: `!www.ck` is stored as `www.ck`
    exception: HashSet<String>,
}

impl PublicSuffixList {
    /// Parse the publicsuffix.org list format.
    ///
    /// Rules from the PRIVATE section are skipped unless `include_private`
    /// is set.
    pub fn parse(text: &str, include_private: bool) -> Self {
        let mut list = Self::default();
        let mut in_private = false;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(comment) = line.strip_prefix("//") {
                if comment.contains(BEGIN_PRIVATE) {
                    in_private = true;
                } else if comment.contains(END_PRIVATE) {
                    in_private = false;
                }
                continue;
            }
            if in_private && !include_private {
                continue;
            }

            // Only the first whitespace-delimited token is the rule
            let rule = match line.split_whitespace().next() {
                Some(rule) => rule,
                None => continue,
            };
            list.add_rule(rule);
        }

        debug!(
            "public suffix list: {} rules, {} wildcards, {} exceptions",
            list.exact.len(),
            list.wildcard.len(),
            list.exception.len()
        );
        list
    }

    fn add_rule(&mut self, rule: &str) {
        if let Some(exception) = rule.strip_prefix('!') {
            if let Some(ascii) = encode_rule(exception) {
                self.exception.insert(ascii);
            }
        } else if let Some(parent) = rule.strip_prefix("*.") {
            if let Some(ascii) = encode_rule(parent) {
                self.wildcard.insert(ascii);
            }
        } else if let Some(ascii) = encode_rule(rule) {
            self.exact.insert(ascii);
        }
    }

    /// Total number of rules
    pub fn len(&self) -> usize {
        self.exact.len() + self.wildcard.len() + self.exception.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte offset where the public suffix of `name` starts.
    fn suffix_start(&self, name: &str) -> usize {
        let starts = label_starts(name);

        // Exception rules always prevail; the suffix is the rule minus its
        // leftmost label. `starts` runs longest candidate first.
        for (i, &start) in starts.iter().enumerate() {
            if self.exception.contains(&name[start..]) {
                return starts.get(i + 1).copied().unwrap_or(start);
            }
        }

        // Otherwise the longest matching rule
        for (i, &start) in starts.iter().enumerate() {
            let candidate = &name[start..];
            if self.exact.contains(candidate) {
                return start;
            }
            if let Some(&parent) = starts.get(i + 1) {
                if self.wildcard.contains(&name[parent..]) {
                    return start;
                }
            }
        }

        // Default rule "*": the TLD is the suffix
        starts.last().copied().unwrap_or(0)
    }

    /// Public suffix of `domain` (`co.uk` for `a.example.co.uk`)
    pub fn public_suffix<'a>(&self, domain: &'a Domain) -> &'a str {
        let name = domain.as_str();
        &name[self.suffix_start(name)..]
    }

    /// Registrable root of `domain`: its public suffix plus one label.
    ///
    /// `a.b.example.co.uk` -> `example.co.uk`. A domain that is itself a
    /// public suffix (no label left of the suffix) is returned unchanged.
    pub fn public_root(&self, domain: &Domain) -> Domain {
        let name = domain.as_str();
        let suffix_start = self.suffix_start(name);
        if suffix_start == 0 {
            return domain.clone();
        }

        // suffix_start - 1 is the dot before the suffix
        let root_start = name[..suffix_start - 1]
            .rfind('.')
            .map(|pos| pos + 1)
            .unwrap_or(0);
        Domain::from_normalized(name[root_start..].to_string())
    }
}

/// Byte offsets of every label start, leftmost first
fn label_starts(name: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(name.match_indices('.').map(|(pos, _)| pos + 1))
        .collect()
}

fn encode_rule(rule: &str) -> Option<String> {
    let rule = rule.trim_matches('.');
    if rule.is_empty() {
        return None;
    }
    idna::domain_to_ascii(rule).ok().filter(|r| !r.is_empty())
}
