//! Domain normalizer.
//!
//! Turns one line of a hosts file or a dnsgate list into a [`Domain`]:
//!
//! ```text
//! 0.0.0.0 ads.example.com   # hosts format, second field is the name
//! tracker.example.com.      # dnsgate format, stray dots are dropped
//! # comment lines and blank lines are ignored
//! ```

use std::net::IpAddr;

use tracing::debug;

use crate::diagnostics::{Warning, WarningSink};
use crate::error::{GateError, Result};
use crate::types::{Domain, DomainSet, Source};

/// Maximum length of a single label in octets
const MAX_LABEL_LEN: usize = 63;
/// Maximum length of a name in presentation form
const MAX_NAME_LEN: usize = 253;

/// Names every hosts file maps to loopback; blocking them breaks the host.
const HOSTS_HOUSEKEEPING: &[&str] = &[
    "localhost",
    "localhost.localdomain",
    "local",
    "broadcasthost",
    "ip6-localhost",
    "ip6-loopback",
    "ip6-localnet",
    "ip6-mcastprefix",
    "ip6-allnodes",
    "ip6-allrouters",
    "ip6-allhosts",
];

/// Normalize a single raw line.
///
/// Returns `Ok(None)` for blank lines, comment-only lines and hosts-file
/// housekeeping entries. Returns a `Validation` error for anything that is
/// present but is not a usable domain.
pub fn normalize_line(raw: &[u8]) -> Result<Option<Domain>> {
    // Remove comments before anything else
    let raw = match raw.iter().position(|&b| b == b'#') {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    let raw = raw.trim_ascii();
    if raw.is_empty() {
        return Ok(None);
    }

    let line = std::str::from_utf8(raw)
        .map_err(|_| GateError::validation(String::from_utf8_lossy(raw), "not valid UTF-8"))?;

    let token = if line.contains(char::is_whitespace) {
        // hosts format: <ip> <hostname> [aliases...]
        let mut fields = line.split_whitespace();
        let _ip = fields.next();
        let name = fields
            .next()
            .ok_or_else(|| GateError::validation(line, "hosts line without a hostname"))?;
        if is_hosts_housekeeping(name) {
            return Ok(None);
        }
        name
    } else {
        line
    };

    normalize_token(token).map(Some)
}

/// Normalize a bare domain token (no comments, no IP field).
pub fn normalize_token(token: &str) -> Result<Domain> {
    let joined = token
        .split('.')
        .filter(|label| !label.is_empty())
        .collect::<Vec<_>>()
        .join(".");
    if joined.is_empty() {
        return Err(GateError::validation(token, "empty domain"));
    }

    if joined.parse::<IpAddr>().is_ok() {
        return Err(GateError::validation(token, "IP address, not a domain"));
    }

    let ascii = idna::domain_to_ascii(&joined)
        .map_err(|e| GateError::validation(token, format!("IDNA encoding failed: {:?}", e)))?;

    // to_ascii may map some code points to dots or nothing; recheck the shape
    if ascii.is_empty() || ascii.split('.').any(|label| label.is_empty()) {
        return Err(GateError::validation(token, "empty label after IDNA encoding"));
    }
    if ascii.split('.').any(|label| label.len() > MAX_LABEL_LEN) {
        return Err(GateError::validation(
            token,
            format!("label longer than {} octets", MAX_LABEL_LEN),
        ));
    }
    if ascii.len() > MAX_NAME_LEN {
        return Err(GateError::validation(
            token,
            format!("name longer than {} octets", MAX_NAME_LEN),
        ));
    }

    Ok(Domain::from_normalized(ascii))
}

fn is_hosts_housekeeping(name: &str) -> bool {
    name.parse::<IpAddr>().is_ok()
        || HOSTS_HOUSEKEEPING
            .iter()
            .any(|skip| skip.eq_ignore_ascii_case(name))
}

/// Normalize every line of `bytes`, collecting rejects as warnings.
///
/// Accepts hosts-format and dnsgate-format lines mixed in one input.
pub fn parse_domains(bytes: &[u8], source: &Source, sink: &WarningSink) -> DomainSet {
    let mut domains = DomainSet::new();

    for line in bytes.split(|&b| b == b'\n') {
        match normalize_line(line) {
            Ok(Some(domain)) => {
                domains.insert(domain);
            }
            Ok(None) => {}
            Err(GateError::Validation { entry, reason }) => {
                sink.push(Warning::Validation {
                    source: source.clone(),
                    entry,
                    reason,
                });
            }
            Err(e) => {
                // normalize_line only produces validation errors
                sink.push(Warning::Validation {
                    source: source.clone(),
                    entry: String::from_utf8_lossy(line).into_owned(),
                    reason: e.to_string(),
                });
            }
        }
    }

    debug!("{} domains from {}", domains.len(), source);
    domains
}
