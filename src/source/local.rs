//! Local blacklist/whitelist files.
//!
//! One domain per line, `#` starts a comment. These files are both inputs
//! and something the `blacklist`/`whitelist` commands append to, so every
//! write here is idempotent.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::diagnostics::{Warning, WarningSink};
use crate::error::{GateError, Result, SourceErrorKind};
use crate::normalize::{normalize_token, parse_domains};
use crate::types::{Domain, DomainSet, Source};

const BANNER_WIDTH: usize = 64;

/// Header written to a fresh local blacklist
pub fn blacklist_header(whitelist: &Path) -> String {
    format!(
        "{}\n\
         # dnsgate custom blacklist\n\
         # User-defined blacklisted domains go here.\n\
         # Rules defined here override conflicting rules in {}\n\
         #\n\
         # Examples:\n\
         # google.com    # blocks *.google.com\n\
         # biz           # blocks the TLD biz completely (*.biz)\n",
        "#".repeat(BANNER_WIDTH),
        whitelist.display()
    )
}

/// Header written to a fresh local whitelist
pub fn whitelist_header(blacklist: &Path, config_file: &Path) -> String {
    format!(
        "{}\n\
         # dnsgate custom whitelist\n\
         # User-defined whitelisted domains go here.\n\
         # Usually this is only needed if block_at_psl is enabled in {}\n\
         # Rules here ARE OVERRIDDEN by any conflicting rules in {}\n\
         #\n\
         # Examples:\n\
         # s3.amazonaws.com    # allows s3.amazonaws.com\n\
         #                     # if something.s3.amazonaws.com is in a source\n\
         #                     # it is still blocked unless whitelisted here.\n\
         # lwn.net             # allows lwn.net\n",
        "#".repeat(BANNER_WIDTH),
        config_file.display(),
        blacklist.display()
    )
}

/// Read the raw bytes of a local list.
///
/// Failures come back as `SourceUnavailable` with `SourceErrorKind::FileError`.
pub fn read_list_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| {
        let message = if e.kind() == ErrorKind::NotFound {
            "file is missing, run \"dnsgate configure --help\" to fix".to_string()
        } else {
            e.to_string()
        };
        GateError::source(SourceErrorKind::FileError, path.display().to_string(), message)
    })
}

/// Read a dnsgate-format list.
///
/// A missing or unreadable file contributes nothing and is reported as a
/// `SourceUnavailable` warning.
pub fn read_local_list(path: &Path, source: Source, sink: &WarningSink) -> DomainSet {
    match read_list_bytes(path) {
        Ok(bytes) => parse_domains(&bytes, &source, sink),
        Err(e) => {
            let reason = match e {
                GateError::SourceUnavailable { message, .. } => message,
                other => other.to_string(),
            };
            sink.push(Warning::SourceUnavailable { source, reason });
            DomainSet::new()
        }
    }
}

/// Create `path` with `header` unless it already exists.
///
/// Returns true if the file was created.
pub fn ensure_list_file(path: &Path, header: &str) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, header)?;
    debug!("Created {}", path.display());
    Ok(true)
}

/// Append `line` to `path` unless a line with the same content already exists.
///
/// Creates the file if needed. Returns true if the line was written.
pub fn append_unique_line(path: &Path, line: &str) -> Result<bool> {
    let line = line.trim_end_matches('\n');

    let existing = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };
    if existing.lines().any(|l| l.trim() == line) {
        return Ok(false);
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if !existing.is_empty() && !existing.ends_with('\n') {
        file.write_all(b"\n")?;
    }
    file.write_all(line.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(true)
}

/// Normalize `raw` and append it to a local list.
pub fn append_domain(path: &Path, raw: &str) -> Result<Domain> {
    info!("attempting to append {} to {}", raw, path.display());
    let domain = normalize_token(raw.trim())?;
    if append_unique_line(path, domain.as_str())? {
        debug!("appended {} to {}", domain, path.display());
    } else {
        debug!("{} already in {}", domain, path.display());
    }
    Ok(domain)
}
