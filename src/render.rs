//! Output rendering and atomic writes.

use std::fs;
use std::io::Write;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::config::{Config, GenerateOptions};
use crate::error::Result;
use crate::types::{Domain, Mode};

const BANNER_WIDTH: usize = 64;

/// Address blocked names resolve to in hosts mode when none is configured
pub const DEFAULT_HOSTS_IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Render one rule.
///
/// dnsmasq without `dest_ip` answers NXDOMAIN for the name and every name
/// below it.
pub fn render_line(mode: Mode, dest_ip: Option<IpAddr>, domain: &Domain) -> String {
    match (mode, dest_ip) {
        (Mode::Dnsmasq, None) => format!("server=/.{}/", domain),
        (Mode::Dnsmasq, Some(ip)) => format!("address=/.{}/{}", domain, ip),
        (Mode::Hosts, ip) => format!("{} {}", ip.unwrap_or(DEFAULT_HOSTS_IP), domain),
    }
}

/// What the generated file header records about the run
#[derive(Debug, Clone)]
pub struct HeaderInfo {
    pub blacklist: PathBuf,
    pub whitelist: PathBuf,
    /// Command line that produced the file
    pub command: String,
    /// Printed as sorted `key: value` lines
    pub settings: Map<String, Value>,
}

impl HeaderInfo {
    pub fn new(
        config: &Config,
        options: &GenerateOptions,
        output: &Path,
        blacklist: PathBuf,
        whitelist: PathBuf,
    ) -> Self {
        let mut settings = Map::new();
        settings.insert("mode".into(), json!(config.mode));
        settings.insert("block_at_psl".into(), json!(config.block_at_psl));
        settings.insert("dest_ip".into(), json!(config.dest_ip));
        settings.insert("sources".into(), json!(config.sources));
        settings.insert("no_cache".into(), json!(options.no_cache));
        settings.insert(
            "cache_expire".into(),
            json!(options.cache_expire.as_secs()),
        );
        settings.insert("output".into(), json!(output.display().to_string()));

        Self {
            blacklist,
            whitelist,
            command: std::env::args().collect::<Vec<_>>().join(" "),
            settings,
        }
    }

    /// Replace the recorded command line
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }
}

/// The comment block written above the rules
pub fn render_header(info: &HeaderInfo) -> String {
    let banner = "#".repeat(BANNER_WIDTH);

    let mut keys: Vec<&String> = info.settings.keys().collect();
    keys.sort();
    let settings: Vec<String> = keys
        .into_iter()
        .map(|key| {
            let value = match &info.settings[key] {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("#    {}: {}", key, value)
        })
        .collect();

    format!(
        "{banner}\n#\n\
         # AUTOMATICALLY GENERATED BY dnsgate\n#\n\
         # CHANGES WILL BE LOST ON THE NEXT RUN.\n#\n\
         # EDIT {} or {} instead.\n#\n\
         # Generated by:\n# {}\n#\n\
         # Configuration:\n{}\n#\n\
         {banner}\n\n",
        info.blacklist.display(),
        info.whitelist.display(),
        info.command,
        settings.join("\n"),
    )
}

/// Header followed by one line per rule
pub fn render(
    mode: Mode,
    dest_ip: Option<IpAddr>,
    rules: &[Domain],
    header: &HeaderInfo,
) -> String {
    let mut out = render_header(header);
    for domain in rules {
        out.push_str(&render_line(mode, dest_ip, domain));
        out.push('\n');
    }
    out
}

/// Copy `path` to `<path>.bak.<unix seconds>`. Returns None if there was
/// nothing to back up.
pub fn backup_file(path: &Path) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let mut dest = path.to_path_buf().into_os_string();
    dest.push(format!(".bak.{}", stamp));
    let dest = PathBuf::from(dest);

    fs::copy(path, &dest)?;
    info!("Backed up {} to {}", path.display(), dest.display());
    Ok(Some(dest))
}

/// Replace `path` with `bytes` via a temporary file and rename
pub fn write_output(path: &Path, bytes: &[u8], backup: bool) -> Result<()> {
    if backup {
        backup_file(path)?;
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut tmp_path = path.to_path_buf().into_os_string();
    tmp_path.push(".tmp");
    let tmp_path = PathBuf::from(tmp_path);

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(bytes)?;
    file.flush()?;
    drop(file);
    fs::rename(&tmp_path, path)?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_token;

    fn d(s: &str) -> Domain {
        normalize_token(s).unwrap()
    }

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn header() -> HeaderInfo {
        HeaderInfo::new(
            &Config::default(),
            &GenerateOptions::default(),
            Path::new("/etc/dnsgate/generated_blacklist"),
            PathBuf::from("/etc/dnsgate/blacklist"),
            PathBuf::from("/etc/dnsgate/whitelist"),
        )
        .with_command("dnsgate generate")
    }

    #[test]
    fn test_render_line() {
        let domain = d("ads.example.com");
        let ip: IpAddr = "0.0.0.0".parse().unwrap();

        assert_eq!(render_line(Mode::Dnsmasq, None, &domain), "server=/.ads.example.com/");
        assert_eq!(
            render_line(Mode::Dnsmasq, Some(ip), &domain),
            "address=/.ads.example.com/0.0.0.0"
        );
        assert_eq!(render_line(Mode::Hosts, None, &domain), "127.0.0.1 ads.example.com");
        assert_eq!(render_line(Mode::Hosts, Some(ip), &domain), "0.0.0.0 ads.example.com");
    }

    #[test]
    fn test_header_lists_sorted_settings() {
        let text = render_header(&header());

        assert!(text.starts_with(&"#".repeat(BANNER_WIDTH)));
        assert!(text.contains("AUTOMATICALLY GENERATED"));
        assert!(text.contains("# EDIT /etc/dnsgate/blacklist or /etc/dnsgate/whitelist instead."));
        assert!(text.contains("# dnsgate generate\n"));
        assert!(text.contains("#    mode: dnsmasq\n"));
        assert!(text.contains("#    dest_ip: null\n"));

        let keys: Vec<&str> = text
            .lines()
            .filter_map(|l| l.strip_prefix("#    "))
            .filter_map(|l| l.split(':').next())
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert!(text.ends_with("\n\n"));
    }

    #[test]
    fn test_render_is_all_comments_then_rules() {
        let rules = vec![d("example.com"), d("ads.example.net")];
        let text = render(Mode::Hosts, None, &rules, &header());

        let rule_lines: Vec<&str> = text
            .lines()
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect();
        assert_eq!(rule_lines, vec!["127.0.0.1 example.com", "127.0.0.1 ads.example.net"]);
    }

    #[test]
    fn test_write_output_with_backup() {
        let dir = test_dir("dnsgate_test_write_output");
        let path = dir.join("generated_blacklist");

        write_output(&path, b"first\n", true).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"first\n");
        // nothing existed yet, so no backup
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 1);

        write_output(&path, b"second\n", true).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second\n");

        let backups: Vec<PathBuf> = fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.to_string_lossy().contains(".bak."))
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read(&backups[0]).unwrap(), b"first\n");

        let _ = fs::remove_dir_all(&dir);
    }
}
