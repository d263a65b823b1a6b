//! Persisted configuration and file layout.

use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigErrorKind, GateError, Result};
use crate::reconcile::{check_options, ReconcileOptions};
use crate::source::{is_http_url, DEFAULT_CACHE_EXPIRE};
use crate::types::Mode;

/// Default configuration directory
pub const DEFAULT_CONFIG_DIR: &str = "/etc/dnsgate";

/// Default dnsmasq main configuration file
pub const DEFAULT_DNSMASQ_CONFIG_FILE: &str = "/etc/dnsmasq.conf";

/// Remote lists used when none are configured
pub const DEFAULT_REMOTE_BLACKLISTS: &[&str] = &[
    "http://winhelp2002.mvps.org/hosts.txt",
    "http://someonewhocares.org/hosts/hosts",
];

/// Other well-known hosts-format lists, listed in the `configure --source` help
pub const ALT_REMOTE_BLACKLISTS: &[&str] = &[
    "https://adaway.org/hosts.txt",
    "https://raw.githubusercontent.com/StevenBlack/hosts/master/data/StevenBlack/hosts",
    "http://www.malwaredomainlist.com/hostslist/hosts.txt",
    "http://pgl.yoyo.org/adservers/serverlist.php?hostformat=hosts;showintro=0",
];

fn default_sources() -> Vec<String> {
    DEFAULT_REMOTE_BLACKLISTS.iter().map(|s| s.to_string()).collect()
}

/// Run configuration written by `dnsgate configure`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub mode: Mode,

    /// Block whole registrable domains (`example.com` for `ads.example.com`)
    #[serde(default)]
    pub block_at_psl: bool,

    /// Answer blocked names with this address instead of NXDOMAIN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_ip: Option<IpAddr>,

    #[serde(default = "default_sources")]
    pub sources: Vec<String>,

    /// dnsmasq configuration the generated file is included from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dnsmasq_config_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Dnsmasq,
            block_at_psl: false,
            dest_ip: None,
            sources: default_sources(),
            dnsmasq_config_file: Some(PathBuf::from(DEFAULT_DNSMASQ_CONFIG_FILE)),
        }
    }
}

impl Config {
    /// Options for the reconciler
    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            mode: self.mode,
            root_reduction: self.block_at_psl,
        }
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        check_options(&self.reconcile_options())?;

        for source in &self.sources {
            if !is_http_url(source) {
                return Err(GateError::config(
                    ConfigErrorKind::InvalidValue,
                    format!("source {} must start with http:// or https://", source),
                ));
            }
        }

        if let Some(path) = &self.dnsmasq_config_file {
            if path.to_string_lossy().chars().any(char::is_whitespace) {
                return Err(GateError::config(
                    ConfigErrorKind::InvalidValue,
                    format!(
                        "dnsmasq config file can not contain whitespace: {}",
                        path.display()
                    ),
                ));
            }
        }

        Ok(())
    }

    /// Parse and validate a config document
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)
            .map_err(|e| GateError::config(ConfigErrorKind::Parse, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config file.
    ///
    /// A missing file is a `Missing` error so the caller can point the user
    /// at `dnsgate configure`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(GateError::config(
                    ConfigErrorKind::Missing,
                    format!(
                        "{} not found, run \"dnsgate configure --help\" first",
                        path.display()
                    ),
                ));
            }
            Err(e) => return Err(e.into()),
        };
        let config = Self::from_json(&text)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Validate and write the config file, creating its directory if needed
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');

        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, text)?;
        fs::rename(&tmp_path, path)?;
        info!("Wrote {}", path.display());
        Ok(())
    }
}

/// Every file location, derived from one configuration directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub config_dir: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_DIR)
    }
}

impl Paths {
    pub fn new(config_dir: impl AsRef<Path>) -> Self {
        Self {
            config_dir: config_dir.as_ref().to_path_buf(),
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }

    /// Local blacklist, overrides the whitelist
    pub fn blacklist(&self) -> PathBuf {
        self.config_dir.join("blacklist")
    }

    pub fn whitelist(&self) -> PathBuf {
        self.config_dir.join("whitelist")
    }

    /// Default output file
    pub fn output(&self) -> PathBuf {
        self.config_dir.join("generated_blacklist")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.config_dir.join("cache")
    }
}

/// Per-run options of `dnsgate generate`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Do not write fetched lists to the cache
    pub no_cache: bool,
    pub cache_expire: Duration,
    /// Output file, [`Paths::output`] when unset
    pub output: Option<PathBuf>,
    /// Keep a timestamped copy of the previous output
    pub backup: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            no_cache: false,
            cache_expire: DEFAULT_CACHE_EXPIRE,
            output: None,
            backup: false,
        }
    }
}

impl GenerateOptions {
    pub fn output_path(&self, paths: &Paths) -> PathBuf {
        self.output.clone().unwrap_or_else(|| paths.output())
    }
}
