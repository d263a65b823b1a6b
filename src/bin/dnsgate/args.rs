//! Command-line argument parsing

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Command;

/// dnsgate - merge DNS blacklists for dnsmasq or /etc/hosts
///
/// Combines remote hosts-format blacklists with the local blacklist and
/// whitelist into one minimal rule set.
#[derive(Parser, Debug)]
#[command(name = "dnsgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration directory (config.json, blacklist, whitelist, cache/)
    #[arg(long, value_name = "DIR", global = true, default_value = dnsgate::DEFAULT_CONFIG_DIR)]
    pub config_dir: PathBuf,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}
