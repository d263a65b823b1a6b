//! Configure command

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use once_cell::sync::Lazy;
use tracing::info;

use dnsgate::config::{
    Config, Paths, ALT_REMOTE_BLACKLISTS, DEFAULT_DNSMASQ_CONFIG_FILE, DEFAULT_REMOTE_BLACKLISTS,
};
use dnsgate::source::local::{blacklist_header, ensure_list_file, whitelist_header};
use dnsgate::Mode;

static SOURCE_HELP: Lazy<String> = Lazy::new(|| {
    let mut help = String::from(
        "Remote hosts-format blacklist (repeatable)\n\nDefaults to:\n",
    );
    for url in DEFAULT_REMOTE_BLACKLISTS {
        help.push_str(&format!("    {}\n", url));
    }
    help.push_str("\nOther lists that work here:\n");
    for url in ALT_REMOTE_BLACKLISTS {
        help.push_str(&format!("    {}\n", url));
    }
    help
});

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    /// dnsmasq include file
    Dnsmasq,
    /// /etc/hosts format
    Hosts,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Dnsmasq => Mode::Dnsmasq,
            ModeArg::Hosts => Mode::Hosts,
        }
    }
}

/// Configure command arguments
#[derive(Args, Debug)]
pub struct ConfigureArgs {
    /// Output format
    #[arg(long, value_enum, default_value = "dnsmasq")]
    pub mode: ModeArg,

    /// Block whole registrable domains (example.com for ads.example.com).
    /// dnsmasq mode only.
    #[arg(long)]
    pub block_at_psl: bool,

    /// Resolve blocked names to this IP instead of NXDOMAIN (dnsmasq) or 127.0.0.1 (hosts)
    #[arg(long, value_name = "IP")]
    pub dest_ip: Option<IpAddr>,

    /// Remote hosts-format blacklist (repeatable, defaults to the built-in list)
    #[arg(long = "source", value_name = "URL", long_help = SOURCE_HELP.as_str())]
    pub sources: Vec<String>,

    /// dnsmasq config file
    #[arg(long, value_name = "FILE", default_value = DEFAULT_DNSMASQ_CONFIG_FILE)]
    pub dnsmasq_config_file: PathBuf,
}

/// Execute the configure command
pub fn execute(paths: &Paths, args: ConfigureArgs) -> Result<()> {
    let mode = Mode::from(args.mode);
    let sources = if args.sources.is_empty() {
        DEFAULT_REMOTE_BLACKLISTS.iter().map(|s| s.to_string()).collect()
    } else {
        args.sources
    };

    let config = Config {
        mode,
        block_at_psl: args.block_at_psl,
        dest_ip: args.dest_ip,
        sources,
        dnsmasq_config_file: (mode == Mode::Dnsmasq).then_some(args.dnsmasq_config_file),
    };

    let config_file = paths.config_file();
    config
        .save(&config_file)
        .with_context(|| format!("Failed to write {}", config_file.display()))?;

    let blacklist = paths.blacklist();
    let whitelist = paths.whitelist();
    if ensure_list_file(&blacklist, &blacklist_header(&whitelist))? {
        info!("Created {}", blacklist.display());
    }
    if ensure_list_file(&whitelist, &whitelist_header(&blacklist, &config_file))? {
        info!("Created {}", whitelist.display());
    }

    match (&config.mode, &config.dnsmasq_config_file) {
        (Mode::Dnsmasq, Some(dnsmasq_config)) => dnsmasq_install_help(dnsmasq_config, &paths.output()),
        _ => hosts_install_help(&paths.output()),
    }
    Ok(())
}

fn dnsmasq_install_help(dnsmasq_config: &Path, output: &Path) {
    let line = format!("conf-file={}", output.display());
    let config = dnsmasq_config.display();
    eprintln!("After running \"dnsgate generate\", include the output in dnsmasq:");
    eprintln!("    $ cp -vi {config} {config}.bak");
    eprintln!("    $ grep -qx '{line}' {config} || echo '{line}' >> {config}");
    eprintln!("    $ /etc/init.d/dnsmasq restart");
}

fn hosts_install_help(output: &Path) {
    eprintln!("After running \"dnsgate generate\", install the output as /etc/hosts:");
    eprintln!("    $ mv -vi /etc/hosts /etc/hosts.default");
    eprintln!("    $ cat /etc/hosts.default {} > /etc/hosts", output.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Args as CliArgs;
    use clap::CommandFactory;

    #[test]
    fn test_source_help_lists_alternatives() {
        let cmd = CliArgs::command();
        let configure = cmd.find_subcommand("configure").unwrap();
        let source = configure
            .get_arguments()
            .find(|a| a.get_long() == Some("source"))
            .unwrap();
        let help = source.get_long_help().unwrap().to_string();

        for url in DEFAULT_REMOTE_BLACKLISTS.iter().chain(ALT_REMOTE_BLACKLISTS) {
            assert!(help.contains(url), "{} missing from: {}", url, help);
        }
    }
}
