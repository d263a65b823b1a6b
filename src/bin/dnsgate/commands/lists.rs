//! Blacklist and whitelist commands

use anyhow::{Context, Result};
use clap::Args;

use dnsgate::config::Paths;
use dnsgate::source::local::{append_domain, blacklist_header, ensure_list_file, whitelist_header};

use super::generate::{self, GenerateArgs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Blacklist,
    Whitelist,
}

/// Blacklist/whitelist command arguments
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Domains to add
    #[arg(required = true, value_name = "DOMAIN")]
    pub domains: Vec<String>,

    #[command(flatten)]
    pub generate: GenerateArgs,
}

/// Append the domains to the local list, then regenerate
pub fn execute(paths: &Paths, kind: ListKind, args: ListArgs) -> Result<()> {
    let blacklist = paths.blacklist();
    let whitelist = paths.whitelist();
    let (path, header) = match kind {
        ListKind::Blacklist => (blacklist.clone(), blacklist_header(&whitelist)),
        ListKind::Whitelist => (
            whitelist.clone(),
            whitelist_header(&blacklist, &paths.config_file()),
        ),
    };

    ensure_list_file(&path, &header)?;
    for raw in &args.domains {
        append_domain(&path, raw)
            .with_context(|| format!("Failed to add {} to {}", raw, path.display()))?;
    }

    generate::execute(paths, args.generate)
}
