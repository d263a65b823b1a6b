//! Generate command

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use dnsgate::config::{Config, GenerateOptions, Paths};
use dnsgate::psl::AutoSuffixLoader;
use dnsgate::source::CachedFetcher;
use dnsgate::WarningSink;

/// Generate command arguments
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Do not write fetched sources to the cache
    #[arg(long)]
    pub no_cache: bool,

    /// Seconds before a cached source is fetched again
    #[arg(long, value_name = "SECONDS", default_value_t = dnsgate::source::DEFAULT_CACHE_EXPIRE.as_secs())]
    pub cache_expire: u64,

    /// Output file (defaults to <config dir>/generated_blacklist)
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Keep a timestamped copy of the previous output
    #[arg(long)]
    pub backup: bool,
}

impl GenerateArgs {
    fn options(&self) -> GenerateOptions {
        GenerateOptions {
            no_cache: self.no_cache,
            cache_expire: Duration::from_secs(self.cache_expire),
            output: self.output.clone(),
            backup: self.backup,
        }
    }
}

/// Execute the generate command
pub fn execute(paths: &Paths, args: GenerateArgs) -> Result<()> {
    let config = Config::load(&paths.config_file())?;
    let options = args.options();

    let fetcher = CachedFetcher::new(paths.cache_dir())
        .with_expire(options.cache_expire)
        .with_no_cache(options.no_cache);
    let suffix_loader = AutoSuffixLoader::new().with_data_dir(paths.cache_dir());
    let sink = WarningSink::new();

    let (output, rule_set) = dnsgate::generate(&config, paths, &options, &fetcher, &suffix_loader, &sink)
        .context("Failed to generate blacklist")?;

    info!(
        "Wrote {} rules to {} ({} warnings)",
        rule_set.rules.len(),
        output.display(),
        sink.len()
    );
    Ok(())
}
