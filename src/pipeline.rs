//! One `generate` run: read, reconcile, prune, order, write.

use std::path::PathBuf;

use tracing::info;

use crate::config::{Config, GenerateOptions, Paths};
use crate::diagnostics::{Warning, WarningSink};
use crate::error::{ConfigErrorKind, GateError, Result};
use crate::order::order;
use crate::prune::prune;
use crate::psl::SuffixLoader;
use crate::reconcile::{check_options, reconcile, ReconcileInput};
use crate::render::{render, write_output, HeaderInfo};
use crate::source::{fetch_remote_domains, read_local_list, SourceFetcher};
use crate::types::{Domain, Source};

/// The final, ordered rules of a run
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub rules: Vec<Domain>,
    /// Whitelisted domains that stay blocked by the local blacklist
    pub conflicts: Vec<Domain>,
}

/// Build the rule set without writing anything.
///
/// Every fatal error surfaces here, before any output file is touched.
pub fn build_rule_set(
    config: &Config,
    paths: &Paths,
    fetcher: &dyn SourceFetcher,
    suffix_loader: &dyn SuffixLoader,
    sink: &WarningSink,
) -> Result<RuleSet> {
    let options = config.reconcile_options();
    check_options(&options)?;

    let whitelist_path = paths.whitelist();
    let whitelist = read_local_list(
        &whitelist_path,
        Source::LocalWhitelist(whitelist_path.clone()),
        sink,
    );
    info!("{} validated whitelist domains", whitelist.len());
    if whitelist.is_empty() && options.root_reduction {
        sink.push(Warning::EmptyWhitelist);
    }

    let blacklist = fetch_remote_domains(fetcher, &config.sources, sink);
    if blacklist.is_empty() {
        sink.push(Warning::NoRemoteDomains);
    }

    let blacklist_path = paths.blacklist();
    let local_blacklist = read_local_list(
        &blacklist_path,
        Source::LocalBlacklist(blacklist_path.clone()),
        sink,
    );
    info!("{} domains from the local blacklist", local_blacklist.len());

    // Conflicts are matched by public root whenever there is a whitelist.
    // Only root reduction needs the list to run at all.
    let suffixes = if options.root_reduction {
        Some(suffix_loader.load()?)
    } else if !whitelist.is_empty() {
        match suffix_loader.load() {
            Ok(list) => Some(list),
            Err(e) => {
                sink.push(Warning::SuffixListUnavailable {
                    reason: e.to_string(),
                });
                None
            }
        }
    } else {
        None
    };

    let input = ReconcileInput {
        blacklist,
        whitelist,
        local_blacklist,
    };
    let reconciled = reconcile(&input, &options, suffixes.as_ref(), sink)?;

    let pruned = prune(&reconciled.domains);
    info!(
        "{} blacklisted domains after removing redundant rules",
        pruned.len()
    );

    if pruned.is_empty() {
        return Err(GateError::config(
            ConfigErrorKind::EmptyRuleSet,
            "the list of domains to block is empty, nothing to do",
        ));
    }

    let rules = order(&pruned);
    info!("Final blacklisted domain count: {}", rules.len());

    Ok(RuleSet {
        rules,
        conflicts: reconciled.conflicts,
    })
}

/// Build the rule set and write it. Returns the output path and the rules.
pub fn generate(
    config: &Config,
    paths: &Paths,
    options: &GenerateOptions,
    fetcher: &dyn SourceFetcher,
    suffix_loader: &dyn SuffixLoader,
    sink: &WarningSink,
) -> Result<(PathBuf, RuleSet)> {
    let output = options.output_path(paths);
    info!("Using output file: {}", output.display());

    let rule_set = build_rule_set(config, paths, fetcher, suffix_loader, sink)?;

    let header = HeaderInfo::new(
        config,
        options,
        &output,
        paths.blacklist(),
        paths.whitelist(),
    );
    let text = render(config.mode, config.dest_ip, &rule_set.rules, &header);

    info!(
        "Writing output file: {} in {} format",
        output.display(),
        config.mode
    );
    write_output(&output, text.as_bytes(), options.backup)?;

    Ok((output, rule_set))
}
