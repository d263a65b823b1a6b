//! CLI commands

pub mod configure;
pub mod generate;
pub mod lists;

use clap::Subcommand;

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the configuration file and create the local lists
    Configure(configure::ConfigureArgs),

    /// Fetch the sources and write the combined blacklist
    Generate(generate::GenerateArgs),

    /// Add domains to the local blacklist, then regenerate
    Blacklist(lists::ListArgs),

    /// Add domains to the local whitelist, then regenerate
    Whitelist(lists::ListArgs),
}
