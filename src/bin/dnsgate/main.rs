//! dnsgate CLI
//!
//! Combines remote hosts-format blacklists with local lists and writes a
//! dnsmasq include file or an /etc/hosts style file.

mod args;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use tracing::error;

use args::Args;
use commands::Command;

fn main() {
    let args = Args::parse();

    if let Err(e) = logging::init(&args) {
        eprintln!("Failed to initialize logging: {:#}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let paths = dnsgate::Paths::new(&args.config_dir);

    match args.command {
        Command::Configure(configure_args) => commands::configure::execute(&paths, configure_args),
        Command::Generate(generate_args) => commands::generate::execute(&paths, generate_args),
        Command::Blacklist(list_args) => {
            commands::lists::execute(&paths, commands::lists::ListKind::Blacklist, list_args)
        }
        Command::Whitelist(list_args) => {
            commands::lists::execute(&paths, commands::lists::ListKind::Whitelist, list_args)
        }
    }
}
