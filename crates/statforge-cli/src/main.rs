//! # statforge CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// statforge — stat-block conversion and validation toolchain.
///
/// Builds loosely-typed extracted stat-block bags into strictly typed
/// records, certifies them against the game's arithmetic rules, and
/// writes canonical YAML.
#[derive(Parser, Debug)]
#[command(name = "statforge", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Convert a raw stat-block bag into a validated canonical record.
    Convert(statforge_cli::convert::ConvertArgs),
    /// Check a rule-configuration file.
    Rules(statforge_cli::rules::RulesArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert(args) => statforge_cli::convert::run(args),
        Commands::Rules(args) => statforge_cli::rules::run(args),
    }
}
