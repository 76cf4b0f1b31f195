//! # Rules Subcommand
//!
//! Checks a rule-configuration file without converting anything:
//! parses it, reports unknown keys, and confirms the tables load.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use statforge_core::Ruleset;

/// Arguments for the rules subcommand.
#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Rule-configuration file to check.
    #[arg(long)]
    pub check: PathBuf,
}

pub fn run(args: RulesArgs) -> anyhow::Result<()> {
    let load = Ruleset::from_yaml_file(&args.check)
        .with_context(|| format!("failed to load rules from {}", args.check.display()))?;
    for warning in &load.warnings {
        println!("warning: {warning}");
    }
    println!(
        "{}: ok ({} warning(s))",
        args.check.display(),
        load.warnings.len()
    );
    Ok(())
}

/// The ruleset a conversion runs under: the named file, or the built-in
/// defaults. Configuration warnings are logged, never fatal.
pub fn load_ruleset(path: Option<&Path>) -> anyhow::Result<Ruleset> {
    let Some(path) = path else {
        return Ok(Ruleset::default());
    };
    let load = Ruleset::from_yaml_file(path)
        .with_context(|| format!("failed to load rules from {}", path.display()))?;
    for warning in &load.warnings {
        tracing::warn!(rules = %path.display(), "{warning}");
    }
    Ok(load.ruleset)
}
