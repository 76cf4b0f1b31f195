//! # Convert Subcommand
//!
//! Reads a raw section bag (YAML or JSON), builds the typed record,
//! runs both validation engines, and writes canonical YAML when the
//! report carries no errors.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use statforge_validate::validate_record;

use crate::rules::load_ruleset;

/// Arguments for the convert subcommand.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Raw stat-block bag, `.yaml`/`.yml` or `.json` by extension.
    pub input: PathBuf,

    /// Destination for the canonical YAML record.
    pub output: PathBuf,

    /// Rule-configuration file overriding the default tables.
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Print the full violation report as JSON on stdout, warnings
    /// included, even when the record is valid.
    #[arg(long)]
    pub report: bool,
}

pub fn run(args: ConvertArgs) -> anyhow::Result<()> {
    let rules = load_ruleset(args.rules.as_deref())?;
    let bag = read_bag(&args.input)?;

    let record = statforge_builder::build_from_value(&bag, &rules)
        .with_context(|| format!("failed to build record from {}", args.input.display()))?;
    tracing::info!(name = %record.metadata.name, "record built");

    let report = validate_record(&record, &rules);
    for violation in report.violations() {
        match violation.severity {
            statforge_core::Severity::Error => tracing::error!("{violation}"),
            statforge_core::Severity::Warning => tracing::warn!("{violation}"),
        }
    }
    if args.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    let error_count = report.errors().count();
    if error_count > 0 {
        anyhow::bail!(
            "validation failed with {error_count} error(s); {} not written",
            args.output.display()
        );
    }

    let yaml = serde_yaml::to_string(&record)?;
    fs::write(&args.output, yaml)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    tracing::info!(output = %args.output.display(), "canonical record written");
    Ok(())
}

/// Parse the input file into a loose JSON value, choosing the parser by
/// file extension. Anything that is not `.json` is treated as YAML;
/// extractors emit both.
fn read_bag(path: &Path) -> anyhow::Result<serde_json::Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let bag = if is_json {
        serde_json::from_str(&text)
            .with_context(|| format!("{} is not valid JSON", path.display()))?
    } else {
        serde_yaml::from_str(&text)
            .with_context(|| format!("{} is not valid YAML", path.display()))?
    };
    Ok(bag)
}
