//! # statforge-cli — Stat-Block Conversion Front End
//!
//! ## Subcommands
//!
//! - `convert` — build a raw section bag into a typed record, validate
//!   it, and write canonical YAML
//! - `rules` — check a rule-configuration file without converting
//!   anything
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to the domain crates; presentation of
//!   findings lives here and nowhere else.

pub mod convert;
pub mod rules;
