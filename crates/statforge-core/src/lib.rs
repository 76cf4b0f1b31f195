//! # statforge-core — Canonical Stat-Block Types
//!
//! This crate is the bedrock of the statforge workspace. It defines the
//! canonical, fully-typed representation of one creature stat block
//! ([`CreatureRecord`]) together with the reference data the validators
//! consume ([`Ruleset`]) and the structured output they produce
//! ([`Report`]). Every other crate in the workspace depends on
//! `statforge-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Typed variants for conditional shapes.** Attack reach/range
//!    applicability and usage mechanics are closed enums
//!    ([`AttackShape`], [`Usage`]) rather than bags of independently
//!    optional fields, so applicability rules become exhaustive matches.
//!
//! 2. **Dice expressions parse once.** All hit-dice strings flow through
//!    [`DiceRoll::parse`]; the average formula lives in exactly one place.
//!
//! 3. **Rule data is loadable, never ambient.** Challenge-rating tables,
//!    vocabularies, and string grammars live in [`Ruleset`], which is
//!    loaded once and passed by reference into builder and validators.
//!
//! 4. **Findings accumulate.** Validators append [`Violation`]s to a
//!    [`Report`]; a failed check never suppresses the checks after it.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `statforge-*` crates (leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - No logging; this crate returns structured results only.

pub mod ability;
pub mod cr;
pub mod dice;
pub mod error;
pub mod model;
pub mod report;
pub mod rules;

// Re-export primary types for ergonomic imports.
pub use ability::{governing_ability, Abilities, Ability, AbilityScore};
pub use cr::{ChallengeRating, Cr};
pub use dice::DiceRoll;
pub use error::{BuildError, RulesError};
pub use model::{
    Action, Actions, ArmorClass, Attack, AttackShape, CastingAbility, CastingType, CoreStats,
    CreatureInfo, CreatureRecord, Defenses, Description, Hit, HitPoints, LairAction, LairActions,
    Languages, LegendaryAction, LegendaryActions, Metadata, Proficiencies, RegionalEffect,
    RegionalEffects, SavingThrow, Senses, SkillBonus, Speed, Spell, SpellLevel, Spellcasting,
    SpellsPerPeriod, Trait, Usage,
};
pub use report::{FieldPath, Report, RuleId, Severity, Violation};
pub use rules::{Ruleset, RulesetLoad};
