//! # statforge-builder — Canonical Model Builder
//!
//! Maps the loosely-typed per-section field bag delivered by an external
//! extractor into a [`CreatureRecord`]. The input is a JSON-compatible
//! mapping keyed by canonical section name (`metadata`, `creature_info`,
//! `core_stats`, `abilities`, ...); absence of an optional section means
//! "not present in the source", never an error.
//!
//! ## Responsibilities
//!
//! - Coerce numeric strings to numbers (`"+7"` → `7`).
//! - Normalize enum-like tokens case-insensitively against the ruleset
//!   vocabularies; a token with no match is a hard [`BuildError`].
//! - Fill absent optional fields with explicit empty representations —
//!   keys are never silently dropped on the way out.
//! - Preserve the source order of list-shaped sections (skills,
//!   actions); the violation report cites elements by index.
//!
//! Building is a pure function of the bag and the ruleset: no logging,
//! no I/O, no mutation of the input. A structural prerequisite that is
//! missing or unparseable aborts the build before any validation runs,
//! since derived checks have no well-defined input without it.

mod coerce;
mod sections;
mod usage;

use serde_json::{Map, Value};
use statforge_core::{BuildError, CreatureRecord, Ruleset};

pub use usage::parse_usage_text;

/// Sections a record cannot exist without.
const REQUIRED_SECTIONS: [&str; 6] = [
    "metadata",
    "creature_info",
    "core_stats",
    "abilities",
    "senses",
    "actions",
];

/// Build a canonical record from a raw section bag.
///
/// # Errors
///
/// Returns a [`BuildError`] naming the section and reason when a
/// required section is absent, a value cannot be coerced, a dice or
/// date expression fails its grammar, or a token matches no vocabulary
/// entry.
pub fn build_record(raw: &Map<String, Value>, rules: &Ruleset) -> Result<CreatureRecord, BuildError> {
    for section in REQUIRED_SECTIONS {
        if !raw.contains_key(section) {
            return Err(BuildError::MissingSection(section));
        }
    }

    Ok(CreatureRecord {
        metadata: sections::metadata(raw)?,
        info: sections::creature_info(raw, rules)?,
        stats: sections::core_stats(raw)?,
        abilities: sections::abilities(raw)?,
        proficiencies: sections::proficiencies(raw, rules)?,
        defenses: sections::defenses(raw, rules)?,
        senses: sections::senses(raw)?,
        languages: sections::languages(raw)?,
        traits: sections::traits(raw)?,
        spellcasting: sections::spellcasting(raw)?,
        actions: sections::actions(raw)?,
        legendary_actions: sections::legendary_actions(raw)?,
        lair_actions: sections::lair_actions(raw)?,
        regional_effects: sections::regional_effects(raw)?,
        description: sections::description(raw)?,
    })
}

/// Convenience wrapper for callers holding a whole `Value`.
///
/// # Errors
///
/// Fails when the value is not a mapping, plus everything
/// [`build_record`] can fail with.
pub fn build_from_value(raw: &Value, rules: &Ruleset) -> Result<CreatureRecord, BuildError> {
    let map = raw.as_object().ok_or(BuildError::MissingSection("metadata"))?;
    build_record(map, rules)
}
