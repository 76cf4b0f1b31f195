//! # Validation Ruleset
//!
//! The externally loadable rule data the builder and validators consume:
//! the challenge-rating → XP table, the proficiency-bonus step table,
//! the controlled vocabularies, and the string grammars. Rule updates
//! (homebrew variants, new damage types) are YAML edits, not recompiles.
//!
//! A [`Ruleset`] is loaded once at startup and passed by reference into
//! every validator — never read from ambient/global state. The
//! [`Ruleset::default`] carries the standard SRD values, and a rule file
//! overrides only the tables it names. Unknown keys in a rule file are
//! configuration *warnings* on the returned [`RulesetLoad`], never
//! crashes.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::cr::Cr;
use crate::error::RulesError;

// ── Vocabularies ─────────────────────────────────────────────────────

/// A controlled vocabulary with case-insensitive membership.
///
/// Entries are stored lowercase; [`Vocabulary::normalize`] is the single
/// place input tokens are folded before matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    entries: BTreeSet<String>,
}

impl Vocabulary {
    fn from_static(entries: &[&str]) -> Self {
        Self {
            entries: entries.iter().map(|e| e.to_string()).collect(),
        }
    }

    fn from_list(entries: Vec<String>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| e.trim().to_lowercase()).collect(),
        }
    }

    /// Fold a token to lowercase and return the canonical entry when it
    /// is a member.
    pub fn normalize(&self, token: &str) -> Option<String> {
        let folded = token.trim().to_lowercase();
        self.entries.contains(&folded).then_some(folded)
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, token: &str) -> bool {
        self.entries.contains(&token.trim().to_lowercase())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the vocabulary has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The five vocabularies the model draws tokens from.
#[derive(Debug, Clone)]
pub struct Vocabularies {
    pub sizes: Vocabulary,
    pub creature_types: Vocabulary,
    pub damage_types: Vocabulary,
    pub conditions: Vocabulary,
    pub skills: Vocabulary,
}

impl Default for Vocabularies {
    fn default() -> Self {
        Self {
            sizes: Vocabulary::from_static(&[
                "tiny", "small", "medium", "large", "huge", "gargantuan",
            ]),
            creature_types: Vocabulary::from_static(&[
                "aberration", "beast", "celestial", "construct", "dragon", "elemental", "fey",
                "fiend", "giant", "humanoid", "monstrosity", "ooze", "plant", "undead",
            ]),
            damage_types: Vocabulary::from_static(&[
                "acid", "bludgeoning", "cold", "fire", "force", "lightning", "necrotic",
                "piercing", "poison", "psychic", "radiant", "slashing", "thunder",
            ]),
            conditions: Vocabulary::from_static(&[
                "blinded", "charmed", "deafened", "exhaustion", "frightened", "grappled",
                "incapacitated", "invisible", "paralyzed", "petrified", "poisoned", "prone",
                "restrained", "stunned", "unconscious",
            ]),
            skills: Vocabulary::from_static(&[
                "acrobatics", "animal handling", "arcana", "athletics", "deception", "history",
                "insight", "intimidation", "investigation", "medicine", "nature", "perception",
                "performance", "persuasion", "religion", "sleight of hand", "stealth", "survival",
            ]),
        }
    }
}

// ── String Grammars ──────────────────────────────────────────────────

const VERSION_PATTERN: &str = r"^\d+\.\d+$";
const ALIGNMENT_PATTERN: &str =
    r"^(?:(?:lawful|neutral|chaotic) (?:good|neutral|evil)|neutral|unaligned)$";
const REACH_PATTERN: &str = r"^\d+ ft\.$";
const RANGE_PATTERN: &str = r"^\d+(?:/\d+)? ft\.$";
const FREQUENCY_PATTERN: &str = r"^[1-9]\d*/(?:day|short rest|long rest)$";

/// Compiled string grammars for pattern-shaped fields.
#[derive(Debug, Clone)]
pub struct Patterns {
    /// `MAJOR.MINOR` document version.
    pub version: Regex,
    /// Alignment line; lowercase form.
    pub alignment: Regex,
    /// Melee reach, e.g. `5 ft.`.
    pub reach: Regex,
    /// Ranged distance, e.g. `80/320 ft.`.
    pub range: Regex,
    /// Limited-use frequency, e.g. `3/day`.
    pub frequency: Regex,
}

impl Default for Patterns {
    fn default() -> Self {
        // All five patterns are compile-time constants.
        let compile = |p: &str| Regex::new(p).unwrap_or_else(|_| unreachable!());
        Self {
            version: compile(VERSION_PATTERN),
            alignment: compile(ALIGNMENT_PATTERN),
            reach: compile(REACH_PATTERN),
            range: compile(RANGE_PATTERN),
            frequency: compile(FREQUENCY_PATTERN),
        }
    }
}

// ── The Ruleset ──────────────────────────────────────────────────────

/// Process-scoped, read-only validation rule data.
#[derive(Debug, Clone)]
pub struct Ruleset {
    xp_by_cr: BTreeMap<String, i64>,
    proficiency_steps: Vec<(u8, i64)>,
    pub vocabularies: Vocabularies,
    pub patterns: Patterns,
}

impl Default for Ruleset {
    fn default() -> Self {
        Self {
            xp_by_cr: default_xp_table(),
            proficiency_steps: default_proficiency_steps(),
            vocabularies: Vocabularies::default(),
            patterns: Patterns::default(),
        }
    }
}

impl Ruleset {
    /// The guideline XP for a rating, when the table knows it.
    pub fn xp_for(&self, cr: &Cr) -> Option<i64> {
        self.xp_by_cr.get(&cr.as_key()).copied()
    }

    /// The proficiency bonus for a rating.
    ///
    /// Ratings bucket by the floor of their numeric value: the three
    /// fractions share the lowest step with CR 0–4. The step table is
    /// total over valid ratings; the final step is a catch-all.
    pub fn proficiency_bonus(&self, cr: &Cr) -> i64 {
        let floored = cr.numeric().floor() as u8;
        for (max_cr, bonus) in &self.proficiency_steps {
            if floored <= *max_cr {
                return *bonus;
            }
        }
        self.proficiency_steps.last().map(|(_, b)| *b).unwrap_or(2)
    }

    /// Load a ruleset from a YAML rule file, starting from the defaults
    /// and overriding only the tables the file names.
    pub fn from_yaml_file(path: &Path) -> Result<RulesetLoad, RulesError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Load a ruleset from YAML text. See [`Ruleset::from_yaml_file`].
    pub fn from_yaml_str(text: &str) -> Result<RulesetLoad, RulesError> {
        let file: RulesetFile = serde_yaml::from_str(text)?;
        let mut ruleset = Ruleset::default();
        let mut warnings = Vec::new();

        if let Some(table) = file.xp_by_cr {
            for key in table.keys() {
                if Cr::parse(key).is_none() {
                    return Err(RulesError::BadCrKey(key.clone()));
                }
            }
            ruleset.xp_by_cr = table;
        }
        if let Some(steps) = file.proficiency_steps {
            ruleset.proficiency_steps = steps;
        }
        if let Some(vocab) = file.vocabularies {
            apply_vocabularies(&mut ruleset.vocabularies, vocab, &mut warnings);
        }
        if let Some(patterns) = file.patterns {
            apply_patterns(&mut ruleset.patterns, patterns, &mut warnings)?;
        }
        for key in file.unknown.keys() {
            warnings.push(format!("unknown rule entry '{key}' ignored"));
        }

        Ok(RulesetLoad { ruleset, warnings })
    }
}

/// A loaded ruleset together with its configuration warnings.
#[derive(Debug)]
pub struct RulesetLoad {
    pub ruleset: Ruleset,
    /// Unknown keys and other non-fatal findings from the rule file.
    pub warnings: Vec<String>,
}

// ── Rule-File Shape ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RulesetFile {
    #[serde(default)]
    xp_by_cr: Option<BTreeMap<String, i64>>,
    #[serde(default)]
    proficiency_steps: Option<Vec<(u8, i64)>>,
    #[serde(default)]
    vocabularies: Option<VocabulariesFile>,
    #[serde(default)]
    patterns: Option<PatternsFile>,
    #[serde(flatten)]
    unknown: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Deserialize)]
struct VocabulariesFile {
    #[serde(default)]
    sizes: Option<Vec<String>>,
    #[serde(default)]
    creature_types: Option<Vec<String>>,
    #[serde(default)]
    damage_types: Option<Vec<String>>,
    #[serde(default)]
    conditions: Option<Vec<String>>,
    #[serde(default)]
    skills: Option<Vec<String>>,
    #[serde(flatten)]
    unknown: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Deserialize)]
struct PatternsFile {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    alignment: Option<String>,
    #[serde(default)]
    reach: Option<String>,
    #[serde(default)]
    range: Option<String>,
    #[serde(default)]
    frequency: Option<String>,
    #[serde(flatten)]
    unknown: BTreeMap<String, serde_yaml::Value>,
}

fn apply_vocabularies(
    target: &mut Vocabularies,
    file: VocabulariesFile,
    warnings: &mut Vec<String>,
) {
    if let Some(list) = file.sizes {
        target.sizes = Vocabulary::from_list(list);
    }
    if let Some(list) = file.creature_types {
        target.creature_types = Vocabulary::from_list(list);
    }
    if let Some(list) = file.damage_types {
        target.damage_types = Vocabulary::from_list(list);
    }
    if let Some(list) = file.conditions {
        target.conditions = Vocabulary::from_list(list);
    }
    if let Some(list) = file.skills {
        target.skills = Vocabulary::from_list(list);
    }
    for key in file.unknown.keys() {
        warnings.push(format!("unknown vocabulary '{key}' ignored"));
    }
}

fn apply_patterns(
    target: &mut Patterns,
    file: PatternsFile,
    warnings: &mut Vec<String>,
) -> Result<(), RulesError> {
    let compile = |name: &str, pattern: String| {
        Regex::new(&pattern).map_err(|source| RulesError::BadPattern {
            name: name.to_string(),
            source,
        })
    };
    if let Some(p) = file.version {
        target.version = compile("version", p)?;
    }
    if let Some(p) = file.alignment {
        target.alignment = compile("alignment", p)?;
    }
    if let Some(p) = file.reach {
        target.reach = compile("reach", p)?;
    }
    if let Some(p) = file.range {
        target.range = compile("range", p)?;
    }
    if let Some(p) = file.frequency {
        target.frequency = compile("frequency", p)?;
    }
    for key in file.unknown.keys() {
        warnings.push(format!("unknown pattern '{key}' ignored"));
    }
    Ok(())
}

// ── Default Tables ───────────────────────────────────────────────────

fn default_xp_table() -> BTreeMap<String, i64> {
    [
        ("0", 10),
        ("1/8", 25),
        ("1/4", 50),
        ("1/2", 100),
        ("1", 200),
        ("2", 450),
        ("3", 700),
        ("4", 1_100),
        ("5", 1_800),
        ("6", 2_300),
        ("7", 2_900),
        ("8", 3_900),
        ("9", 5_000),
        ("10", 5_900),
        ("11", 7_200),
        ("12", 8_400),
        ("13", 10_000),
        ("14", 11_500),
        ("15", 13_000),
        ("16", 15_000),
        ("17", 18_000),
        ("18", 20_000),
        ("19", 22_000),
        ("20", 25_000),
        ("21", 33_000),
        ("22", 41_000),
        ("23", 50_000),
        ("24", 62_000),
        ("25", 75_000),
        ("26", 90_000),
        ("27", 105_000),
        ("28", 120_000),
        ("29", 135_000),
        ("30", 155_000),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn default_proficiency_steps() -> Vec<(u8, i64)> {
    vec![(4, 2), (8, 3), (12, 4), (16, 5), (20, 6), (24, 7), (28, 8), (30, 9)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xp_table_covers_canonical_ratings() {
        let rules = Ruleset::default();
        assert_eq!(rules.xp_for(&Cr::Eighth), Some(25));
        assert_eq!(rules.xp_for(&Cr::Whole(5)), Some(1_800));
        assert_eq!(rules.xp_for(&Cr::Whole(30)), Some(155_000));
    }

    #[test]
    fn proficiency_bonus_steps() {
        let rules = Ruleset::default();
        assert_eq!(rules.proficiency_bonus(&Cr::Eighth), 2);
        assert_eq!(rules.proficiency_bonus(&Cr::Whole(4)), 2);
        assert_eq!(rules.proficiency_bonus(&Cr::Whole(5)), 3);
        assert_eq!(rules.proficiency_bonus(&Cr::Whole(17)), 6);
        assert_eq!(rules.proficiency_bonus(&Cr::Whole(21)), 7);
        assert_eq!(rules.proficiency_bonus(&Cr::Whole(30)), 9);
    }

    #[test]
    fn vocabularies_match_case_insensitively() {
        let vocab = Vocabularies::default();
        assert_eq!(vocab.sizes.normalize("Gargantuan"), Some("gargantuan".to_string()));
        assert_eq!(vocab.damage_types.normalize(" FIRE "), Some("fire".to_string()));
        assert_eq!(vocab.conditions.normalize("dazed"), None);
        assert_eq!(vocab.sizes.len(), 6);
        assert_eq!(vocab.creature_types.len(), 14);
        assert_eq!(vocab.damage_types.len(), 13);
        assert_eq!(vocab.conditions.len(), 15);
    }

    #[test]
    fn rule_file_overrides_and_warns_on_unknown_keys() {
        let yaml = r#"
xp_by_cr:
  "0": 0
  "1": 250
vocabularies:
  damage_types: [Fire, Ice]
homebrew_rule: true
"#;
        let load = Ruleset::from_yaml_str(yaml).unwrap();
        assert_eq!(load.ruleset.xp_for(&Cr::Whole(1)), Some(250));
        // Ratings absent from the override table become unknown.
        assert_eq!(load.ruleset.xp_for(&Cr::Whole(2)), None);
        assert!(load.ruleset.vocabularies.damage_types.contains("ice"));
        assert!(!load.ruleset.vocabularies.damage_types.contains("cold"));
        // Untouched tables keep defaults.
        assert_eq!(load.ruleset.proficiency_bonus(&Cr::Whole(9)), 4);
        assert_eq!(load.warnings, vec!["unknown rule entry 'homebrew_rule' ignored"]);
    }

    #[test]
    fn rule_file_rejects_bad_cr_keys_and_patterns() {
        assert!(matches!(
            Ruleset::from_yaml_str("xp_by_cr:\n  \"2/3\": 100\n"),
            Err(RulesError::BadCrKey(_))
        ));
        assert!(matches!(
            Ruleset::from_yaml_str("patterns:\n  version: \"[unclosed\"\n"),
            Err(RulesError::BadPattern { .. })
        ));
    }
}
