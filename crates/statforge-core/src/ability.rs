//! # Ability Scores
//!
//! The six ability scores and their derived modifiers. The modifier
//! formula `floor((score - 10) / 2)` lives here, in exactly one place;
//! the cross-validation engine compares recorded modifiers against
//! [`AbilityScore::expected_modifier`] rather than recomputing inline.

use serde::{Deserialize, Serialize};

/// One of the six creature abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    /// All six abilities in canonical stat-block order.
    pub const ALL: [Ability; 6] = [
        Ability::Strength,
        Ability::Dexterity,
        Ability::Constitution,
        Ability::Intelligence,
        Ability::Wisdom,
        Ability::Charisma,
    ];

    /// The lowercase full name, matching the wire representation.
    pub fn name(self) -> &'static str {
        match self {
            Ability::Strength => "strength",
            Ability::Dexterity => "dexterity",
            Ability::Constitution => "constitution",
            Ability::Intelligence => "intelligence",
            Ability::Wisdom => "wisdom",
            Ability::Charisma => "charisma",
        }
    }

    /// Case-insensitive parse accepting either the full name or the
    /// three-letter abbreviation ("str", "DEX", "Wisdom", ...).
    pub fn parse(token: &str) -> Option<Ability> {
        match token.to_ascii_lowercase().as_str() {
            "strength" | "str" => Some(Ability::Strength),
            "dexterity" | "dex" => Some(Ability::Dexterity),
            "constitution" | "con" => Some(Ability::Constitution),
            "intelligence" | "int" => Some(Ability::Intelligence),
            "wisdom" | "wis" => Some(Ability::Wisdom),
            "charisma" | "cha" => Some(Ability::Charisma),
            _ => None,
        }
    }
}

/// The ability a standard skill keys off. Returns `None` for skills
/// outside the standard list (homebrew vocabularies may add entries
/// this table cannot anchor to an ability).
pub fn governing_ability(skill: &str) -> Option<Ability> {
    match skill {
        "athletics" => Some(Ability::Strength),
        "acrobatics" | "sleight of hand" | "stealth" => Some(Ability::Dexterity),
        "arcana" | "history" | "investigation" | "nature" | "religion" => {
            Some(Ability::Intelligence)
        }
        "animal handling" | "insight" | "medicine" | "perception" | "survival" => {
            Some(Ability::Wisdom)
        }
        "deception" | "intimidation" | "performance" | "persuasion" => Some(Ability::Charisma),
        _ => None,
    }
}

impl std::fmt::Display for Ability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A raw ability score paired with its recorded modifier.
///
/// The pair is stored exactly as extracted; whether the modifier agrees
/// with the score is a cross-validation question, not a construction one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScore {
    /// The raw score, 1–30 for valid creatures.
    pub score: i64,
    /// The recorded modifier as printed in the stat block.
    pub modifier: i64,
}

impl AbilityScore {
    /// The modifier the game derives from a score: `floor((score - 10) / 2)`.
    ///
    /// `div_euclid` keeps the floor semantics for odd scores below 10
    /// (score 1 → −5, score 9 → −1).
    pub fn expected_modifier(score: i64) -> i64 {
        (score - 10).div_euclid(2)
    }
}

/// The full six-ability block. Always present on a well-formed record;
/// a source missing it fails at build time because no derived check can
/// proceed without it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abilities {
    pub strength: AbilityScore,
    pub dexterity: AbilityScore,
    pub constitution: AbilityScore,
    pub intelligence: AbilityScore,
    pub wisdom: AbilityScore,
    pub charisma: AbilityScore,
}

impl Abilities {
    /// Look up one ability's score pair.
    pub fn get(&self, ability: Ability) -> &AbilityScore {
        match ability {
            Ability::Strength => &self.strength,
            Ability::Dexterity => &self.dexterity,
            Ability::Constitution => &self.constitution,
            Ability::Intelligence => &self.intelligence,
            Ability::Wisdom => &self.wisdom,
            Ability::Charisma => &self.charisma,
        }
    }

    /// Iterate the six abilities in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Ability, &AbilityScore)> {
        Ability::ALL.iter().map(move |a| (*a, self.get(*a)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn modifier_formula_spot_values() {
        assert_eq!(AbilityScore::expected_modifier(10), 0);
        assert_eq!(AbilityScore::expected_modifier(11), 0);
        assert_eq!(AbilityScore::expected_modifier(12), 1);
        assert_eq!(AbilityScore::expected_modifier(1), -5);
        assert_eq!(AbilityScore::expected_modifier(30), 10);
    }

    #[test]
    fn ability_parse_accepts_abbreviations() {
        assert_eq!(Ability::parse("STR"), Some(Ability::Strength));
        assert_eq!(Ability::parse("Wisdom"), Some(Ability::Wisdom));
        assert_eq!(Ability::parse("cha"), Some(Ability::Charisma));
        assert_eq!(Ability::parse("luck"), None);
    }

    proptest! {
        #[test]
        fn modifier_formula_floors(score in 1i64..=30) {
            let expected = ((score - 10) as f64 / 2.0).floor() as i64;
            prop_assert_eq!(AbilityScore::expected_modifier(score), expected);
        }
    }
}
