//! # Canonical Creature Record
//!
//! The strictly typed representation of one creature stat block. A
//! [`CreatureRecord`] is constructed once per conversion run by the
//! builder crate, read (never mutated) by the validators, and then
//! either serialized or discarded in favor of the violation report.
//!
//! Optional fields serialize as explicit `null`/empty values rather
//! than being omitted — the serialization collaborator relies on a
//! fixed shape.
//!
//! Conditional applicability ("reach only when melee", "range only for
//! recharge") is encoded as closed enums ([`AttackShape`], [`Usage`])
//! so the validators match exhaustively instead of inspecting flag
//! combinations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ability::{Abilities, Ability};
use crate::cr::ChallengeRating;
use crate::dice::DiceRoll;

/// The root aggregate: one fully typed creature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureRecord {
    pub metadata: Metadata,
    #[serde(rename = "creature_info")]
    pub info: CreatureInfo,
    #[serde(rename = "core_stats")]
    pub stats: CoreStats,
    pub abilities: Abilities,
    pub proficiencies: Proficiencies,
    pub defenses: Defenses,
    pub senses: Senses,
    pub languages: Languages,
    pub traits: Vec<Trait>,
    pub spellcasting: Option<Spellcasting>,
    pub actions: Actions,
    pub legendary_actions: Option<LegendaryActions>,
    pub lair_actions: Option<LairActions>,
    pub regional_effects: Option<RegionalEffects>,
    pub description: Description,
}

/// Document bookkeeping for the stat block itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Creature name, 1–100 characters.
    pub name: String,
    /// Optional honorific/title line.
    pub title: Option<String>,
    /// `MAJOR.MINOR` document version.
    pub version: String,
    /// Creation date; must not lie in the future.
    pub date_created: NaiveDate,
    pub last_modified: Option<NaiveDate>,
    /// Source document the block was extracted from.
    pub source: Option<String>,
    pub tags: Vec<String>,
}

/// Classification line: size, type, alignment, challenge rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureInfo {
    /// Size category, normalized lowercase, vocabulary-checked.
    pub size: String,
    /// Creature type, normalized lowercase, vocabulary-checked.
    #[serde(rename = "type")]
    pub creature_type: String,
    /// Parenthetical subtypes, e.g. `["shapechanger"]`.
    pub subtypes: Vec<String>,
    /// `{lawful|neutral|chaotic} {good|neutral|evil}` or `unaligned`.
    pub alignment: String,
    pub challenge_rating: ChallengeRating,
}

/// Armor class, hit points, and movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreStats {
    pub armor_class: ArmorClass,
    pub hit_points: HitPoints,
    pub speed: Speed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorClass {
    /// AC value, 0–30.
    pub value: i64,
    /// What grants the AC ("natural armor", "plate"), when stated.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPoints {
    /// Printed average; must equal the floored mean of `roll`.
    pub average: i64,
    /// The hit-dice expression.
    pub roll: DiceRoll,
}

/// The five movement modes. Each is optional; each must be a
/// non-negative multiple of 5 no greater than 120.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speed {
    pub walk: Option<i64>,
    pub fly: Option<i64>,
    pub swim: Option<i64>,
    pub burrow: Option<i64>,
    pub climb: Option<i64>,
    /// Whether the fly speed allows hovering.
    #[serde(default)]
    pub hover: bool,
    /// Free-text rider, e.g. "in bat form only".
    pub special: Option<String>,
}

impl Speed {
    /// The named modes and their values, for uniform range checks.
    pub fn modes(&self) -> [(&'static str, Option<i64>); 5] {
        [
            ("walk", self.walk),
            ("fly", self.fly),
            ("swim", self.swim),
            ("burrow", self.burrow),
            ("climb", self.climb),
        ]
    }
}

/// Saving-throw and skill proficiencies, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proficiencies {
    pub saving_throws: Vec<SavingThrow>,
    pub skills: Vec<SkillBonus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingThrow {
    pub ability: Ability,
    /// Printed save modifier; must equal ability modifier + proficiency.
    pub modifier: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillBonus {
    /// Skill name, normalized lowercase, vocabulary-checked.
    pub name: String,
    /// Printed skill modifier; expertise doubles proficiency at most.
    pub modifier: i64,
}

/// Damage and condition defenses. Tokens are normalized lowercase and
/// drawn from the ruleset vocabularies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defenses {
    pub damage_resistances: Vec<String>,
    pub damage_immunities: Vec<String>,
    pub condition_immunities: Vec<String>,
}

/// Special senses plus passive perception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Senses {
    pub darkvision: Option<i64>,
    pub blindsight: Option<i64>,
    pub tremorsense: Option<i64>,
    pub truesight: Option<i64>,
    /// `10 + wisdom modifier`; proficiency deliberately not included.
    pub passive_perception: i64,
    pub special: Vec<String>,
}

impl Senses {
    /// The distance-valued senses, for uniform range checks.
    pub fn distances(&self) -> [(&'static str, Option<i64>); 4] {
        [
            ("darkvision", self.darkvision),
            ("blindsight", self.blindsight),
            ("tremorsense", self.tremorsense),
            ("truesight", self.truesight),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Languages {
    /// Spoken languages; `["—"]` when the creature has none.
    pub spoken: Vec<String>,
    /// Telepathy distance in feet, when present.
    pub telepathy: Option<i64>,
    /// Clauses like "understands Common but can't speak".
    pub special: Option<String>,
}

/// A passive trait such as *Amphibious* or *Legendary Resistance*.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trait {
    pub name: String,
    pub description: String,
    pub usage: Option<Usage>,
}

/// How a spellcaster casts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastingType {
    Innate,
    Regular,
    PactMagic,
}

/// The three abilities a caster can key spells off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastingAbility {
    Intelligence,
    Wisdom,
    Charisma,
}

impl CastingAbility {
    /// The corresponding full ability, for score lookups.
    pub fn ability(self) -> Ability {
        match self {
            CastingAbility::Intelligence => Ability::Intelligence,
            CastingAbility::Wisdom => Ability::Wisdom,
            CastingAbility::Charisma => Ability::Charisma,
        }
    }
}

/// The spellcasting trait. Present only for casters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spellcasting {
    #[serde(rename = "type")]
    pub casting_type: CastingType,
    pub ability: CastingAbility,
    /// Save DC; must equal `8 + proficiency + base_modifier`.
    pub dc: i64,
    /// Spell attack bonus; must equal `proficiency + base_modifier`.
    pub attack_bonus: i64,
    /// The casting ability's modifier, −5..=+10.
    pub base_modifier: i64,
    pub at_will: Vec<Spell>,
    pub spell_slots: Vec<SpellLevel>,
    pub limited_use: Vec<SpellsPerPeriod>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spell {
    pub name: String,
    /// Parenthetical rider, e.g. "self only".
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellLevel {
    /// Spell level 0–9.
    pub level: i64,
    /// Slots at this level, 1–4.
    pub slots: i64,
    pub spells: Vec<Spell>,
}

/// Spells castable a fixed number of times per period, e.g. "3/day".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellsPerPeriod {
    /// `N/day`, `N/short rest`, or `N/long rest`.
    pub frequency: String,
    pub spells: Vec<Spell>,
}

/// The three action lists. `standard` is always present (possibly
/// empty); the other two default to empty when the source lacks them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Actions {
    pub standard: Vec<Action>,
    pub bonus_actions: Vec<Action>,
    pub reactions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub description: String,
    pub attack: Option<Attack>,
    pub hit: Option<Hit>,
    pub usage: Option<Usage>,
}

/// The closed set of attack shapes. Reach exists exactly for melee
/// shapes, range exactly for ranged shapes; a versatile thrown weapon
/// carries both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttackShape {
    MeleeWeapon {
        /// Reach string, e.g. "5 ft.".
        reach: String,
    },
    RangedWeapon {
        /// Range string, e.g. "80/320 ft.".
        range: String,
    },
    MeleeSpell {
        reach: String,
    },
    RangedSpell {
        range: String,
    },
    MeleeOrRangedWeapon {
        reach: String,
        range: String,
    },
}

impl AttackShape {
    /// Whether the attack is a spell attack.
    pub fn is_spell(&self) -> bool {
        matches!(self, AttackShape::MeleeSpell { .. } | AttackShape::RangedSpell { .. })
    }

    /// Whether the attack can be made in melee.
    pub fn is_melee(&self) -> bool {
        matches!(
            self,
            AttackShape::MeleeWeapon { .. }
                | AttackShape::MeleeSpell { .. }
                | AttackShape::MeleeOrRangedWeapon { .. }
        )
    }

    /// Whether the attack can be made at range.
    pub fn is_ranged(&self) -> bool {
        matches!(
            self,
            AttackShape::RangedWeapon { .. }
                | AttackShape::RangedSpell { .. }
                | AttackShape::MeleeOrRangedWeapon { .. }
        )
    }

    /// Reach string, for the shapes that have one.
    pub fn reach(&self) -> Option<&str> {
        match self {
            AttackShape::MeleeWeapon { reach }
            | AttackShape::MeleeSpell { reach }
            | AttackShape::MeleeOrRangedWeapon { reach, .. } => Some(reach),
            _ => None,
        }
    }

    /// Range string, for the shapes that have one.
    pub fn range(&self) -> Option<&str> {
        match self {
            AttackShape::RangedWeapon { range }
            | AttackShape::RangedSpell { range }
            | AttackShape::MeleeOrRangedWeapon { range, .. } => Some(range),
            _ => None,
        }
    }

    /// The snake_case shape name, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            AttackShape::MeleeWeapon { .. } => "melee_weapon",
            AttackShape::RangedWeapon { .. } => "ranged_weapon",
            AttackShape::MeleeSpell { .. } => "melee_spell",
            AttackShape::RangedSpell { .. } => "ranged_spell",
            AttackShape::MeleeOrRangedWeapon { .. } => "melee_or_ranged_weapon",
        }
    }
}

/// An attack roll attached to an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attack {
    #[serde(flatten)]
    pub shape: AttackShape,
    /// To-hit bonus as printed.
    pub bonus: i64,
    /// Ability the attack keys off, when stated.
    pub ability_used: Option<Ability>,
    /// Magic weapon bonus, 0–3.
    #[serde(default)]
    pub magical_bonus: i64,
    /// Finesse weapons may use STR or DEX in melee.
    #[serde(default)]
    pub is_finesse: bool,
}

/// Damage on a hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    /// Damage dice formula, e.g. "2d6 + 4".
    pub damage: String,
    /// Versatile (two-handed) formula, when the weapon has one.
    pub two_handed_damage: Option<String>,
    /// Damage type token, vocabulary-checked.
    pub damage_type: String,
    /// Free-text rider effects.
    pub additional_effects: Option<String>,
}

/// A limited-use mechanic attached to an action or trait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Usage {
    /// Re-rolled availability, e.g. "Recharge 5–6".
    Recharge {
        /// Single target value, when the range is one number.
        value: Option<i64>,
        /// Target range on the d6: 2–6 sorted consecutive values.
        range: Option<Vec<i64>>,
    },
    PerDay {
        times: i64,
        /// Higher allowance while in the creature's lair.
        times_in_lair: Option<i64>,
    },
    PerShortRest {
        times: i64,
    },
    PerLongRest {
        times: i64,
    },
    /// Spends legendary-action slots.
    Costs {
        value: i64,
    },
}

/// The legendary-action pool of an especially powerful creature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendaryActions {
    /// Slots refreshed each round, 1–5.
    pub slots_per_round: i64,
    pub description: String,
    pub actions: Vec<LegendaryAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendaryAction {
    pub name: String,
    pub description: String,
    /// Slots the action spends, 1–3.
    pub cost: i64,
    pub usage: Option<Usage>,
}

/// Lair actions, taken on a fixed initiative count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LairActions {
    /// Initiative count the lair acts on, 0–20.
    pub initiative_count: i64,
    pub description: String,
    pub actions: Vec<LairAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LairAction {
    pub name: String,
    pub description: String,
    pub usage: Option<Usage>,
}

/// Environmental effects tied to the lair; paired with lair actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalEffects {
    pub description: String,
    /// At least one effect when the section is present.
    pub effects: Vec<RegionalEffect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalEffect {
    pub name: String,
    pub description: String,
    /// Structured mechanics, when the source provides them.
    pub mechanics: Option<serde_json::Value>,
}

/// Narrative fields. Each is optional and 10–2000 characters when
/// present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub appearance: Option<String>,
    pub personality: Option<String>,
    pub background: Option<String>,
    pub tactics: Option<String>,
}

impl Description {
    /// The named narrative fields, for uniform length checks.
    pub fn fields(&self) -> [(&'static str, Option<&String>); 4] {
        [
            ("appearance", self.appearance.as_ref()),
            ("personality", self.personality.as_ref()),
            ("background", self.background.as_ref()),
            ("tactics", self.tactics.as_ref()),
        ]
    }
}

impl CreatureRecord {
    /// Every action in every list, with its report path. Order follows
    /// the record shape: standard, bonus, reactions.
    pub fn all_actions(&self) -> impl Iterator<Item = (crate::report::FieldPath, &Action)> {
        let root = crate::report::FieldPath::root("actions");
        let lists = [
            ("standard", &self.actions.standard),
            ("bonus_actions", &self.actions.bonus_actions),
            ("reactions", &self.actions.reactions),
        ];
        lists.into_iter().flat_map(move |(name, actions)| {
            let list_path = root.field(name);
            actions
                .iter()
                .enumerate()
                .map(move |(i, action)| (list_path.index(i), action))
                .collect::<Vec<_>>()
        })
    }

    /// Every usage attached anywhere in the record — trait, action,
    /// legendary action, or lair action — with its report path.
    pub fn all_usages(&self) -> Vec<(crate::report::FieldPath, &Usage)> {
        let mut out = Vec::new();
        let traits_path = crate::report::FieldPath::root("traits");
        for (i, t) in self.traits.iter().enumerate() {
            if let Some(usage) = &t.usage {
                out.push((traits_path.index(i).field("usage"), usage));
            }
        }
        for (path, action) in self.all_actions() {
            if let Some(usage) = &action.usage {
                out.push((path.field("usage"), usage));
            }
        }
        if let Some(legendary) = &self.legendary_actions {
            let base = crate::report::FieldPath::root("legendary_actions").field("actions");
            for (i, action) in legendary.actions.iter().enumerate() {
                if let Some(usage) = &action.usage {
                    out.push((base.index(i).field("usage"), usage));
                }
            }
        }
        if let Some(lair) = &self.lair_actions {
            let base = crate::report::FieldPath::root("lair_actions").field("actions");
            for (i, action) in lair.actions.iter().enumerate() {
                if let Some(usage) = &action.usage {
                    out.push((base.index(i).field("usage"), usage));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attack_shape_gates_reach_and_range() {
        let melee = AttackShape::MeleeWeapon { reach: "5 ft.".into() };
        assert!(melee.is_melee() && !melee.is_ranged() && !melee.is_spell());
        assert_eq!(melee.reach(), Some("5 ft."));
        assert_eq!(melee.range(), None);

        let thrown = AttackShape::MeleeOrRangedWeapon {
            reach: "5 ft.".into(),
            range: "20/60 ft.".into(),
        };
        assert!(thrown.is_melee() && thrown.is_ranged());

        let spell = AttackShape::RangedSpell { range: "120 ft.".into() };
        assert!(spell.is_spell() && spell.is_ranged());
    }

    #[test]
    fn usage_serializes_tagged() {
        let usage = Usage::Recharge { value: None, range: Some(vec![5, 6]) };
        let json = serde_json::to_value(&usage).unwrap();
        assert_eq!(json["type"], "recharge");
        assert_eq!(json["range"], serde_json::json!([5, 6]));

        let back: Usage = serde_json::from_value(json).unwrap();
        assert_eq!(back, usage);
    }

    #[test]
    fn attack_flattens_shape_fields() {
        let attack = Attack {
            shape: AttackShape::RangedWeapon { range: "80/320 ft.".into() },
            bonus: 7,
            ability_used: Some(Ability::Dexterity),
            magical_bonus: 0,
            is_finesse: false,
        };
        let json = serde_json::to_value(&attack).unwrap();
        assert_eq!(json["type"], "ranged_weapon");
        assert_eq!(json["range"], "80/320 ft.");
        assert_eq!(json["bonus"], 7);
    }
}
