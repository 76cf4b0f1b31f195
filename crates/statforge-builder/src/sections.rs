//! Per-section mapping from the raw bag into canonical types.
//!
//! One function per canonical section name. Required sections were
//! checked for presence by the caller; optional sections map absence to
//! their explicit empty representation.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use statforge_core::{
    Abilities, Ability, AbilityScore, Action, Actions, ArmorClass, Attack, AttackShape,
    BuildError, CastingAbility, CastingType, ChallengeRating, CoreStats, Cr, CreatureInfo,
    Defenses, Description, DiceRoll, Hit, HitPoints, LairAction, LairActions, Languages,
    LegendaryAction, LegendaryActions, Metadata, Proficiencies, RegionalEffect, RegionalEffects,
    Ruleset, SavingThrow, Senses, SkillBonus, Speed, Spell, SpellLevel, Spellcasting,
    SpellsPerPeriod, Trait,
};

use crate::coerce::{
    array_field, as_object, bool_field, get, i64_field, map_field, opt_i64_field, opt_map_field,
    opt_str_field, str_field, str_list,
};
use crate::usage::parse_usage;

fn parse_date(section: &'static str, text: &str) -> Result<NaiveDate, BuildError> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| BuildError::BadDate {
        section,
        text: text.to_string(),
    })
}

pub(crate) fn metadata(raw: &Map<String, Value>) -> Result<Metadata, BuildError> {
    const SECTION: &str = "metadata";
    let map = map_field(SECTION, raw, "metadata")?;
    let date_created = parse_date(SECTION, &str_field(SECTION, map, "date_created")?)?;
    let last_modified = match opt_str_field(SECTION, map, "last_modified")? {
        Some(text) => Some(parse_date(SECTION, &text)?),
        None => None,
    };
    Ok(Metadata {
        name: str_field(SECTION, map, "name")?,
        title: opt_str_field(SECTION, map, "title")?,
        version: str_field(SECTION, map, "version")?,
        date_created,
        last_modified,
        source: opt_str_field(SECTION, map, "source")?,
        tags: str_list(SECTION, map, "tags")?,
    })
}

pub(crate) fn creature_info(
    raw: &Map<String, Value>,
    rules: &Ruleset,
) -> Result<CreatureInfo, BuildError> {
    const SECTION: &str = "creature_info";
    let map = map_field(SECTION, raw, "creature_info")?;

    let size_token = str_field(SECTION, map, "size")?;
    let size = rules
        .vocabularies
        .sizes
        .normalize(&size_token)
        .ok_or(BuildError::UnknownToken {
            section: SECTION,
            token: size_token,
            vocabulary: "size category",
        })?;

    let type_token = str_field(SECTION, map, "type")?;
    let creature_type = rules
        .vocabularies
        .creature_types
        .normalize(&type_token)
        .ok_or(BuildError::UnknownToken {
            section: SECTION,
            token: type_token,
            vocabulary: "creature type",
        })?;

    let cr_map = map_field(SECTION, map, "challenge_rating")?;
    let rating = parse_rating(SECTION, crate::coerce::require(SECTION, cr_map, "rating")?)?;

    Ok(CreatureInfo {
        size,
        creature_type,
        subtypes: str_list(SECTION, map, "subtypes")?,
        alignment: str_field(SECTION, map, "alignment")?.to_lowercase(),
        challenge_rating: ChallengeRating {
            rating,
            xp: i64_field(SECTION, cr_map, "xp")?,
        },
    })
}

fn parse_rating(section: &'static str, value: &Value) -> Result<Cr, BuildError> {
    let parsed = match value {
        Value::String(s) => Cr::parse(s),
        Value::Number(n) => n.as_f64().and_then(Cr::from_f64),
        _ => None,
    };
    parsed.ok_or_else(|| BuildError::BadChallengeRating {
        section,
        text: crate::coerce::kind_of(value),
    })
}

pub(crate) fn core_stats(raw: &Map<String, Value>) -> Result<CoreStats, BuildError> {
    const SECTION: &str = "core_stats";
    let map = map_field(SECTION, raw, "core_stats")?;

    let ac_map = map_field(SECTION, map, "armor_class")?;
    let armor_class = ArmorClass {
        value: i64_field(SECTION, ac_map, "value")?,
        kind: opt_str_field(SECTION, ac_map, "type")?,
    };

    let hp_map = map_field(SECTION, map, "hit_points")?;
    let roll_text = str_field(SECTION, hp_map, "roll")?;
    let roll = DiceRoll::parse(&roll_text).ok_or(BuildError::BadDice {
        section: SECTION,
        text: roll_text,
    })?;
    let hit_points = HitPoints {
        average: i64_field(SECTION, hp_map, "average")?,
        roll,
    };

    let speed_map = map_field(SECTION, map, "speed")?;
    let speed = Speed {
        walk: opt_i64_field(SECTION, speed_map, "walk")?,
        fly: opt_i64_field(SECTION, speed_map, "fly")?,
        swim: opt_i64_field(SECTION, speed_map, "swim")?,
        burrow: opt_i64_field(SECTION, speed_map, "burrow")?,
        climb: opt_i64_field(SECTION, speed_map, "climb")?,
        hover: bool_field(SECTION, speed_map, "hover")?,
        special: opt_str_field(SECTION, speed_map, "special")?,
    };

    Ok(CoreStats { armor_class, hit_points, speed })
}

pub(crate) fn abilities(raw: &Map<String, Value>) -> Result<Abilities, BuildError> {
    const SECTION: &str = "abilities";
    let map = map_field(SECTION, raw, "abilities")?;

    let mut score_of = |ability: Ability| -> Result<AbilityScore, BuildError> {
        let entry = map_field(SECTION, map, ability.name())?;
        Ok(AbilityScore {
            score: i64_field(SECTION, entry, "score")?,
            modifier: i64_field(SECTION, entry, "modifier")?,
        })
    };

    Ok(Abilities {
        strength: score_of(Ability::Strength)?,
        dexterity: score_of(Ability::Dexterity)?,
        constitution: score_of(Ability::Constitution)?,
        intelligence: score_of(Ability::Intelligence)?,
        wisdom: score_of(Ability::Wisdom)?,
        charisma: score_of(Ability::Charisma)?,
    })
}

pub(crate) fn proficiencies(
    raw: &Map<String, Value>,
    rules: &Ruleset,
) -> Result<Proficiencies, BuildError> {
    const SECTION: &str = "proficiencies";
    let Some(map) = opt_map_field(SECTION, raw, "proficiencies")? else {
        return Ok(Proficiencies::default());
    };

    let mut saving_throws = Vec::new();
    if get(map, "saving_throws").is_some() {
        for item in array_field(SECTION, map, "saving_throws")? {
            let entry = as_object(SECTION, "saving_throws", item)?;
            let token = str_field(SECTION, entry, "ability")?;
            let ability = Ability::parse(&token).ok_or(BuildError::UnknownToken {
                section: SECTION,
                token,
                vocabulary: "ability",
            })?;
            saving_throws.push(SavingThrow {
                ability,
                modifier: i64_field(SECTION, entry, "modifier")?,
            });
        }
    }

    let mut skills = Vec::new();
    if get(map, "skills").is_some() {
        for item in array_field(SECTION, map, "skills")? {
            let entry = as_object(SECTION, "skills", item)?;
            let token = str_field(SECTION, entry, "name")?;
            let name = rules
                .vocabularies
                .skills
                .normalize(&token)
                .ok_or(BuildError::UnknownToken {
                    section: SECTION,
                    token,
                    vocabulary: "skill",
                })?;
            skills.push(SkillBonus {
                name,
                modifier: i64_field(SECTION, entry, "modifier")?,
            });
        }
    }

    Ok(Proficiencies { saving_throws, skills })
}

pub(crate) fn defenses(raw: &Map<String, Value>, rules: &Ruleset) -> Result<Defenses, BuildError> {
    const SECTION: &str = "defenses";
    let Some(map) = opt_map_field(SECTION, raw, "defenses")? else {
        return Ok(Defenses::default());
    };

    let damage_vocab = |tokens: Vec<String>| -> Result<Vec<String>, BuildError> {
        tokens
            .into_iter()
            .map(|token| {
                rules
                    .vocabularies
                    .damage_types
                    .normalize(&token)
                    .ok_or(BuildError::UnknownToken {
                        section: SECTION,
                        token,
                        vocabulary: "damage type",
                    })
            })
            .collect()
    };

    let condition_vocab = |tokens: Vec<String>| -> Result<Vec<String>, BuildError> {
        tokens
            .into_iter()
            .map(|token| {
                rules
                    .vocabularies
                    .conditions
                    .normalize(&token)
                    .ok_or(BuildError::UnknownToken {
                        section: SECTION,
                        token,
                        vocabulary: "condition",
                    })
            })
            .collect()
    };

    Ok(Defenses {
        damage_resistances: damage_vocab(str_list(SECTION, map, "damage_resistances")?)?,
        damage_immunities: damage_vocab(str_list(SECTION, map, "damage_immunities")?)?,
        condition_immunities: condition_vocab(str_list(SECTION, map, "condition_immunities")?)?,
    })
}

pub(crate) fn senses(raw: &Map<String, Value>) -> Result<Senses, BuildError> {
    const SECTION: &str = "senses";
    let map = map_field(SECTION, raw, "senses")?;
    Ok(Senses {
        darkvision: opt_i64_field(SECTION, map, "darkvision")?,
        blindsight: opt_i64_field(SECTION, map, "blindsight")?,
        tremorsense: opt_i64_field(SECTION, map, "tremorsense")?,
        truesight: opt_i64_field(SECTION, map, "truesight")?,
        passive_perception: i64_field(SECTION, map, "passive_perception")?,
        special: str_list(SECTION, map, "special")?,
    })
}

pub(crate) fn languages(raw: &Map<String, Value>) -> Result<Languages, BuildError> {
    const SECTION: &str = "languages";
    let Some(map) = opt_map_field(SECTION, raw, "languages")? else {
        // No languages line: render the canonical em-dash entry.
        return Ok(Languages {
            spoken: vec!["—".to_string()],
            telepathy: None,
            special: None,
        });
    };
    let mut spoken = str_list(SECTION, map, "spoken")?;
    if spoken.is_empty() {
        spoken.push("—".to_string());
    }
    Ok(Languages {
        spoken,
        telepathy: opt_i64_field(SECTION, map, "telepathy")?,
        special: opt_str_field(SECTION, map, "special")?,
    })
}

pub(crate) fn traits(raw: &Map<String, Value>) -> Result<Vec<Trait>, BuildError> {
    const SECTION: &str = "traits";
    let Some(value) = get(raw, "traits") else {
        return Ok(Vec::new());
    };
    let items = value.as_array().ok_or(BuildError::TypeMismatch {
        section: SECTION,
        field: "traits".to_string(),
        expected: "a list",
        actual: crate::coerce::kind_of(value),
    })?;
    items
        .iter()
        .map(|item| {
            let entry = as_object(SECTION, "traits", item)?;
            Ok(Trait {
                name: str_field(SECTION, entry, "name")?,
                description: str_field(SECTION, entry, "description")?,
                usage: match get(entry, "usage") {
                    Some(value) => Some(parse_usage(SECTION, value)?),
                    None => None,
                },
            })
        })
        .collect()
}

fn parse_spell_list(
    section: &'static str,
    map: &Map<String, Value>,
    field: &str,
) -> Result<Vec<Spell>, BuildError> {
    let Some(value) = get(map, field) else {
        return Ok(Vec::new());
    };
    let items = value.as_array().ok_or(BuildError::TypeMismatch {
        section,
        field: field.to_string(),
        expected: "a list",
        actual: crate::coerce::kind_of(value),
    })?;
    items
        .iter()
        .map(|item| match item {
            Value::String(name) => Ok(Spell { name: name.trim().to_string(), notes: None }),
            Value::Object(entry) => Ok(Spell {
                name: str_field(section, entry, "name")?,
                notes: opt_str_field(section, entry, "notes")?,
            }),
            other => Err(BuildError::TypeMismatch {
                section,
                field: field.to_string(),
                expected: "a spell name or mapping",
                actual: crate::coerce::kind_of(other),
            }),
        })
        .collect()
}

pub(crate) fn spellcasting(raw: &Map<String, Value>) -> Result<Option<Spellcasting>, BuildError> {
    const SECTION: &str = "spellcasting";
    let Some(map) = opt_map_field(SECTION, raw, "spellcasting")? else {
        return Ok(None);
    };

    let type_token = str_field(SECTION, map, "type")?.to_lowercase().replace(' ', "_");
    let casting_type = match type_token.as_str() {
        "innate" => CastingType::Innate,
        "regular" => CastingType::Regular,
        "pact_magic" => CastingType::PactMagic,
        _ => {
            return Err(BuildError::UnknownToken {
                section: SECTION,
                token: type_token,
                vocabulary: "spellcasting type",
            })
        }
    };

    let ability_token = str_field(SECTION, map, "ability")?;
    let ability = match Ability::parse(&ability_token) {
        Some(Ability::Intelligence) => CastingAbility::Intelligence,
        Some(Ability::Wisdom) => CastingAbility::Wisdom,
        Some(Ability::Charisma) => CastingAbility::Charisma,
        _ => {
            return Err(BuildError::UnknownToken {
                section: SECTION,
                token: ability_token,
                vocabulary: "spellcasting ability",
            })
        }
    };

    let mut spell_slots = Vec::new();
    if get(map, "spell_slots").is_some() {
        for item in array_field(SECTION, map, "spell_slots")? {
            let entry = as_object(SECTION, "spell_slots", item)?;
            spell_slots.push(SpellLevel {
                level: i64_field(SECTION, entry, "level")?,
                slots: i64_field(SECTION, entry, "slots")?,
                spells: parse_spell_list(SECTION, entry, "spells")?,
            });
        }
    }

    let mut limited_use = Vec::new();
    if get(map, "limited_use").is_some() {
        for item in array_field(SECTION, map, "limited_use")? {
            let entry = as_object(SECTION, "limited_use", item)?;
            limited_use.push(SpellsPerPeriod {
                frequency: str_field(SECTION, entry, "frequency")?.to_lowercase(),
                spells: parse_spell_list(SECTION, entry, "spells")?,
            });
        }
    }

    Ok(Some(Spellcasting {
        casting_type,
        ability,
        dc: i64_field(SECTION, map, "dc")?,
        attack_bonus: i64_field(SECTION, map, "attack_bonus")?,
        base_modifier: i64_field(SECTION, map, "base_modifier")?,
        at_will: parse_spell_list(SECTION, map, "at_will")?,
        spell_slots,
        limited_use,
    }))
}

fn parse_attack(
    section: &'static str,
    map: &Map<String, Value>,
) -> Result<Attack, BuildError> {
    let kind = str_field(section, map, "type")?.to_lowercase().replace(' ', "_");
    let reach = || str_field(section, map, "reach");
    let range = || str_field(section, map, "range");
    let shape = match kind.as_str() {
        "melee_weapon" => AttackShape::MeleeWeapon { reach: reach()? },
        "ranged_weapon" => AttackShape::RangedWeapon { range: range()? },
        "melee_spell" => AttackShape::MeleeSpell { reach: reach()? },
        "ranged_spell" => AttackShape::RangedSpell { range: range()? },
        "melee_or_ranged_weapon" => AttackShape::MeleeOrRangedWeapon {
            reach: reach()?,
            range: range()?,
        },
        _ => {
            return Err(BuildError::UnknownToken {
                section,
                token: kind,
                vocabulary: "attack type",
            })
        }
    };

    let ability_used = match opt_str_field(section, map, "ability_used")? {
        None => None,
        Some(token) => Some(Ability::parse(&token).ok_or(BuildError::UnknownToken {
            section,
            token,
            vocabulary: "ability",
        })?),
    };

    Ok(Attack {
        shape,
        bonus: i64_field(section, map, "bonus")?,
        ability_used,
        magical_bonus: opt_i64_field(section, map, "magical_bonus")?.unwrap_or(0),
        is_finesse: bool_field(section, map, "is_finesse")?,
    })
}

fn parse_hit(section: &'static str, map: &Map<String, Value>) -> Result<Hit, BuildError> {
    Ok(Hit {
        damage: str_field(section, map, "damage")?,
        two_handed_damage: opt_str_field(section, map, "two_handed_damage")?,
        damage_type: str_field(section, map, "damage_type")?.to_lowercase(),
        additional_effects: opt_str_field(section, map, "additional_effects")?,
    })
}

fn parse_action(section: &'static str, item: &Value) -> Result<Action, BuildError> {
    let entry = as_object(section, "actions", item)?;
    Ok(Action {
        name: str_field(section, entry, "name")?,
        description: str_field(section, entry, "description")?,
        attack: match opt_map_field(section, entry, "attack")? {
            Some(map) => Some(parse_attack(section, map)?),
            None => None,
        },
        hit: match opt_map_field(section, entry, "hit")? {
            Some(map) => Some(parse_hit(section, map)?),
            None => None,
        },
        usage: match get(entry, "usage") {
            Some(value) => Some(parse_usage(section, value)?),
            None => None,
        },
    })
}

pub(crate) fn actions(raw: &Map<String, Value>) -> Result<Actions, BuildError> {
    const SECTION: &str = "actions";
    let map = map_field(SECTION, raw, "actions")?;

    let list = |field: &str, required: bool| -> Result<Vec<Action>, BuildError> {
        if !required && get(map, field).is_none() {
            return Ok(Vec::new());
        }
        array_field(SECTION, map, field)?
            .iter()
            .map(|item| parse_action(SECTION, item))
            .collect()
    };

    Ok(Actions {
        standard: list("standard", true)?,
        bonus_actions: list("bonus_actions", false)?,
        reactions: list("reactions", false)?,
    })
}

pub(crate) fn legendary_actions(
    raw: &Map<String, Value>,
) -> Result<Option<LegendaryActions>, BuildError> {
    const SECTION: &str = "legendary_actions";
    let Some(map) = opt_map_field(SECTION, raw, "legendary_actions")? else {
        return Ok(None);
    };

    let actions = array_field(SECTION, map, "actions")?
        .iter()
        .map(|item| {
            let entry = as_object(SECTION, "actions", item)?;
            Ok(LegendaryAction {
                name: str_field(SECTION, entry, "name")?,
                description: str_field(SECTION, entry, "description")?,
                cost: opt_i64_field(SECTION, entry, "cost")?.unwrap_or(1),
                usage: match get(entry, "usage") {
                    Some(value) => Some(parse_usage(SECTION, value)?),
                    None => None,
                },
            })
        })
        .collect::<Result<Vec<_>, BuildError>>()?;

    Ok(Some(LegendaryActions {
        slots_per_round: i64_field(SECTION, map, "slots_per_round")?,
        description: str_field(SECTION, map, "description")?,
        actions,
    }))
}

pub(crate) fn lair_actions(raw: &Map<String, Value>) -> Result<Option<LairActions>, BuildError> {
    const SECTION: &str = "lair_actions";
    let Some(map) = opt_map_field(SECTION, raw, "lair_actions")? else {
        return Ok(None);
    };

    let actions = array_field(SECTION, map, "actions")?
        .iter()
        .map(|item| {
            let entry = as_object(SECTION, "actions", item)?;
            Ok(LairAction {
                name: str_field(SECTION, entry, "name")?,
                description: str_field(SECTION, entry, "description")?,
                usage: match get(entry, "usage") {
                    Some(value) => Some(parse_usage(SECTION, value)?),
                    None => None,
                },
            })
        })
        .collect::<Result<Vec<_>, BuildError>>()?;

    Ok(Some(LairActions {
        initiative_count: i64_field(SECTION, map, "initiative_count")?,
        description: str_field(SECTION, map, "description")?,
        actions,
    }))
}

pub(crate) fn regional_effects(
    raw: &Map<String, Value>,
) -> Result<Option<RegionalEffects>, BuildError> {
    const SECTION: &str = "regional_effects";
    let Some(map) = opt_map_field(SECTION, raw, "regional_effects")? else {
        return Ok(None);
    };

    let effects = array_field(SECTION, map, "effects")?
        .iter()
        .map(|item| {
            let entry = as_object(SECTION, "effects", item)?;
            Ok(RegionalEffect {
                name: str_field(SECTION, entry, "name")?,
                description: str_field(SECTION, entry, "description")?,
                mechanics: get(entry, "mechanics").cloned(),
            })
        })
        .collect::<Result<Vec<_>, BuildError>>()?;

    Ok(Some(RegionalEffects {
        description: str_field(SECTION, map, "description")?,
        effects,
    }))
}

pub(crate) fn description(raw: &Map<String, Value>) -> Result<Description, BuildError> {
    const SECTION: &str = "description";
    let Some(map) = opt_map_field(SECTION, raw, "description")? else {
        return Ok(Description::default());
    };
    Ok(Description {
        appearance: opt_str_field(SECTION, map, "appearance")?,
        personality: opt_str_field(SECTION, map, "personality")?,
        background: opt_str_field(SECTION, map, "background")?,
        tactics: opt_str_field(SECTION, map, "tactics")?,
    })
}
