//! Builder integration: a realistic section bag maps to a fully typed
//! record, and structural prerequisites fail loudly.

use serde_json::{json, Value};
use statforge_builder::build_from_value;
use statforge_core::{Ability, AttackShape, BuildError, CastingType, Cr, Ruleset, Usage};

fn young_dragon_bag() -> Value {
    json!({
        "metadata": {
            "name": "Young Verdant Dragon",
            "version": "1.0",
            "date_created": "2024-03-18",
            "source": "monsters.docx",
            "tags": ["dragon", "forest"]
        },
        "creature_info": {
            "size": "Large",
            "type": "Dragon",
            "subtypes": [],
            "alignment": "Lawful Evil",
            "challenge_rating": { "rating": 8, "xp": 3900 }
        },
        "core_stats": {
            "armor_class": { "value": 18, "type": "natural armor" },
            "hit_points": { "average": 127, "roll": "15d10 + 45" },
            "speed": { "walk": 40, "fly": 80, "swim": 40 }
        },
        "abilities": {
            "strength":     { "score": 19, "modifier": 4 },
            "dexterity":    { "score": 14, "modifier": 2 },
            "constitution": { "score": 17, "modifier": 3 },
            "intelligence": { "score": 12, "modifier": 1 },
            "wisdom":       { "score": 13, "modifier": 1 },
            "charisma":     { "score": 15, "modifier": 2 }
        },
        "proficiencies": {
            "saving_throws": [
                { "ability": "dex", "modifier": 5 },
                { "ability": "Constitution", "modifier": 6 }
            ],
            "skills": [
                { "name": "Perception", "modifier": 7 },
                { "name": "stealth", "modifier": 5 }
            ]
        },
        "defenses": {
            "damage_immunities": ["Poison"],
            "condition_immunities": ["Poisoned"]
        },
        "senses": {
            "blindsight": 30,
            "darkvision": 120,
            "passive_perception": 11
        },
        "languages": { "spoken": ["Common", "Draconic"] },
        "traits": [
            {
                "name": "Amphibious",
                "description": "The dragon can breathe air and water."
            }
        ],
        "actions": {
            "standard": [
                {
                    "name": "Bite",
                    "description": "Melee Weapon Attack: +7 to hit, reach 10 ft.",
                    "attack": {
                        "type": "melee_weapon",
                        "reach": "10 ft.",
                        "bonus": "+7",
                        "ability_used": "strength"
                    },
                    "hit": {
                        "damage": "2d10 + 4",
                        "damage_type": "Piercing"
                    }
                },
                {
                    "name": "Poison Breath",
                    "description": "The dragon exhales poisonous gas.",
                    "usage": "Recharge 5-6"
                }
            ]
        },
        "description": {
            "appearance": "Scales the color of deep moss cover its flanks."
        }
    })
}

#[test]
fn builds_a_complete_record() {
    let rules = Ruleset::default();
    let record = build_from_value(&young_dragon_bag(), &rules).unwrap();

    assert_eq!(record.metadata.name, "Young Verdant Dragon");
    assert_eq!(record.info.size, "large");
    assert_eq!(record.info.creature_type, "dragon");
    assert_eq!(record.info.alignment, "lawful evil");
    assert_eq!(record.info.challenge_rating.rating, Cr::Whole(8));
    assert_eq!(record.stats.hit_points.roll.average(), 127);
    assert_eq!(record.abilities.strength.score, 19);

    // Coerced "+7" string and abbreviation normalization.
    assert_eq!(record.proficiencies.saving_throws[0].ability, Ability::Dexterity);
    assert_eq!(record.proficiencies.skills[0].name, "perception");
    let bite = &record.actions.standard[0];
    let attack = bite.attack.as_ref().unwrap();
    assert_eq!(attack.bonus, 7);
    assert_eq!(attack.shape, AttackShape::MeleeWeapon { reach: "10 ft.".into() });
    assert_eq!(bite.hit.as_ref().unwrap().damage_type, "piercing");

    // Free-text usage marker becomes a typed recharge.
    assert_eq!(
        record.actions.standard[1].usage,
        Some(Usage::Recharge { value: None, range: Some(vec![5, 6]) })
    );

    // Absent optional sections fill with explicit empties.
    assert!(record.spellcasting.is_none());
    assert!(record.legendary_actions.is_none());
    assert!(record.defenses.damage_resistances.is_empty());
    assert_eq!(record.description.personality, None);
}

#[test]
fn spellcasting_section_maps_types_and_groups() {
    let rules = Ruleset::default();
    let mut bag = young_dragon_bag();
    bag["spellcasting"] = json!({
        "type": "Innate",
        "ability": "Charisma",
        "dc": 13,
        "attack_bonus": 5,
        "base_modifier": 2,
        "at_will": ["detect magic", { "name": "entangle", "notes": "self only" }],
        "limited_use": [
            { "frequency": "3/Day", "spells": ["plant growth"] }
        ]
    });

    let record = build_from_value(&bag, &rules).unwrap();
    let casting = record.spellcasting.unwrap();
    assert_eq!(casting.casting_type, CastingType::Innate);
    assert_eq!(casting.at_will.len(), 2);
    assert_eq!(casting.at_will[1].notes.as_deref(), Some("self only"));
    assert_eq!(casting.limited_use[0].frequency, "3/day");
}

#[test]
fn missing_required_section_fails() {
    let rules = Ruleset::default();
    let mut bag = young_dragon_bag();
    bag.as_object_mut().unwrap().remove("abilities");

    match build_from_value(&bag, &rules) {
        Err(BuildError::MissingSection(section)) => assert_eq!(section, "abilities"),
        other => panic!("expected MissingSection, got {other:?}"),
    }
}

#[test]
fn unknown_vocabulary_token_fails() {
    let rules = Ruleset::default();
    let mut bag = young_dragon_bag();
    bag["creature_info"]["type"] = json!("Kaiju");

    match build_from_value(&bag, &rules) {
        Err(BuildError::UnknownToken { token, vocabulary, .. }) => {
            assert_eq!(token, "Kaiju");
            assert_eq!(vocabulary, "creature type");
        }
        other => panic!("expected UnknownToken, got {other:?}"),
    }
}

#[test]
fn bad_dice_expression_fails() {
    let rules = Ruleset::default();
    let mut bag = young_dragon_bag();
    bag["core_stats"]["hit_points"]["roll"] = json!("fifteen d10");

    assert!(matches!(
        build_from_value(&bag, &rules),
        Err(BuildError::BadDice { section: "core_stats", .. })
    ));
}

#[test]
fn bad_challenge_rating_fails() {
    let rules = Ruleset::default();
    let mut bag = young_dragon_bag();
    bag["creature_info"]["challenge_rating"]["rating"] = json!("2/3");

    assert!(matches!(
        build_from_value(&bag, &rules),
        Err(BuildError::BadChallengeRating { .. })
    ));
}

#[test]
fn yaml_bags_build_identically() {
    // Extractors hand over YAML just as often as JSON; the bag shape is
    // the contract, not the syntax.
    let yaml = serde_yaml::to_string(&young_dragon_bag()).unwrap();
    let from_yaml: Value = serde_yaml::from_str(&yaml).unwrap();
    let rules = Ruleset::default();
    assert_eq!(
        build_from_value(&from_yaml, &rules).unwrap(),
        build_from_value(&young_dragon_bag(), &rules).unwrap()
    );
}
