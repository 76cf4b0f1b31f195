//! Full-pipeline validation: bags built by `statforge-builder` run
//! through both engines, and each arithmetic rule fires on exactly the
//! field that breaks it.

use serde_json::{json, Value};
use statforge_builder::build_from_value;
use statforge_core::{CreatureRecord, Report, RuleId, Ruleset, Severity, Violation};
use statforge_validate::validate_record;

/// CR 3 hag, arithmetically consistent throughout: proficiency +2,
/// saves and skills derived from the printed modifiers, 11d8 + 33
/// averaging 82.
fn moor_hag_bag() -> Value {
    json!({
        "metadata": {
            "name": "Moor Hag",
            "version": "1.2",
            "date_created": "2023-11-02",
            "source": "monsters.docx",
            "tags": ["fey", "swamp"]
        },
        "creature_info": {
            "size": "Medium",
            "type": "Fey",
            "alignment": "chaotic evil",
            "challenge_rating": { "rating": 3, "xp": 700 }
        },
        "core_stats": {
            "armor_class": { "value": 15, "type": "natural armor" },
            "hit_points": { "average": 82, "roll": "11d8 + 33" },
            "speed": { "walk": 30, "swim": 30 }
        },
        "abilities": {
            "strength":     { "score": 18, "modifier": 4 },
            "dexterity":    { "score": 12, "modifier": 1 },
            "constitution": { "score": 16, "modifier": 3 },
            "intelligence": { "score": 13, "modifier": 1 },
            "wisdom":       { "score": 14, "modifier": 2 },
            "charisma":     { "score": 14, "modifier": 2 }
        },
        "proficiencies": {
            "saving_throws": [
                { "ability": "constitution", "modifier": 5 }
            ],
            "skills": [
                { "name": "perception", "modifier": 4 },
                { "name": "stealth", "modifier": 3 }
            ]
        },
        "defenses": {
            "damage_resistances": ["cold"]
        },
        "senses": {
            "darkvision": 60,
            "passive_perception": 12
        },
        "languages": { "spoken": ["Common", "Sylvan"] },
        "actions": {
            "standard": [
                {
                    "name": "Claws",
                    "description": "Melee Weapon Attack: +6 to hit, reach 5 ft.",
                    "attack": {
                        "type": "melee_weapon",
                        "reach": "5 ft.",
                        "bonus": 6,
                        "ability_used": "strength"
                    },
                    "hit": {
                        "damage": "2d8 + 4",
                        "damage_type": "slashing"
                    }
                },
                {
                    "name": "Noxious Breath",
                    "description": "The hag exhales a cloud of marsh gas.",
                    "usage": "Recharge 5-6"
                }
            ]
        },
        "description": {
            "appearance": "A stooped figure draped in waterlogged rags."
        }
    })
}

/// The hag's innate spellcasting block, consistent with proficiency +2:
/// DC 12 = 8 + 2 + 2, attack bonus 4 = 2 + 2.
fn hag_spellcasting() -> Value {
    json!({
        "type": "innate",
        "ability": "charisma",
        "dc": 12,
        "attack_bonus": 4,
        "base_modifier": 2,
        "at_will": ["minor illusion"]
    })
}

fn build(bag: &Value) -> CreatureRecord {
    build_from_value(bag, &Ruleset::default()).expect("fixture bag must build")
}

fn run(bag: &Value) -> Report {
    validate_record(&build(bag), &Ruleset::default())
}

/// The single finding in a report, asserting there is exactly one.
fn sole_violation(report: &Report) -> &Violation {
    assert_eq!(
        report.len(),
        1,
        "expected exactly one finding, got: {:?}",
        report.violations()
    );
    &report.violations()[0]
}

#[test]
fn consistent_record_yields_empty_report() {
    let record = build(&moor_hag_bag());
    let rules = Ruleset::default();

    let report = validate_record(&record, &rules);
    assert!(report.is_empty(), "unexpected findings: {:?}", report.violations());

    // Validation reads only; a second pass agrees with the first.
    assert!(validate_record(&record, &rules).is_empty());
}

#[test]
fn miscomputed_ability_modifier_is_flagged() {
    let mut bag = moor_hag_bag();
    bag["abilities"]["intelligence"]["modifier"] = json!(2);

    let v = sole_violation(&run(&bag)).clone();
    assert_eq!(v.rule, RuleId::AbilityModifierFormula);
    assert_eq!(v.path, "abilities.intelligence.modifier");
    assert_eq!(v.severity, Severity::Error);
    assert!(v.expected.contains('1'), "expected text: {}", v.expected);
}

#[test]
fn saving_throw_must_equal_modifier_plus_proficiency() {
    let mut bag = moor_hag_bag();
    bag["proficiencies"]["saving_throws"][0]["modifier"] = json!(7);

    let v = sole_violation(&run(&bag)).clone();
    assert_eq!(v.rule, RuleId::SavingThrowBonus);
    assert_eq!(v.path, "proficiencies.saving_throws[0].modifier");
}

#[test]
fn skill_bonus_allows_expertise_but_not_more() {
    // Wisdom +2, proficiency +2: expertise tops out at 6.
    let mut bag = moor_hag_bag();
    bag["proficiencies"]["skills"][0]["modifier"] = json!(6);
    assert!(run(&bag).is_empty());

    bag["proficiencies"]["skills"][0]["modifier"] = json!(7);
    let v = sole_violation(&run(&bag)).clone();
    assert_eq!(v.rule, RuleId::SkillBonus);
    assert_eq!(v.path, "proficiencies.skills[0].modifier");
}

#[test]
fn weapon_attack_bonus_outside_range_is_flagged() {
    // Strength +4 and proficiency +2 allow 6..=9.
    let mut bag = moor_hag_bag();
    bag["actions"]["standard"][0]["attack"]["bonus"] = json!(10);

    let v = sole_violation(&run(&bag)).clone();
    assert_eq!(v.rule, RuleId::AttackBonusRange);
    assert_eq!(v.path, "actions.standard[0].attack.bonus");
}

#[test]
fn non_finesse_melee_attack_cannot_use_dexterity() {
    let mut bag = moor_hag_bag();
    bag["actions"]["standard"][0]["attack"]["ability_used"] = json!("dexterity");
    // Keep the bonus inside the dexterity-anchored range so only the
    // ability rule fires.
    bag["actions"]["standard"][0]["attack"]["bonus"] = json!(4);

    let v = sole_violation(&run(&bag)).clone();
    assert_eq!(v.rule, RuleId::AttackAbility);
    assert_eq!(v.path, "actions.standard[0].attack.ability_used");
}

#[test]
fn finesse_opens_dexterity_for_melee() {
    let mut bag = moor_hag_bag();
    bag["actions"]["standard"][0]["attack"]["ability_used"] = json!("dexterity");
    bag["actions"]["standard"][0]["attack"]["is_finesse"] = json!(true);
    bag["actions"]["standard"][0]["attack"]["bonus"] = json!(3);

    assert!(run(&bag).is_empty());
}

#[test]
fn spell_save_dc_and_attack_bonus_formulas() {
    let mut bag = moor_hag_bag();
    bag["spellcasting"] = hag_spellcasting();
    assert!(run(&bag).is_empty());

    bag["spellcasting"]["dc"] = json!(15);
    let v = sole_violation(&run(&bag)).clone();
    assert_eq!(v.rule, RuleId::SpellSaveDc);
    assert_eq!(v.path, "spellcasting.dc");

    bag["spellcasting"]["dc"] = json!(12);
    bag["spellcasting"]["attack_bonus"] = json!(9);
    let v = sole_violation(&run(&bag)).clone();
    assert_eq!(v.rule, RuleId::SpellAttackBonus);
    assert_eq!(v.path, "spellcasting.attack_bonus");
}

#[test]
fn spell_attack_actions_must_quote_the_block_bonus() {
    let mut bag = moor_hag_bag();
    bag["spellcasting"] = hag_spellcasting();
    bag["actions"]["standard"].as_array_mut().unwrap().push(json!({
        "name": "Withering Bolt",
        "description": "Ranged Spell Attack: +4 to hit, range 120 ft.",
        "attack": { "type": "ranged_spell", "range": "120 ft.", "bonus": 4 },
        "hit": { "damage": "3d8", "damage_type": "necrotic" }
    }));
    assert!(run(&bag).is_empty());

    bag["actions"]["standard"][2]["attack"]["bonus"] = json!(5);
    let v = sole_violation(&run(&bag)).clone();
    assert_eq!(v.rule, RuleId::SpellAttackConsistency);
    assert_eq!(v.path, "actions.standard[2].attack.bonus");
    assert!(v.expected.starts_with('4'), "expected text: {}", v.expected);
}

#[test]
fn hit_point_average_must_match_the_roll() {
    let mut bag = moor_hag_bag();
    bag["core_stats"]["hit_points"]["average"] = json!(80);

    let v = sole_violation(&run(&bag)).clone();
    assert_eq!(v.rule, RuleId::HitPointAverage);
    assert_eq!(v.path, "core_stats.hit_points.average");
    assert!(v.expected.contains("82"), "expected text: {}", v.expected);
}

#[test]
fn passive_perception_is_ten_plus_wisdom_modifier() {
    let mut bag = moor_hag_bag();
    bag["senses"]["passive_perception"] = json!(14);

    let v = sole_violation(&run(&bag)).clone();
    assert_eq!(v.rule, RuleId::PassivePerception);
    assert_eq!(v.path, "senses.passive_perception");
}

#[test]
fn xp_must_match_the_rating_table() {
    let mut bag = moor_hag_bag();
    bag["creature_info"]["challenge_rating"]["xp"] = json!(1000);

    let v = sole_violation(&run(&bag)).clone();
    assert_eq!(v.rule, RuleId::ChallengeRatingXp);
    assert_eq!(v.path, "creature_info.challenge_rating.xp");
    assert!(v.expected.contains("700"), "expected text: {}", v.expected);
}

#[test]
fn recharge_ranges_must_be_consecutive_and_ascending() {
    let mut bag = moor_hag_bag();

    bag["actions"]["standard"][1]["usage"] = json!({ "type": "recharge", "range": [4, 5, 6] });
    assert!(run(&bag).is_empty());

    for bad in [json!([4, 6]), json!([6, 5])] {
        bag["actions"]["standard"][1]["usage"] = json!({ "type": "recharge", "range": bad });
        let v = sole_violation(&run(&bag)).clone();
        assert_eq!(v.rule, RuleId::RechargeRange);
        assert_eq!(v.path, "actions.standard[1].usage.range");
    }
}

#[test]
fn recharge_values_outside_the_die_are_structural_errors() {
    let mut bag = moor_hag_bag();
    bag["actions"]["standard"][1]["usage"] =
        json!({ "type": "recharge", "range": [1, 2, 3, 4, 5, 6, 7] });

    let report = run(&bag);
    let rules: Vec<RuleId> = report.violations().iter().map(|v| v.rule).collect();
    // Seven entries breach cardinality, the 7 breaches the face range,
    // and the cross rule rejects the range as a whole.
    assert!(rules.contains(&RuleId::ArrayCardinality), "findings: {rules:?}");
    assert!(rules.contains(&RuleId::NumericRange), "findings: {rules:?}");
    assert!(rules.contains(&RuleId::RechargeRange), "findings: {rules:?}");
}

#[test]
fn recharge_duplicate_tail_is_rejected() {
    // Every face is on the die, but the list is over-length and the
    // trailing duplicate breaks the ascending run.
    let mut bag = moor_hag_bag();
    bag["actions"]["standard"][1]["usage"] =
        json!({ "type": "recharge", "range": [1, 2, 3, 4, 5, 6, 1] });

    let report = run(&bag);
    let rules: Vec<RuleId> = report.violations().iter().map(|v| v.rule).collect();
    assert!(rules.contains(&RuleId::ArrayCardinality), "findings: {rules:?}");
    assert!(rules.contains(&RuleId::RechargeRange), "findings: {rules:?}");
    assert!(!rules.contains(&RuleId::NumericRange), "findings: {rules:?}");
}

#[test]
fn recharge_value_is_bounded_even_alongside_a_range() {
    let mut bag = moor_hag_bag();
    bag["actions"]["standard"][1]["usage"] =
        json!({ "type": "recharge", "value": 7, "range": [5, 6] });

    let v = sole_violation(&run(&bag)).clone();
    assert_eq!(v.rule, RuleId::NumericRange);
    assert_eq!(v.path, "actions.standard[1].usage.value");
}

#[test]
fn lair_actions_and_regional_effects_pair_both_ways() {
    let lair = json!({
        "initiative_count": 20,
        "description": "On initiative count 20, the hag takes a lair action.",
        "actions": [
            { "name": "Grasping Mud", "description": "The ground becomes difficult terrain." }
        ]
    });
    let regional = json!({
        "description": "The land around the lair warps over time.",
        "effects": [
            { "name": "Sour Water", "description": "Water within 1 mile tastes brackish." }
        ]
    });

    let mut bag = moor_hag_bag();
    bag["lair_actions"] = lair.clone();
    let v = sole_violation(&run(&bag)).clone();
    assert_eq!(v.rule, RuleId::RequiredSection);
    assert_eq!(v.path, "regional_effects");

    let mut bag = moor_hag_bag();
    bag["regional_effects"] = regional.clone();
    let v = sole_violation(&run(&bag)).clone();
    assert_eq!(v.rule, RuleId::RequiredSection);
    assert_eq!(v.path, "lair_actions");

    let mut bag = moor_hag_bag();
    bag["lair_actions"] = lair;
    bag["regional_effects"] = regional;
    assert!(run(&bag).is_empty());
}

#[test]
fn legendary_action_cost_is_bounded() {
    let mut bag = moor_hag_bag();
    bag["legendary_actions"] = json!({
        "slots_per_round": 3,
        "description": "The hag can take 3 legendary actions.",
        "actions": [
            { "name": "Cackle", "description": "Each enemy within 30 feet is rattled.", "cost": 4 }
        ]
    });

    let v = sole_violation(&run(&bag)).clone();
    assert_eq!(v.rule, RuleId::NumericRange);
    assert_eq!(v.path, "legendary_actions.actions[0].cost");
}

#[test]
fn structural_bounds_and_grammars() {
    let mut bag = moor_hag_bag();
    bag["metadata"]["name"] = json!("N".repeat(101));
    let v = sole_violation(&run(&bag)).clone();
    assert_eq!(v.rule, RuleId::StringLength);
    assert_eq!(v.path, "metadata.name");

    let mut bag = moor_hag_bag();
    bag["metadata"]["date_created"] = json!("2999-01-01");
    let v = sole_violation(&run(&bag)).clone();
    assert_eq!(v.rule, RuleId::DateInFuture);

    let mut bag = moor_hag_bag();
    bag["core_stats"]["speed"]["walk"] = json!(43);
    let v = sole_violation(&run(&bag)).clone();
    assert_eq!(v.rule, RuleId::MultipleOf);
    assert_eq!(v.path, "core_stats.speed.walk");

    let mut bag = moor_hag_bag();
    bag["actions"]["standard"][0]["attack"]["magical_bonus"] = json!(5);
    let v = sole_violation(&run(&bag)).clone();
    assert_eq!(v.rule, RuleId::NumericRange);
    assert_eq!(v.path, "actions.standard[0].attack.magical_bonus");
}

#[test]
fn long_description_warns_without_failing() {
    let mut bag = moor_hag_bag();
    bag["description"]["background"] = json!("x".repeat(1_900));

    let report = run(&bag);
    assert!(!report.has_errors());
    let v = sole_violation(&report).clone();
    assert_eq!(v.severity, Severity::Warning);
    assert_eq!(v.rule, RuleId::StringLength);
    assert_eq!(v.path, "description.background");
}
