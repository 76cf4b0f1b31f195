//! # Cross-Field Consistency Engine
//!
//! Rules relating two or more fields through the game's arithmetic:
//! ability modifiers, proficiency-derived bonuses, spellcasting
//! formulas, hit-point averages, challenge-rating XP, recharge ranges,
//! and archetype section pairing. Every rule reads the record and the
//! [`Ruleset`]; none mutates either.
//!
//! The proficiency bonus is resolved once per run from the challenge
//! rating and threaded through every bonus rule, so a wrong rating
//! shows up as a cluster of downstream findings rather than a crash.

use statforge_core::{
    governing_ability, Ability, AbilityScore, CreatureRecord, FieldPath, Report, RuleId, Ruleset,
    Usage,
};

/// Weapon attacks may add up to this on top of ability + proficiency
/// (magic weapons, fighting styles).
const ATTACK_BONUS_SLACK: i64 = 3;

/// Checks the derived-value rules a stat block must satisfy.
pub struct CrossValidator<'a> {
    rules: &'a Ruleset,
}

impl<'a> CrossValidator<'a> {
    pub fn new(rules: &'a Ruleset) -> Self {
        Self { rules }
    }

    /// Collect every cross-field violation in the record.
    pub fn validate(&self, record: &CreatureRecord) -> Report {
        let mut report = Report::new();
        let pb = self.rules.proficiency_bonus(&record.info.challenge_rating.rating);

        self.check_ability_modifiers(record, &mut report);
        self.check_saving_throws(record, pb, &mut report);
        self.check_skills(record, pb, &mut report);
        self.check_attacks(record, pb, &mut report);
        self.check_spellcasting(record, pb, &mut report);
        self.check_hit_points(record, &mut report);
        self.check_passive_perception(record, &mut report);
        self.check_challenge_rating(record, &mut report);
        self.check_recharges(record, &mut report);
        self.check_section_pairing(record, &mut report);
        report
    }

    fn check_ability_modifiers(&self, record: &CreatureRecord, report: &mut Report) {
        let path = FieldPath::root("abilities");
        for (ability, score) in record.abilities.iter() {
            let expected = AbilityScore::expected_modifier(score.score);
            if score.modifier != expected {
                report.error(
                    &path.field(ability.name()).field("modifier"),
                    RuleId::AbilityModifierFormula,
                    format!("{expected} for score {}", score.score),
                    score.modifier.to_string(),
                );
            }
        }
    }

    fn check_saving_throws(&self, record: &CreatureRecord, pb: i64, report: &mut Report) {
        let path = FieldPath::root("proficiencies").field("saving_throws");
        for (i, save) in record.proficiencies.saving_throws.iter().enumerate() {
            let expected = record.abilities.get(save.ability).modifier + pb;
            if save.modifier != expected {
                report.error(
                    &path.index(i).field("modifier"),
                    RuleId::SavingThrowBonus,
                    format!("{expected} ({} modifier + proficiency {pb})", save.ability.name()),
                    save.modifier.to_string(),
                );
            }
        }
    }

    /// Skill bonuses must land in [modifier + pb, modifier + 2 * pb]:
    /// the upper end is expertise. Skills with no governing ability in
    /// the standard list are skipped; the structural validator already
    /// flagged the unknown token.
    fn check_skills(&self, record: &CreatureRecord, pb: i64, report: &mut Report) {
        let path = FieldPath::root("proficiencies").field("skills");
        for (i, skill) in record.proficiencies.skills.iter().enumerate() {
            let Some(ability) = governing_ability(&skill.name) else { continue };
            let modifier = record.abilities.get(ability).modifier;
            let low = modifier + pb;
            let high = modifier + 2 * pb;
            if !(low..=high).contains(&skill.modifier) {
                report.error(
                    &path.index(i).field("modifier"),
                    RuleId::SkillBonus,
                    format!("{low}..={high} ({} modifier + proficiency, up to expertise)", ability.name()),
                    skill.modifier.to_string(),
                );
            }
        }
    }

    fn check_attacks(&self, record: &CreatureRecord, pb: i64, report: &mut Report) {
        for (path, action) in record.all_actions() {
            let Some(attack) = &action.attack else { continue };
            if attack.shape.is_spell() {
                // Spell attacks are reconciled against the spellcasting
                // block, not a weapon ability.
                continue;
            }
            let attack_path = path.field("attack");
            let allowed = allowed_abilities(attack.shape.is_melee(), attack.is_finesse);

            let anchor = match attack.ability_used {
                Some(used) if !allowed.contains(&used) => {
                    report.error(
                        &attack_path.field("ability_used"),
                        RuleId::AttackAbility,
                        format!("one of {}", ability_list(allowed)),
                        used.name(),
                    );
                    used
                }
                Some(used) => used,
                // Unstated ability: give the attack the benefit of the
                // highest allowed modifier.
                None => *allowed
                    .iter()
                    .max_by_key(|a| record.abilities.get(**a).modifier)
                    .unwrap_or(&Ability::Strength),
            };

            let modifier = record.abilities.get(anchor).modifier;
            let low = modifier + pb;
            let high = modifier + pb + ATTACK_BONUS_SLACK;
            if !(low..=high).contains(&attack.bonus) {
                report.error(
                    &attack_path.field("bonus"),
                    RuleId::AttackBonusRange,
                    format!("{low}..={high} ({} modifier + proficiency {pb})", anchor.name()),
                    attack.bonus.to_string(),
                );
            }
        }
    }

    fn check_spellcasting(&self, record: &CreatureRecord, pb: i64, report: &mut Report) {
        let Some(casting) = &record.spellcasting else {
            // No spellcasting block: spell-shaped attacks have no
            // formula to reconcile against, so nothing fires here.
            return;
        };
        let path = FieldPath::root("spellcasting");

        let expected_dc = 8 + pb + casting.base_modifier;
        if casting.dc != expected_dc {
            report.error(
                &path.field("dc"),
                RuleId::SpellSaveDc,
                format!("{expected_dc} (8 + proficiency {pb} + casting modifier {})", casting.base_modifier),
                casting.dc.to_string(),
            );
        }

        let expected_attack = pb + casting.base_modifier;
        if casting.attack_bonus != expected_attack {
            report.error(
                &path.field("attack_bonus"),
                RuleId::SpellAttackBonus,
                format!("{expected_attack} (proficiency {pb} + casting modifier {})", casting.base_modifier),
                casting.attack_bonus.to_string(),
            );
        }

        // Every spell attack printed in the action lists must quote the
        // block's attack bonus. One finding per offending action.
        for (action_path, action) in record.all_actions() {
            let Some(attack) = &action.attack else { continue };
            if attack.shape.is_spell() && attack.bonus != casting.attack_bonus {
                report.error(
                    &action_path.field("attack").field("bonus"),
                    RuleId::SpellAttackConsistency,
                    format!("{} (spellcasting attack bonus)", casting.attack_bonus),
                    attack.bonus.to_string(),
                );
            }
        }
    }

    fn check_hit_points(&self, record: &CreatureRecord, report: &mut Report) {
        let hp = &record.stats.hit_points;
        let expected = hp.roll.average();
        if hp.average != expected {
            report.error(
                &FieldPath::root("core_stats").field("hit_points").field("average"),
                RuleId::HitPointAverage,
                format!("{expected} (average of {})", hp.roll),
                hp.average.to_string(),
            );
        }
    }

    fn check_passive_perception(&self, record: &CreatureRecord, report: &mut Report) {
        let wis = record.abilities.get(Ability::Wisdom).modifier;
        let expected = 10 + wis;
        if record.senses.passive_perception != expected {
            report.error(
                &FieldPath::root("senses").field("passive_perception"),
                RuleId::PassivePerception,
                format!("{expected} (10 + wisdom modifier {wis})"),
                record.senses.passive_perception.to_string(),
            );
        }
    }

    fn check_challenge_rating(&self, record: &CreatureRecord, report: &mut Report) {
        let cr = &record.info.challenge_rating;
        let path = FieldPath::root("creature_info").field("challenge_rating").field("xp");
        match self.rules.xp_for(&cr.rating) {
            Some(expected) if cr.xp != expected => {
                report.error(
                    &path,
                    RuleId::ChallengeRatingXp,
                    format!("{expected} for CR {}", cr.rating.as_key()),
                    cr.xp.to_string(),
                );
            }
            Some(_) => {}
            None => {
                report.error(
                    &path,
                    RuleId::ChallengeRatingXp,
                    "a rating present in the XP table",
                    format!("CR {}", cr.rating.as_key()),
                );
            }
        }
    }

    /// A recharge range must be sorted ascending, strictly consecutive,
    /// and within the d6 faces. "Recharge 5–6" is [5, 6]; [4, 6] has a
    /// gap and [6, 5] is out of order.
    fn check_recharges(&self, record: &CreatureRecord, report: &mut Report) {
        for (path, usage) in record.all_usages() {
            let Usage::Recharge { range: Some(range), .. } = usage else { continue };
            let in_faces = range.iter().all(|v| (1..=6).contains(v));
            let consecutive = range.windows(2).all(|w| w[1] == w[0] + 1);
            if !in_faces || !consecutive {
                report.error(
                    &path.field("range"),
                    RuleId::RechargeRange,
                    "consecutive ascending values within 1..=6",
                    format!("{range:?}"),
                );
            }
        }
    }

    /// Lair actions and regional effects describe the same archetype;
    /// a stat block carrying one without the other is incomplete.
    fn check_section_pairing(&self, record: &CreatureRecord, report: &mut Report) {
        if record.lair_actions.is_some() && record.regional_effects.is_none() {
            report.error(
                &FieldPath::root("regional_effects"),
                RuleId::RequiredSection,
                "present when lair_actions is present",
                "absent",
            );
        }
        if record.regional_effects.is_some() && record.lair_actions.is_none() {
            report.error(
                &FieldPath::root("lair_actions"),
                RuleId::RequiredSection,
                "present when regional_effects is present",
                "absent",
            );
        }
    }
}

/// Which abilities may legitimately drive a weapon attack. Finesse
/// melee weapons open the choice of strength or dexterity; everything
/// else in melee keys off strength, and pure ranged attacks off
/// dexterity.
fn allowed_abilities(is_melee: bool, is_finesse: bool) -> &'static [Ability] {
    if !is_melee {
        &[Ability::Dexterity]
    } else if is_finesse {
        &[Ability::Strength, Ability::Dexterity]
    } else {
        &[Ability::Strength]
    }
}

fn ability_list(abilities: &[Ability]) -> String {
    abilities.iter().map(|a| a.name()).collect::<Vec<_>>().join(", ")
}
