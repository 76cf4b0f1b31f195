//! # Structural Validator
//!
//! Purely local constraints over a built record: string lengths,
//! numeric bounds, multiple-of-5 distances, string grammars, vocabulary
//! membership, and array cardinality. Nothing in this module relates
//! two fields to each other — that is the cross-validation engine's
//! job.
//!
//! The builder already normalizes tokens, so vocabulary findings here
//! only fire for records constructed by hand or validated against a
//! narrower ruleset than they were built with.

use chrono::Utc;
use statforge_core::{
    Action, Attack, CreatureRecord, Description, DiceRoll, FieldPath, Report, RuleId, Ruleset,
    Usage,
};

/// Distances (speeds, sense ranges) must be non-negative multiples of
/// 5 and at most this many feet.
const DISTANCE_CAP: i64 = 120;

/// Description fields longer than this draw an advisory warning even
/// though they are still inside the hard cap.
const DESCRIPTION_SOFT_CAP: usize = 1_800;

/// Walks a [`CreatureRecord`] against the local schema constraints.
pub struct StructuralValidator<'a> {
    rules: &'a Ruleset,
}

impl<'a> StructuralValidator<'a> {
    pub fn new(rules: &'a Ruleset) -> Self {
        Self { rules }
    }

    /// Collect every local-constraint violation in the record.
    pub fn validate(&self, record: &CreatureRecord) -> Report {
        let mut report = Report::new();
        self.check_metadata(record, &mut report);
        self.check_info(record, &mut report);
        self.check_stats(record, &mut report);
        self.check_abilities(record, &mut report);
        self.check_proficiencies(record, &mut report);
        self.check_defenses(record, &mut report);
        self.check_senses(record, &mut report);
        self.check_spellcasting(record, &mut report);
        self.check_actions(record, &mut report);
        self.check_legendary(record, &mut report);
        self.check_lair(record, &mut report);
        self.check_regional(record, &mut report);
        self.check_usages(record, &mut report);
        self.check_description(&record.description, &mut report);
        report
    }

    fn check_metadata(&self, record: &CreatureRecord, report: &mut Report) {
        let path = FieldPath::root("metadata");
        let name_len = record.metadata.name.chars().count();
        if !(1..=100).contains(&name_len) {
            report.error(
                &path.field("name"),
                RuleId::StringLength,
                "1..=100 characters",
                format!("{name_len} characters"),
            );
        }
        if !self.rules.patterns.version.is_match(&record.metadata.version) {
            report.error(
                &path.field("version"),
                RuleId::PatternMismatch,
                "MAJOR.MINOR",
                &record.metadata.version,
            );
        }
        let today = Utc::now().date_naive();
        if record.metadata.date_created > today {
            report.error(
                &path.field("date_created"),
                RuleId::DateInFuture,
                format!("on or before {today}"),
                record.metadata.date_created.to_string(),
            );
        }
    }

    fn check_info(&self, record: &CreatureRecord, report: &mut Report) {
        let path = FieldPath::root("creature_info");
        let info = &record.info;
        if !self.rules.vocabularies.sizes.contains(&info.size) {
            report.error(&path.field("size"), RuleId::UnknownToken, "a size category", &info.size);
        }
        if !self.rules.vocabularies.creature_types.contains(&info.creature_type) {
            report.error(
                &path.field("type"),
                RuleId::UnknownToken,
                "a creature type",
                &info.creature_type,
            );
        }
        if !self.rules.patterns.alignment.is_match(&info.alignment) {
            report.error(
                &path.field("alignment"),
                RuleId::PatternMismatch,
                "'{lawful|neutral|chaotic} {good|neutral|evil}' or 'unaligned'",
                &info.alignment,
            );
        }
        let xp = info.challenge_rating.xp;
        if !(0..=155_000).contains(&xp) {
            report.error(
                &path.field("challenge_rating").field("xp"),
                RuleId::NumericRange,
                "0..=155000",
                xp.to_string(),
            );
        }
    }

    fn check_stats(&self, record: &CreatureRecord, report: &mut Report) {
        let path = FieldPath::root("core_stats");
        let stats = &record.stats;
        if !(0..=30).contains(&stats.armor_class.value) {
            report.error(
                &path.field("armor_class").field("value"),
                RuleId::NumericRange,
                "0..=30",
                stats.armor_class.value.to_string(),
            );
        }
        if stats.hit_points.average < 1 {
            report.error(
                &path.field("hit_points").field("average"),
                RuleId::NumericRange,
                ">= 1",
                stats.hit_points.average.to_string(),
            );
        }
        let speed_path = path.field("speed");
        for (mode, value) in stats.speed.modes() {
            if let Some(v) = value {
                self.check_distance(&speed_path.field(mode), v, report);
            }
        }
    }

    fn check_distance(&self, path: &FieldPath, value: i64, report: &mut Report) {
        if !(0..=DISTANCE_CAP).contains(&value) {
            report.error(
                path,
                RuleId::NumericRange,
                format!("0..={DISTANCE_CAP}"),
                value.to_string(),
            );
        }
        if value % 5 != 0 {
            report.error(path, RuleId::MultipleOf, "a multiple of 5", value.to_string());
        }
    }

    fn check_abilities(&self, record: &CreatureRecord, report: &mut Report) {
        let path = FieldPath::root("abilities");
        for (ability, score) in record.abilities.iter() {
            if !(1..=30).contains(&score.score) {
                report.error(
                    &path.field(ability.name()).field("score"),
                    RuleId::NumericRange,
                    "1..=30",
                    score.score.to_string(),
                );
            }
        }
    }

    fn check_proficiencies(&self, record: &CreatureRecord, report: &mut Report) {
        let path = FieldPath::root("proficiencies").field("skills");
        for (i, skill) in record.proficiencies.skills.iter().enumerate() {
            if !self.rules.vocabularies.skills.contains(&skill.name) {
                report.error(
                    &path.index(i).field("name"),
                    RuleId::UnknownToken,
                    "a skill",
                    &skill.name,
                );
            }
        }
    }

    fn check_defenses(&self, record: &CreatureRecord, report: &mut Report) {
        let path = FieldPath::root("defenses");
        let lists = [
            ("damage_resistances", &record.defenses.damage_resistances, true),
            ("damage_immunities", &record.defenses.damage_immunities, true),
            ("condition_immunities", &record.defenses.condition_immunities, false),
        ];
        for (name, tokens, is_damage) in lists {
            let vocab = if is_damage {
                &self.rules.vocabularies.damage_types
            } else {
                &self.rules.vocabularies.conditions
            };
            let expected = if is_damage { "a damage type" } else { "a condition" };
            for (i, token) in tokens.iter().enumerate() {
                if !vocab.contains(token) {
                    report.error(
                        &path.field(name).index(i),
                        RuleId::UnknownToken,
                        expected,
                        token,
                    );
                }
            }
        }
    }

    fn check_senses(&self, record: &CreatureRecord, report: &mut Report) {
        let path = FieldPath::root("senses");
        for (sense, value) in record.senses.distances() {
            if let Some(v) = value {
                self.check_distance(&path.field(sense), v, report);
            }
        }
        let pp = record.senses.passive_perception;
        if !(0..=30).contains(&pp) {
            report.error(
                &path.field("passive_perception"),
                RuleId::NumericRange,
                "0..=30",
                pp.to_string(),
            );
        }
    }

    fn check_spellcasting(&self, record: &CreatureRecord, report: &mut Report) {
        let Some(casting) = &record.spellcasting else { return };
        let path = FieldPath::root("spellcasting");

        if !(0..=30).contains(&casting.dc) {
            report.error(&path.field("dc"), RuleId::NumericRange, "0..=30", casting.dc.to_string());
        }
        if !(0..=30).contains(&casting.attack_bonus) {
            report.error(
                &path.field("attack_bonus"),
                RuleId::NumericRange,
                "0..=30",
                casting.attack_bonus.to_string(),
            );
        }
        if !(-5..=10).contains(&casting.base_modifier) {
            report.error(
                &path.field("base_modifier"),
                RuleId::NumericRange,
                "-5..=10",
                casting.base_modifier.to_string(),
            );
        }
        let slots_path = path.field("spell_slots");
        for (i, level) in casting.spell_slots.iter().enumerate() {
            if !(0..=9).contains(&level.level) {
                report.error(
                    &slots_path.index(i).field("level"),
                    RuleId::NumericRange,
                    "0..=9",
                    level.level.to_string(),
                );
            }
            if !(1..=4).contains(&level.slots) {
                report.error(
                    &slots_path.index(i).field("slots"),
                    RuleId::NumericRange,
                    "1..=4",
                    level.slots.to_string(),
                );
            }
        }
        let limited_path = path.field("limited_use");
        for (i, group) in casting.limited_use.iter().enumerate() {
            if !self.rules.patterns.frequency.is_match(&group.frequency) {
                report.error(
                    &limited_path.index(i).field("frequency"),
                    RuleId::PatternMismatch,
                    "N/day, N/short rest, or N/long rest",
                    &group.frequency,
                );
            }
        }
    }

    fn check_actions(&self, record: &CreatureRecord, report: &mut Report) {
        for (path, action) in record.all_actions() {
            self.check_action(&path, action, report);
        }
    }

    fn check_action(&self, path: &FieldPath, action: &Action, report: &mut Report) {
        if action.name.is_empty() {
            report.error(&path.field("name"), RuleId::StringLength, ">= 1 character", "empty");
        }
        if let Some(attack) = &action.attack {
            self.check_attack(&path.field("attack"), attack, report);
        }
        if let Some(hit) = &action.hit {
            let hit_path = path.field("hit");
            self.check_damage_formula(&hit_path.field("damage"), &hit.damage, report);
            if let Some(two_handed) = &hit.two_handed_damage {
                self.check_damage_formula(&hit_path.field("two_handed_damage"), two_handed, report);
            }
            if !self.rules.vocabularies.damage_types.contains(&hit.damage_type) {
                report.error(
                    &hit_path.field("damage_type"),
                    RuleId::UnknownToken,
                    "a damage type",
                    &hit.damage_type,
                );
            }
        }
    }

    fn check_attack(&self, path: &FieldPath, attack: &Attack, report: &mut Report) {
        if !(0..=3).contains(&attack.magical_bonus) {
            report.error(
                &path.field("magical_bonus"),
                RuleId::NumericRange,
                "0..=3",
                attack.magical_bonus.to_string(),
            );
        }
        if let Some(reach) = attack.shape.reach() {
            if !self.rules.patterns.reach.is_match(reach) {
                report.error(
                    &path.field("reach"),
                    RuleId::PatternMismatch,
                    "'N ft.'",
                    reach,
                );
            }
        }
        if let Some(range) = attack.shape.range() {
            if !self.rules.patterns.range.is_match(range) {
                report.error(
                    &path.field("range"),
                    RuleId::PatternMismatch,
                    "'N ft.' or 'N/M ft.'",
                    range,
                );
            }
        }
    }

    fn check_damage_formula(&self, path: &FieldPath, formula: &str, report: &mut Report) {
        if DiceRoll::parse(formula).is_none() {
            report.error(path, RuleId::PatternMismatch, "a dice expression 'NdM[+K]'", formula);
        }
    }

    fn check_legendary(&self, record: &CreatureRecord, report: &mut Report) {
        let Some(legendary) = &record.legendary_actions else { return };
        let path = FieldPath::root("legendary_actions");
        if !(1..=5).contains(&legendary.slots_per_round) {
            report.error(
                &path.field("slots_per_round"),
                RuleId::NumericRange,
                "1..=5",
                legendary.slots_per_round.to_string(),
            );
        }
        let actions_path = path.field("actions");
        for (i, action) in legendary.actions.iter().enumerate() {
            if !(1..=3).contains(&action.cost) {
                report.error(
                    &actions_path.index(i).field("cost"),
                    RuleId::NumericRange,
                    "1..=3",
                    action.cost.to_string(),
                );
            }
        }
    }

    fn check_lair(&self, record: &CreatureRecord, report: &mut Report) {
        let Some(lair) = &record.lair_actions else { return };
        if !(0..=20).contains(&lair.initiative_count) {
            report.error(
                &FieldPath::root("lair_actions").field("initiative_count"),
                RuleId::NumericRange,
                "0..=20",
                lair.initiative_count.to_string(),
            );
        }
    }

    fn check_regional(&self, record: &CreatureRecord, report: &mut Report) {
        let Some(regional) = &record.regional_effects else { return };
        if regional.effects.is_empty() {
            report.error(
                &FieldPath::root("regional_effects").field("effects"),
                RuleId::ArrayCardinality,
                ">= 1 effect",
                "0 effects",
            );
        }
    }

    /// Local usage constraints: cardinality and element bounds. Whether
    /// a recharge range is sorted and consecutive is a cross rule.
    fn check_usages(&self, record: &CreatureRecord, report: &mut Report) {
        for (path, usage) in record.all_usages() {
            match usage {
                // value and range are each optional and each checked;
                // a usage carrying both gets both sets of findings.
                Usage::Recharge { value, range } => {
                    if let Some(value) = value {
                        if !(1..=6).contains(value) {
                            report.error(
                                &path.field("value"),
                                RuleId::NumericRange,
                                "1..=6",
                                value.to_string(),
                            );
                        }
                    }
                    if let Some(range) = range {
                        if !(2..=6).contains(&range.len()) {
                            report.error(
                                &path.field("range"),
                                RuleId::ArrayCardinality,
                                "2..=6 values",
                                format!("{} values", range.len()),
                            );
                        }
                        for (i, v) in range.iter().enumerate() {
                            if !(1..=6).contains(v) {
                                report.error(
                                    &path.field("range").index(i),
                                    RuleId::NumericRange,
                                    "1..=6",
                                    v.to_string(),
                                );
                            }
                        }
                    }
                }
                Usage::PerDay { times, times_in_lair } => {
                    self.check_times(&path.field("times"), *times, report);
                    if let Some(in_lair) = times_in_lair {
                        self.check_times(&path.field("times_in_lair"), *in_lair, report);
                    }
                }
                Usage::PerShortRest { times } | Usage::PerLongRest { times } => {
                    self.check_times(&path.field("times"), *times, report);
                }
                Usage::Costs { value } => {
                    if *value < 1 {
                        report.error(
                            &path.field("value"),
                            RuleId::NumericRange,
                            ">= 1",
                            value.to_string(),
                        );
                    }
                }
            }
        }
    }

    fn check_times(&self, path: &FieldPath, times: i64, report: &mut Report) {
        if times < 1 {
            report.error(path, RuleId::NumericRange, ">= 1", times.to_string());
        }
    }

    fn check_description(&self, description: &Description, report: &mut Report) {
        let path = FieldPath::root("description");
        for (field, value) in description.fields() {
            let Some(text) = value else { continue };
            let len = text.chars().count();
            if !(10..=2_000).contains(&len) {
                report.error(
                    &path.field(field),
                    RuleId::StringLength,
                    "10..=2000 characters",
                    format!("{len} characters"),
                );
            } else if len > DESCRIPTION_SOFT_CAP {
                report.warning(
                    &path.field(field),
                    RuleId::StringLength,
                    format!("<= {DESCRIPTION_SOFT_CAP} characters preferred"),
                    format!("{len} characters"),
                );
            }
        }
    }
}
