//! # Violation Report
//!
//! The accumulated, ordered output of both validators. Each finding
//! names the offending field path, the rule violated, the expected and
//! actual values, and a severity. The report is append-only during a
//! validation pass; a conversion is flagged invalid overall when the
//! report carries any error-severity finding.
//!
//! Field paths are dotted/bracketed and reproducible from the record's
//! shape: `actions.standard[2].attack.bonus`.

use serde::{Deserialize, Serialize};

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A schema or game-mechanic invariant is violated; blocks
    /// successful conversion.
    Error,
    /// Advisory only (e.g. a description close to the length cap).
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// Stable identifier for the rule a finding violated.
///
/// Closed set; the wire names are snake_case and are the contract with
/// the reporting collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    // Structural rules.
    StringLength,
    PatternMismatch,
    NumericRange,
    MultipleOf,
    UnknownToken,
    ArrayCardinality,
    DateInFuture,
    // Game-mechanic (cross-field) rules.
    AbilityModifierFormula,
    SavingThrowBonus,
    SkillBonus,
    AttackBonusRange,
    AttackAbility,
    SpellSaveDc,
    SpellAttackBonus,
    SpellAttackConsistency,
    HitPointAverage,
    PassivePerception,
    ChallengeRatingXp,
    RechargeRange,
    RequiredSection,
}

impl RuleId {
    /// The snake_case wire name.
    pub fn name(self) -> &'static str {
        match self {
            RuleId::StringLength => "string_length",
            RuleId::PatternMismatch => "pattern_mismatch",
            RuleId::NumericRange => "numeric_range",
            RuleId::MultipleOf => "multiple_of",
            RuleId::UnknownToken => "unknown_token",
            RuleId::ArrayCardinality => "array_cardinality",
            RuleId::DateInFuture => "date_in_future",
            RuleId::AbilityModifierFormula => "ability_modifier_formula",
            RuleId::SavingThrowBonus => "saving_throw_bonus",
            RuleId::SkillBonus => "skill_bonus",
            RuleId::AttackBonusRange => "attack_bonus_range",
            RuleId::AttackAbility => "attack_ability",
            RuleId::SpellSaveDc => "spell_save_dc",
            RuleId::SpellAttackBonus => "spell_attack_bonus",
            RuleId::SpellAttackConsistency => "spell_attack_consistency",
            RuleId::HitPointAverage => "hit_point_average",
            RuleId::PassivePerception => "passive_perception",
            RuleId::ChallengeRatingXp => "challenge_rating_xp",
            RuleId::RechargeRange => "recharge_range",
            RuleId::RequiredSection => "required_section",
        }
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One finding: a field, the rule it violated, and the expected vs
/// actual values rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Dotted/bracketed path to the offending field.
    pub path: String,
    /// The rule that was violated.
    pub rule: RuleId,
    /// Error vs warning.
    pub severity: Severity,
    /// What the rule required.
    pub expected: String,
    /// What the record holds.
    pub actual: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} at {}: expected {}, got {}",
            self.severity, self.rule, self.path, self.expected, self.actual
        )
    }
}

/// An ordered, append-only sequence of findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    violations: Vec<Violation>,
}

impl Report {
    /// An empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an error-severity finding.
    pub fn error(
        &mut self,
        path: &FieldPath,
        rule: RuleId,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) {
        self.violations.push(Violation {
            path: path.to_string(),
            rule,
            severity: Severity::Error,
            expected: expected.into(),
            actual: actual.into(),
        });
    }

    /// Append a warning-severity finding.
    pub fn warning(
        &mut self,
        path: &FieldPath,
        rule: RuleId,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) {
        self.violations.push(Violation {
            path: path.to_string(),
            rule,
            severity: Severity::Warning,
            expected: expected.into(),
            actual: actual.into(),
        });
    }

    /// Append all findings from another report, preserving order.
    pub fn merge(&mut self, other: Report) {
        self.violations.extend(other.violations);
    }

    /// Whether any finding is error severity.
    pub fn has_errors(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Error)
    }

    /// All findings, in append order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Only the error-severity findings.
    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
    }

    /// Number of findings of either severity.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Whether the report carries no findings at all.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

impl IntoIterator for Report {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

/// Builder for dotted/bracketed field paths.
///
/// Paths grow immutably — `field`/`index` return a new path — so a
/// validator can fan out from a common prefix without bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(String);

impl FieldPath {
    /// Start a path at a top-level section.
    pub fn root(section: &str) -> Self {
        Self(section.to_string())
    }

    /// Descend into a named field: `a` → `a.b`.
    pub fn field(&self, name: &str) -> Self {
        Self(format!("{}.{name}", self.0))
    }

    /// Descend into a list element: `a.b` → `a.b[3]`.
    pub fn index(&self, i: usize) -> Self {
        Self(format!("{}[{i}]", self.0))
    }

    /// The rendered path.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_compose_dotted_and_bracketed() {
        let path = FieldPath::root("actions")
            .field("standard")
            .index(2)
            .field("attack")
            .field("bonus");
        assert_eq!(path.as_str(), "actions.standard[2].attack.bonus");
    }

    #[test]
    fn report_orders_and_merges() {
        let mut a = Report::new();
        a.error(&FieldPath::root("x"), RuleId::NumericRange, "0..=30", "42");
        let mut b = Report::new();
        b.warning(&FieldPath::root("y"), RuleId::StringLength, "<= 2000", "1900");
        a.merge(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.violations()[0].path, "x");
        assert_eq!(a.violations()[1].path, "y");
        assert!(a.has_errors());
        assert_eq!(a.errors().count(), 1);
    }

    #[test]
    fn rule_names_are_snake_case() {
        assert_eq!(RuleId::SpellAttackConsistency.name(), "spell_attack_consistency");
        assert_eq!(
            serde_json::to_string(&RuleId::HitPointAverage).unwrap(),
            "\"hit_point_average\""
        );
    }
}
