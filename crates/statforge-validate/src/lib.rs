//! # statforge-validate — Consistency Certification
//!
//! Two engines run against the same immutable [`CreatureRecord`]:
//!
//! 1. [`StructuralValidator`] — purely local constraints: presence,
//!    bounds, multiples, string grammars, vocabulary membership, array
//!    cardinality.
//! 2. [`CrossValidator`] — derived-value rules relating multiple
//!    fields: modifier formulas, proficiency-derived ranges,
//!    spellcasting arithmetic, hit-point averages, recharge ranges,
//!    and archetype section pairing.
//!
//! Both collect every independent violation rather than stopping at the
//! first; a single run surfaces the full defect list. Neither mutates
//! the record, logs, or performs I/O. The engines are independent and
//! order-insensitive; [`validate_record`] runs structural first only so
//! report ordering is stable.
//!
//! [`CreatureRecord`]: statforge_core::CreatureRecord

pub mod cross;
pub mod structural;

use statforge_core::{CreatureRecord, Report, Ruleset};

pub use cross::CrossValidator;
pub use structural::StructuralValidator;

/// Run both validators and merge their findings, structural first.
///
/// A record is fit for serialization exactly when the returned report
/// has no error-severity finding. Re-running over an already-valid
/// record yields an empty error set.
pub fn validate_record(record: &CreatureRecord, rules: &Ruleset) -> Report {
    let mut report = StructuralValidator::new(rules).validate(record);
    report.merge(CrossValidator::new(rules).validate(record));
    report
}
