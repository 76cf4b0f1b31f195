//! # Error Types — Structured Error Hierarchy
//!
//! Two error kinds exist in the pipeline and they are deliberately kept
//! apart:
//!
//! - [`BuildError`] — the input bag is structurally unusable (missing
//!   section, unparseable dice expression, token outside every known
//!   vocabulary). Fatal to the builder step; no validation runs, because
//!   derived checks have no well-defined input.
//! - Validation findings — never errors in the Rust sense. They are
//!   [`crate::Violation`]s accumulated in a [`crate::Report`] and
//!   returned to the caller in full.
//!
//! [`RulesError`] covers the third, rarer case: the external rule
//! configuration itself cannot be loaded. Unknown keys in a rule file are
//! *not* errors — they surface as warnings on [`crate::RulesetLoad`].

use thiserror::Error;

/// Fatal error while mapping the raw section bag into a [`crate::CreatureRecord`].
///
/// Every variant names the section it arose in so the caller can point
/// at the offending part of the source document.
#[derive(Error, Debug)]
pub enum BuildError {
    /// A section the record cannot exist without is absent.
    #[error("required section '{0}' is missing")]
    MissingSection(&'static str),

    /// A field inside a section is absent.
    #[error("section '{section}': required field '{field}' is missing")]
    MissingField {
        /// Section the field belongs to.
        section: &'static str,
        /// Dotted field name inside the section.
        field: String,
    },

    /// A field holds a value of the wrong shape (e.g. a list where a
    /// mapping was expected, or a non-numeric string where a number was).
    #[error("section '{section}': field '{field}' expected {expected}, got {actual}")]
    TypeMismatch {
        /// Section the field belongs to.
        section: &'static str,
        /// Dotted field name inside the section.
        field: String,
        /// Shape the builder required.
        expected: &'static str,
        /// Short rendering of what was found.
        actual: String,
    },

    /// A token matched no vocabulary entry even after case-insensitive
    /// normalization.
    #[error("section '{section}': token '{token}' is not a known {vocabulary}")]
    UnknownToken {
        /// Section the token came from.
        section: &'static str,
        /// The offending token as found in the input.
        token: String,
        /// Human name of the vocabulary that was searched.
        vocabulary: &'static str,
    },

    /// A dice expression did not match the `NdM[+K]` grammar.
    #[error("section '{section}': cannot parse dice expression '{text}'")]
    BadDice {
        /// Section the expression came from.
        section: &'static str,
        /// The unparseable expression.
        text: String,
    },

    /// A date string did not parse as `YYYY-MM-DD`.
    #[error("section '{section}': cannot parse date '{text}'")]
    BadDate {
        /// Section the date came from.
        section: &'static str,
        /// The unparseable date string.
        text: String,
    },

    /// A challenge rating was neither a whole number 0–30 nor one of the
    /// canonical fractions 1/8, 1/4, 1/2.
    #[error("section '{section}': '{text}' is not a recognizable challenge rating")]
    BadChallengeRating {
        /// Section the rating came from.
        section: &'static str,
        /// The unparseable rating.
        text: String,
    },

    /// A usage/limitation description matched no known mechanic.
    #[error("section '{section}': cannot interpret usage '{text}'")]
    BadUsage {
        /// Section the usage came from.
        section: &'static str,
        /// The unparseable usage text or structure.
        text: String,
    },
}

/// Error while loading an external rule configuration file.
#[derive(Error, Debug)]
pub enum RulesError {
    /// The file could not be read.
    #[error("cannot read rule file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid YAML or does not match the rule-file shape.
    #[error("cannot parse rule file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A regular expression in the rule file does not compile.
    #[error("pattern '{name}' in rule file does not compile: {source}")]
    BadPattern {
        /// Name of the pattern entry.
        name: String,
        /// Underlying regex compilation error.
        source: regex::Error,
    },

    /// A challenge-rating key in the XP table is not a valid rating.
    #[error("xp table key '{0}' is not a valid challenge rating")]
    BadCrKey(String),
}
