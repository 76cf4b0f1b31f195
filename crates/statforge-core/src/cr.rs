//! # Challenge Rating
//!
//! A closed rating type: whole numbers 0–30 plus the three canonical
//! sub-1 fractions (1/8, 1/4, 1/2). Anything else is rejected at
//! construction, which lets the XP and proficiency-bonus tables be
//! total over valid ratings.
//!
//! On the wire a rating is a number for whole values and a fraction
//! string (`"1/8"`) otherwise, matching the source schema.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A creature challenge rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cr {
    /// CR 1/8.
    Eighth,
    /// CR 1/4.
    Quarter,
    /// CR 1/2.
    Half,
    /// A whole rating, 0–30.
    Whole(u8),
}

impl Cr {
    /// Parse a rating from its textual form: a whole number or one of
    /// the canonical fraction strings.
    pub fn parse(text: &str) -> Option<Cr> {
        match text.trim() {
            "1/8" => Some(Cr::Eighth),
            "1/4" => Some(Cr::Quarter),
            "1/2" => Some(Cr::Half),
            other => {
                let n: u8 = other.parse().ok()?;
                (n <= 30).then_some(Cr::Whole(n))
            }
        }
    }

    /// Construct from a numeric value if it is exactly representable.
    pub fn from_f64(value: f64) -> Option<Cr> {
        if value == 0.125 {
            Some(Cr::Eighth)
        } else if value == 0.25 {
            Some(Cr::Quarter)
        } else if value == 0.5 {
            Some(Cr::Half)
        } else if value.fract() == 0.0 && (0.0..=30.0).contains(&value) {
            Some(Cr::Whole(value as u8))
        } else {
            None
        }
    }

    /// The canonical string key used by the XP lookup table.
    pub fn as_key(&self) -> String {
        match self {
            Cr::Eighth => "1/8".to_string(),
            Cr::Quarter => "1/4".to_string(),
            Cr::Half => "1/2".to_string(),
            Cr::Whole(n) => n.to_string(),
        }
    }

    /// The numeric value, used by the proficiency-bonus step table.
    /// Fractions all floor into the lowest step.
    pub fn numeric(&self) -> f64 {
        match self {
            Cr::Eighth => 0.125,
            Cr::Quarter => 0.25,
            Cr::Half => 0.5,
            Cr::Whole(n) => f64::from(*n),
        }
    }
}

impl std::fmt::Display for Cr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_key())
    }
}

impl Serialize for Cr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cr::Whole(n) => serializer.serialize_u8(*n),
            fraction => serializer.serialize_str(&fraction.as_key()),
        }
    }
}

impl<'de> Deserialize<'de> for Cr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(f64),
            Text(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => {
                Cr::from_f64(n).ok_or_else(|| D::Error::custom(format!("invalid challenge rating {n}")))
            }
            Raw::Text(s) => {
                Cr::parse(&s).ok_or_else(|| D::Error::custom(format!("invalid challenge rating '{s}'")))
            }
        }
    }
}

/// A rating paired with the experience points the stat block claims for
/// it. Whether the XP agrees with the lookup table is a cross-validation
/// question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeRating {
    /// The rating itself.
    pub rating: Cr,
    /// The claimed experience-point value.
    pub xp: i64,
}
