//! # Dice Expressions
//!
//! The `NdM[+K]` hit-dice grammar and its average formula. Hit points
//! in a stat block are printed as an average with the roll in
//! parentheses — `45 (7d8 + 14)` — and the two must agree:
//!
//! ```text
//! average == floor(count * (sides + 1) / 2) + flat
//! ```
//!
//! On the wire a roll is the plain string (`"7d8 + 14"`); it is parsed
//! once at build time and re-rendered on serialization.

use std::sync::OnceLock;

use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Grammar: count, `d`, sides, optional signed flat modifier, with
/// optional spaces around the sign.
const DICE_PATTERN: &str = r"^(\d+)d(\d+)(?:\s*([+-])\s*(\d+))?$";

/// Operand caps. No printed stat block comes anywhere near these; they
/// keep the average arithmetic comfortably inside `i64`.
const MAX_COUNT: u32 = 1_000;
const MAX_SIDES: u32 = 1_000;

fn dice_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The pattern is a compile-time constant; it cannot fail to build.
    RE.get_or_init(|| Regex::new(DICE_PATTERN).unwrap_or_else(|_| unreachable!()))
}

/// A parsed dice expression: `count` dice of `sides` sides plus a flat
/// modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceRoll {
    /// Number of dice rolled.
    pub count: u32,
    /// Sides per die.
    pub sides: u32,
    /// Flat modifier added after the roll. May be negative.
    pub flat: i64,
}

impl DiceRoll {
    /// Parse an `NdM[+K]` expression. Returns `None` when the text does
    /// not match the grammar, the die has zero count/sides, or either
    /// operand exceeds the sanity caps.
    pub fn parse(text: &str) -> Option<DiceRoll> {
        let caps = dice_regex().captures(text.trim())?;
        let count: u32 = caps[1].parse().ok()?;
        let sides: u32 = caps[2].parse().ok()?;
        if count == 0 || sides == 0 || count > MAX_COUNT || sides > MAX_SIDES {
            return None;
        }
        let flat = match (caps.get(3), caps.get(4)) {
            (Some(sign), Some(value)) => {
                let v: i64 = value.as_str().parse().ok()?;
                if sign.as_str() == "-" {
                    -v
                } else {
                    v
                }
            }
            _ => 0,
        };
        Some(DiceRoll { count, sides, flat })
    }

    /// The floored average of the expression.
    pub fn average(&self) -> i64 {
        // count * (sides + 1) is non-negative, so integer division floors.
        // Widened to i64 before the arithmetic; the parse caps keep the
        // product far from the i64 boundary.
        i64::from(self.count) * (i64::from(self.sides) + 1) / 2 + self.flat
    }
}

impl std::fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        if self.flat > 0 {
            write!(f, " + {}", self.flat)?;
        } else if self.flat < 0 {
            write!(f, " - {}", -self.flat)?;
        }
        Ok(())
    }
}

impl Serialize for DiceRoll {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DiceRoll {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        DiceRoll::parse(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid dice expression '{text}'")))
    }
}
