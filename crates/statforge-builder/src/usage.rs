//! Usage/limitation parsing.
//!
//! A usage arrives either as a tagged mapping (`{type: recharge,
//! range: [5, 6]}`) from a structured extractor, or as the free-text
//! marker a stat block prints after an action name — `Recharge 5–6`,
//! `3/Day`, `Costs 2 Actions`. Both normalize to the same [`Usage`]
//! variants.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use statforge_core::{BuildError, Usage};

use crate::coerce;

fn recharge_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"recharge (\d)(?:\s*[-–]\s*(\d))?").unwrap_or_else(|_| unreachable!()))
}

fn per_period_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d+)/(day|short rest|long rest)(?:,? or (\d+)/day in (?:its )?lair)?")
            .unwrap_or_else(|_| unreachable!())
    })
}

fn costs_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"costs? (\d+)").unwrap_or_else(|_| unreachable!()))
}

/// Parse a free-text usage marker into a [`Usage`].
///
/// Returns `None` when the text carries no recognizable mechanic —
/// parenthetical notes like "(in dragon form only)" are descriptive,
/// not mechanical, and stay in the action description.
pub fn parse_usage_text(text: &str) -> Option<Usage> {
    let folded = text.to_lowercase();

    if let Some(caps) = recharge_re().captures(&folded) {
        let start: i64 = caps[1].parse().ok()?;
        let end: i64 = caps
            .get(2)
            .map(|m| m.as_str().parse().ok())
            .unwrap_or(Some(start))?;
        if start == end {
            return Some(Usage::Recharge { value: Some(start), range: None });
        }
        return Some(Usage::Recharge {
            value: None,
            range: Some((start..=end).collect()),
        });
    }

    if let Some(caps) = per_period_re().captures(&folded) {
        let times: i64 = caps[1].parse().ok()?;
        let times_in_lair = caps.get(3).and_then(|m| m.as_str().parse().ok());
        return Some(match &caps[2] {
            "day" => Usage::PerDay { times, times_in_lair },
            "short rest" => Usage::PerShortRest { times },
            _ => Usage::PerLongRest { times },
        });
    }

    if let Some(caps) = costs_re().captures(&folded) {
        let value: i64 = caps[1].parse().ok()?;
        return Some(Usage::Costs { value });
    }

    None
}

/// Map a raw usage value — tagged mapping or marker text — to [`Usage`].
pub(crate) fn parse_usage(section: &'static str, value: &Value) -> Result<Usage, BuildError> {
    match value {
        Value::String(text) => parse_usage_text(text).ok_or_else(|| BuildError::BadUsage {
            section,
            text: text.clone(),
        }),
        Value::Object(map) => {
            let tag = coerce::str_field(section, map, "type")?.to_lowercase();
            match tag.as_str() {
                "recharge" => {
                    let value = coerce::opt_i64_field(section, map, "value")?;
                    let range = match coerce::get(map, "range") {
                        None => None,
                        Some(raw) => {
                            let items = raw.as_array().ok_or_else(|| BuildError::TypeMismatch {
                                section,
                                field: "usage.range".to_string(),
                                expected: "a list of integers",
                                actual: coerce::kind_of(raw),
                            })?;
                            Some(
                                items
                                    .iter()
                                    .map(|item| coerce::coerce_i64(section, "usage.range", item))
                                    .collect::<Result<Vec<_>, _>>()?,
                            )
                        }
                    };
                    Ok(Usage::Recharge { value, range })
                }
                "per_day" => Ok(Usage::PerDay {
                    times: coerce::i64_field(section, map, "times")?,
                    times_in_lair: coerce::opt_i64_field(section, map, "times_in_lair")?,
                }),
                "per_short_rest" => Ok(Usage::PerShortRest {
                    times: coerce::i64_field(section, map, "times")?,
                }),
                "per_long_rest" => Ok(Usage::PerLongRest {
                    times: coerce::i64_field(section, map, "times")?,
                }),
                "costs" => Ok(Usage::Costs {
                    value: coerce::i64_field(section, map, "value")?,
                }),
                other => Err(BuildError::BadUsage {
                    section,
                    text: other.to_string(),
                }),
            }
        }
        other => Err(BuildError::BadUsage {
            section,
            text: coerce::kind_of(other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recharge_markers() {
        assert_eq!(
            parse_usage_text("Recharge 5–6"),
            Some(Usage::Recharge { value: None, range: Some(vec![5, 6]) })
        );
        assert_eq!(
            parse_usage_text("recharge 4-6"),
            Some(Usage::Recharge { value: None, range: Some(vec![4, 5, 6]) })
        );
        assert_eq!(
            parse_usage_text("Recharge 6"),
            Some(Usage::Recharge { value: Some(6), range: None })
        );
    }

    #[test]
    fn per_period_markers() {
        assert_eq!(
            parse_usage_text("3/Day"),
            Some(Usage::PerDay { times: 3, times_in_lair: None })
        );
        assert_eq!(
            parse_usage_text("1/day, or 2/day in its lair"),
            Some(Usage::PerDay { times: 1, times_in_lair: Some(2) })
        );
        assert_eq!(
            parse_usage_text("2/Short Rest"),
            Some(Usage::PerShortRest { times: 2 })
        );
        assert_eq!(
            parse_usage_text("1/Long Rest"),
            Some(Usage::PerLongRest { times: 1 })
        );
    }

    #[test]
    fn cost_markers_and_noise() {
        assert_eq!(parse_usage_text("Costs 2 Actions"), Some(Usage::Costs { value: 2 }));
        assert_eq!(parse_usage_text("(in dragon form only)"), None);
        assert_eq!(parse_usage_text("at will"), None);
    }
}
