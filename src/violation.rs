//! Speeding-violation extraction from free-text charge descriptions.
//!
//! Charge text is free-form legal shorthand. A speeding charge generally
//! embeds an "actual/limit" speed pair such as "82/70"; the pair alone is
//! only trusted when it is the entire charge field, since a digit pair
//! embedded in longer text may be a statute section number.

use anyhow::Result;
use regex::Regex;

/// Statute abbreviations marking a charge as speeding or reckless driving.
/// Matched case-sensitively as literal substrings.
const SPEEDING_KEYWORDS: &[&str] = &["SP", "RD", "R.D.", "R/D", "R D", "RECK"];

const VIOLATION_PATTERN: &str = r"[0-9]{2,3}/[0-9]{1,2}";

/// A parsed actual-speed / speed-limit pair from a speeding charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    pub actual_speed: u32,
    pub speed_limit: u32,
}

/// Extracts [`Violation`]s from charge text. Holds the compiled pattern so
/// it is built once per run.
pub struct ViolationExtractor {
    pattern: Regex,
}

impl ViolationExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(VIOLATION_PATTERN)?,
        })
    }

    /// Returns the violation encoded in `charge`, or `None` when the charge
    /// does not describe a speeding violation. Never fails on malformed
    /// input.
    ///
    /// The first "NN/NN" match in the string is used. When that match is
    /// not the whole charge field, at least one statute keyword must also
    /// appear somewhere in the charge.
    pub fn extract(&self, charge: &str) -> Option<Violation> {
        let matched = self.pattern.find(charge)?.as_str();

        if matched != charge && !SPEEDING_KEYWORDS.iter().any(|kw| charge.contains(kw)) {
            return None;
        }

        let (actual, limit) = matched.split_once('/')?;
        Some(Violation {
            actual_speed: actual.parse().ok()?,
            speed_limit: limit.parse().ok()?,
        })
    }
}
