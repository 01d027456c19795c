//! # Next-ID Allocation
//!
//! Infers the identifier for a new row from the identifiers already in the
//! worksheet. Two schemes are recognized:
//!
//! - numeric (`1`, `2`, `17`): next is `max + 1`
//! - prefixed (`FRS-001`, `FRS-014`): next is `prefix + max + 1`, padded to 3 digits
//!
//! This is a heuristic. A worksheet mixing schemes or prefixes gets a value
//! that is monotonic in its numeric part but not otherwise meaningful.

use std::sync::OnceLock;

use regex::Regex;

/// Identifier for the first row of an empty worksheet
pub const FIRST_ID: &str = "1";

/// Identifier used when no existing identifier ends in digits
pub const FALLBACK_ID: &str = "FRS-001";

fn trailing_digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)$").expect("static regex"))
}

fn prefix_and_digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.*?)(\d+)$").expect("static regex"))
}

/// Compute the next identifier given the existing ones
pub fn next_id<S: AsRef<str>>(existing: &[S]) -> String {
    let ids: Vec<&str> = existing
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .collect();

    if ids.is_empty() {
        return FIRST_ID.to_string();
    }

    if ids.iter().all(|id| is_numeric(id)) {
        if let Some(next) = next_numeric(&ids) {
            return next;
        }
    }

    next_prefixed(&ids)
}

/// Digits only once every `.` is removed
fn is_numeric(id: &str) -> bool {
    let stripped: String = id.chars().filter(|c| *c != '.').collect();
    !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit())
}

/// `trunc(max) + 1`. Parsing goes through `f64`, so integers beyond 2^53
/// lose precision. Values such as `1.2.3` that pass the digit check but do
/// not parse are skipped; `None` if nothing parses.
fn next_numeric(ids: &[&str]) -> Option<String> {
    let max = ids
        .iter()
        .filter_map(|id| id.parse::<f64>().ok())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))?;

    let truncated = max.trunc();
    if truncated < u128::MAX as f64 {
        Some((truncated as u128 + 1).to_string())
    } else {
        Some(format!("{:.0}", truncated + 1.0))
    }
}

fn next_prefixed(ids: &[&str]) -> String {
    let max = ids
        .iter()
        .filter_map(|id| trailing_digits().captures(id))
        .filter_map(|caps| caps[1].parse::<u64>().ok())
        .max();

    let Some(max) = max else {
        return FALLBACK_ID.to_string();
    };

    // Prefix of the first matching identifier, not of the one holding `max`
    let prefix = ids
        .iter()
        .find_map(|id| prefix_and_digits().captures(id))
        .and_then(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .unwrap_or_default();

    format!("{}{:03}", prefix, max + 1)
}
