//! Commentary text parsing
//!
//! The generation service returns free-form text with one cue per line. Two
//! timestamp grammars are recognized:
//!
//! 1. Clock form: `MM:SS - text`, `[MM:SS] text` (separator `-`, `:`, or
//!    whitespace)
//! 2. Seconds form: `At 12.5 seconds - text`, `90s - text` (case-insensitive,
//!    decimal seconds allowed)
//!
//! Parsing is total: lines matching neither grammar, and lines with no text
//! after the timestamp, are dropped from the timeline rather than erroring.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Cue classification derived from the commentary wording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CueCategory {
    /// Straight play-by-play narration
    Play,
    /// Tactical or technical observation
    Analysis,
    /// High-energy reaction
    Excitement,
}

impl std::fmt::Display for CueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CueCategory::Play => write!(f, "play"),
            CueCategory::Analysis => write!(f, "analysis"),
            CueCategory::Excitement => write!(f, "excitement"),
        }
    }
}

/// One timestamped, categorized unit of commentary
///
/// Immutable once constructed; the index replaces its cue list wholesale
/// when a new payload loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentaryCue {
    /// Position in the primary stream this cue belongs to (seconds)
    pub timestamp_secs: f64,
    /// Cue text with the timestamp prefix removed
    pub text: String,
    pub category: CueCategory,
}

/// Parse commentary text into an ordered cue list
///
/// Output preserves source line order; it is not re-sorted, and duplicate or
/// out-of-order timestamps are passed through as-is.
pub fn parse_commentary(text: &str) -> Vec<CommentaryCue> {
    let mut cues = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((timestamp_secs, rest)) = parse_clock_line(line).or_else(|| parse_seconds_line(line))
        else {
            debug!("Dropping undated commentary line: {:?}", line);
            continue;
        };

        let text = rest.trim_end();
        if text.is_empty() {
            continue;
        }

        cues.push(CommentaryCue {
            timestamp_secs,
            text: text.to_string(),
            category: classify(text),
        });
    }

    cues
}

/// Classify a cue by keywords, excitement markers taking priority
fn classify(text: &str) -> CueCategory {
    let lower = text.to_lowercase();
    if lower.contains('!')
        || lower.contains("incredible")
        || lower.contains("amazing")
        || lower.contains("wow")
    {
        CueCategory::Excitement
    } else if lower.contains("notice") || lower.contains("technique") || lower.contains("strategy") {
        CueCategory::Analysis
    } else {
        CueCategory::Play
    }
}

/// Match `[MM:SS] text` / `MM:SS - text`, returning seconds and the remainder
fn parse_clock_line(line: &str) -> Option<(f64, &str)> {
    let s = line.strip_prefix('[').unwrap_or(line);
    let (minutes, s) = take_digits(s)?;
    let s = s.strip_prefix(':')?;
    let (seconds, s) = take_digits(s)?;
    let s = s.strip_prefix(']').unwrap_or(s);
    let rest = strip_separator(s)?;
    Some(((minutes * 60 + seconds) as f64, rest))
}

/// Match `At N seconds - text` / `N s - text`, returning seconds and the remainder
fn parse_seconds_line(line: &str) -> Option<(f64, &str)> {
    let mut s = line;

    // Optional case-insensitive "At" prefix, which must be followed by
    // whitespace. `get` keeps the check on char boundaries so non-ASCII
    // lines fall through to the drop path instead of panicking.
    if let Some(prefix) = s.get(..2) {
        if prefix.eq_ignore_ascii_case("at") {
            let after = &s[2..];
            let trimmed = after.trim_start();
            if trimmed.len() != after.len() {
                s = trimmed;
            }
        }
    }

    let s = s.strip_prefix('[').unwrap_or(s);
    let (value, s) = take_decimal(s)?;
    let s = s.trim_start();
    let s = strip_unit(s)?;
    let s = s.strip_prefix(']').unwrap_or(s);
    let rest = strip_separator(s)?;
    Some((value, rest))
}

/// Consume a run of ASCII digits
fn take_digits(s: &str) -> Option<(u64, &str)> {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}

/// Consume a decimal number (`12`, `12.5`)
fn take_decimal(s: &str) -> Option<(f64, &str)> {
    let mut end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    if end == 0 {
        return None;
    }

    let after_int = &s[end..];
    if let Some(frac) = after_int.strip_prefix('.') {
        let frac_len = frac
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(frac.len());
        if frac_len > 0 {
            end += 1 + frac_len;
        }
    }

    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}

/// Consume a seconds unit: `seconds`, `second`, or bare `s` (case-insensitive)
fn strip_unit(s: &str) -> Option<&str> {
    for unit in ["seconds", "second", "s"] {
        let matched = s
            .get(..unit.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(unit));
        if matched {
            return Some(&s[unit.len()..]);
        }
    }
    None
}

/// Require at least one separator char (`-`, `:`, whitespace) before a
/// non-empty remainder
fn strip_separator(s: &str) -> Option<&str> {
    let rest = s.trim_start_matches(|c: char| c == '-' || c == ':' || c.is_whitespace());
    if rest.len() == s.len() || rest.is_empty() {
        return None;
    }
    Some(rest)
}
