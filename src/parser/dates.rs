use std::sync::LazyLock;

use chrono::{NaiveDate, Utc};
use regex::Regex;

/// Full English month names. "Septemper" is a misspelling that shows up in
/// enough articles to be worth accepting.
pub const MONTH: &str = r"(?:January|February|March|April|May|June|July|August|Sept(?:ember|emper)|October|November|December)";
const DAY: &str = r"[1-3]?[0-9]";

/// "14 March 1920", "March 14, 1920" or "March 14 1920", with `year` spliced in.
pub fn date_pattern(year: &str) -> String {
    format!(r"(?:\b{DAY}\s+{MONTH}|{MONTH}\s+{DAY}),?\s+{year}")
}

static YEAR_ONLY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").unwrap());
static TRIPLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,4})\|(\d{1,2})\|(\d{1,2})$").unwrap());

const FORMATS: &[&str] = &["%d %B %Y", "%d %B, %Y", "%B %d, %Y", "%B %d %Y", "%Y-%m-%d"];

/// Convert a resolved date string into a calendar date.
///
/// - `"1945"` → 1945-07-01 (year only, pinned to mid-year)
/// - `"1920|3|14"` → 1920-03-14 (template triple)
/// - anything else goes through the free-form parsers
pub fn to_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if YEAR_ONLY_RE.is_match(raw) {
        let year = raw.parse::<i32>().ok()?;
        return NaiveDate::from_ymd_opt(year, 7, 1);
    }

    if let Some(caps) = TRIPLE_RE.captures(raw) {
        let joined = format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]);
        return NaiveDate::parse_from_str(&joined, "%Y-%m-%d").ok();
    }

    parse_free_form(raw)
}

fn parse_free_form(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw
        .replace("Septemper", "September")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if cleaned.is_empty() {
        return None;
    }

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
        .or_else(|| {
            dateparser::parse_with_timezone(&cleaned, &Utc)
                .ok()
                .map(|dt| dt.date_naive())
        })
}
