use std::sync::LazyLock;

use regex::Regex;

use super::dates::date_pattern;

const YEAR: &str = r"(?:1[0-9]{3}|20[0-9]{2})\b";

/// `<date-or-year> – <date-or-year>`, as in the lead sentence of most biographies.
static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let token = format!(r"({}|\b{YEAR})", date_pattern(YEAR));
    Regex::new(&format!(r"{token}\s?(?:-|–|&ndash;|&mdash;)\s?{token}")).unwrap()
});

/// First life-span range in free text, as raw `(birth, death)` strings.
pub fn find_range(text: &str) -> Option<(String, String)> {
    let caps = RANGE_RE.captures(text)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}
