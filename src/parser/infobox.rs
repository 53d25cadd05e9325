use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::dates::date_pattern;

static OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\{\{\s*infobox").unwrap());

static BIRTH: LazyLock<FieldPatterns> = LazyLock::new(|| {
    FieldPatterns::new(
        "birth_date",
        r"birth[ _]date(?:[ _]and[ _]age)?|b-da|dob",
        r"birth[ _]year(?:[ _]and[ _]age)?",
    )
});
static DEATH: LazyLock<FieldPatterns> = LazyLock::new(|| {
    FieldPatterns::new(
        "death_date",
        r"death[ _]date(?:[ _]and[ _](?:given[ _])?age)?|dda",
        r"death[ _]year(?:[ _]and[ _]age)?",
    )
});

/// Birth/death evidence pulled out of the first infobox in an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Infobox {
    /// Byte range of the whole `{{Infobox ...}}` invocation in the source text.
    pub span: Range<usize>,
    pub birth: Option<String>,
    pub death: Option<String>,
}

pub fn parse(text: &str) -> Option<Infobox> {
    let span = find_block(text)?;
    let body = &text[span.clone()];
    Some(Infobox {
        birth: BIRTH.resolve(body),
        death: DEATH.resolve(body),
        span,
    })
}

/// Locate the first `{{Infobox` and walk forward until the brackets balance.
///
/// One depth counter is shared by `{}`, `()` and `[]`, so a stray `)` inside
/// the infobox closes it early. Returns `None` if the text ends first.
pub fn find_block(text: &str) -> Option<Range<usize>> {
    let start = OPEN_RE.find(text)?.start();
    let mut depth = 0usize;

    for (i, c) in text[start..].char_indices() {
        match c {
            '{' | '(' | '[' => depth += 1,
            '}' | ')' | ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start..start + i + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

struct FieldPatterns {
    triple: Regex,
    date: Regex,
    year: Regex,
}

impl FieldPatterns {
    fn new(field: &str, date_templates: &str, year_templates: &str) -> Self {
        // Leading named params like `df=yes|` are skipped before the numbers.
        let triple = format!(
            r"(?i)\b{field}\s*=\s*\{{\{{\s*(?:{date_templates})\s*\|(?:\s*[a-z]+\s*=[^|}}]*\|)*\s*(\d{{1,4}})\s*\|\s*(\d{{1,2}})\s*\|\s*(\d{{1,2}})"
        );
        let date = format!(
            r"(?i)\b{field}\s*=\s*({}|\d{{4}}-\d{{2}}-\d{{2}}\b)",
            date_pattern(r"\d{4}")
        );
        // A year followed by `-` starts an ISO date, not a year on its own.
        let year = format!(
            r"(?i)\b{field}\s*=\s*(?:\{{\{{\s*(?:{year_templates})\s*\|\s*)?(\d{{4}})(?:[^-\w]|$)"
        );
        FieldPatterns {
            triple: Regex::new(&triple).unwrap(),
            date: Regex::new(&date).unwrap(),
            year: Regex::new(&year).unwrap(),
        }
    }

    /// Triple beats a spelled-out date, which beats a bare year.
    fn resolve(&self, body: &str) -> Option<String> {
        if let Some(caps) = self.triple.captures(body) {
            return Some(format!("{}|{}|{}", &caps[1], &caps[2], &caps[3]));
        }
        if let Some(caps) = self.date.captures(body) {
            return Some(caps[1].to_string());
        }
        self.year.captures(body).map(|caps| caps[1].to_string())
    }
}
