pub mod dates;
pub mod infobox;
pub mod prose;

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::ExtractionError;

static COVID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i:covid)|[Cc]oronavirus").unwrap());

/// Facts pulled out of one article's wikitext.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extraction {
    pub birth: NaiveDate,
    pub death: NaiveDate,
    pub covid: bool,
}

/// Two-stage lookup: infobox fields first, then the first date range in the
/// remaining prose for whichever of birth/death is still missing.
pub fn extract(text: &str) -> Result<Extraction, ExtractionError> {
    let covid = mentions_covid(text);
    let mut working = normalize_entities(text);

    let mut birth = None;
    let mut death = None;
    if let Some(ib) = infobox::parse(&working) {
        birth = ib.birth;
        death = ib.death;
        working.replace_range(ib.span, "");
    }

    if birth.is_none() || death.is_none() {
        if let Some((b, d)) = prose::find_range(&working) {
            birth = birth.or(Some(b));
            death = death.or(Some(d));
        }
    }

    let (Some(birth), Some(death)) = (birth, death) else {
        return Err(ExtractionError::NoDateFound);
    };

    Ok(Extraction {
        birth: resolve("birth", &birth)?,
        death: resolve("death", &death)?,
        covid,
    })
}

pub fn mentions_covid(text: &str) -> bool {
    COVID_RE.is_match(text)
}

/// Only `&nbsp;` and `&ndash;` are decoded; other entities pass through.
fn normalize_entities(text: &str) -> String {
    text.replace("&nbsp;", "\u{a0}").replace("&ndash;", "–")
}

fn resolve(field: &'static str, raw: &str) -> Result<NaiveDate, ExtractionError> {
    dates::to_date(raw).ok_or_else(|| ExtractionError::UnparsableDate {
        field,
        raw: raw.to_string(),
    })
}

// ── Tests ──
