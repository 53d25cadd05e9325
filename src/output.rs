use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::parser::Extraction;

const HEADER: [&str; 5] = ["Name", "Birth", "Death", "Covid", "Created"];

/// One CSV line per successfully extracted article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputRow {
    pub name: String,
    pub birth: NaiveDate,
    pub death: NaiveDate,
    pub covid: bool,
    pub created: NaiveDate,
}

impl OutputRow {
    pub fn new(name: String, extraction: Extraction, created: NaiveDate) -> Self {
        OutputRow {
            name,
            birth: extraction.birth,
            death: extraction.death,
            covid: extraction.covid,
            created,
        }
    }
}

/// Header plus one record per row, minimal quoting, `\n` line endings.
pub fn write_rows<W: Write>(writer: W, rows: &[OutputRow]) -> Result<()> {
    let mut w = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    w.write_record(HEADER)?;
    for row in rows {
        w.serialize(row)?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_csv(path: &Path, rows: &[OutputRow]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_rows(file, rows).with_context(|| format!("Failed to write {}", path.display()))
}
