use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::output::OutputRow;
use crate::parser;
use crate::wiki::ArticleSource;

/// List pages, "Deaths in <month>" aggregations and user pages are not biographies.
static EXCLUDED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)list of|deaths in|user:").unwrap());

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub rows: Vec<OutputRow>,
    pub summary: ScanSummary,
}

pub fn is_excluded(title: &str) -> bool {
    EXCLUDED_RE.is_match(title)
}

/// Walk `category` in listing order, one article at a time. Extraction
/// failures are counted and skipped; source errors abort the scan.
pub fn scan<S: ArticleSource + ?Sized>(
    source: &S,
    category: &str,
    limit: Option<usize>,
) -> Result<ScanOutcome> {
    let limit_reached = |n: usize| limit.is_some_and(|max| n >= max);
    let mut rows = Vec::new();
    let mut failed = 0usize;

    if !limit_reached(0) {
        for handle in source.members(category) {
            let handle = handle?;
            if handle.is_category() || is_excluded(&handle.title) {
                debug!(title = %handle.title, "Skipping");
                continue;
            }

            info!("Retrieving article {}", handle.title);
            let Some(article) = source.fetch(&handle)? else {
                warn!("Page does not exist: {}", handle.title);
                continue;
            };

            match parser::extract(&article.text) {
                Ok(extraction) => {
                    let row = OutputRow::new(article.title, extraction, article.created);
                    info!(
                        "{} {} {} {} {}",
                        row.name, row.birth, row.death, row.covid, row.created
                    );
                    rows.push(row);
                    if limit_reached(rows.len()) {
                        info!("Limit reached");
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed on {}: {}", article.title, e);
                    failed += 1;
                }
            }
        }
    }

    let summary = ScanSummary {
        succeeded: rows.len(),
        failed,
    };
    Ok(ScanOutcome { rows, summary })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use anyhow::anyhow;
    use chrono::NaiveDate;

    use super::*;
    use crate::wiki::{ArticleHandle, ArticleRecord};

    const GOOD: &str = "'''A''' (14 March 1920 – 2 January 1990) was a poet.";
    const NO_DATES: &str = "'''B''' was a poet.";

    /// In-memory category: (title, namespace, text). `None` text = missing page.
    struct FakeSource {
        pages: Vec<(&'static str, i64, Option<&'static str>)>,
        listed: Cell<usize>,
        fetched: RefCell<Vec<String>>,
    }

    impl FakeSource {
        fn new(pages: Vec<(&'static str, i64, Option<&'static str>)>) -> Self {
            FakeSource {
                pages,
                listed: Cell::new(0),
                fetched: RefCell::new(Vec::new()),
            }
        }
    }

    impl ArticleSource for FakeSource {
        fn members<'a>(
            &'a self,
            _category: &str,
        ) -> Box<dyn Iterator<Item = Result<ArticleHandle>> + 'a> {
            Box::new(self.pages.iter().map(move |(title, ns, _)| {
                self.listed.set(self.listed.get() + 1);
                Ok(ArticleHandle {
                    title: title.to_string(),
                    namespace: *ns,
                })
            }))
        }

        fn fetch(&self, handle: &ArticleHandle) -> Result<Option<ArticleRecord>> {
            self.fetched.borrow_mut().push(handle.title.clone());
            let (_, _, text) = self
                .pages
                .iter()
                .find(|(t, _, _)| *t == handle.title)
                .ok_or_else(|| anyhow!("unknown page {}", handle.title))?;
            Ok(text.map(|text| ArticleRecord {
                title: handle.title.clone(),
                text: text.to_string(),
                created: NaiveDate::from_ymd_opt(2010, 5, 6).unwrap(),
            }))
        }
    }

    struct BrokenSource;

    impl ArticleSource for BrokenSource {
        fn members<'a>(
            &'a self,
            _category: &str,
        ) -> Box<dyn Iterator<Item = Result<ArticleHandle>> + 'a> {
            Box::new(std::iter::once(Err(anyhow!("connection reset"))))
        }

        fn fetch(&self, _handle: &ArticleHandle) -> Result<Option<ArticleRecord>> {
            unreachable!()
        }
    }

    #[test]
    fn excluded_titles() {
        assert!(is_excluded("List of 2020 deaths"));
        assert!(is_excluded("Deaths in January 2020"));
        assert!(is_excluded("User:Someone/sandbox"));
        assert!(is_excluded("list of poets"));
        assert!(!is_excluded("Jane Roe"));
    }

    #[test]
    fn collects_rows_in_listing_order() {
        let src = FakeSource::new(vec![
            ("Jane Roe", 0, Some(GOOD)),
            ("John Doe", 0, Some(GOOD)),
        ]);
        let out = scan(&src, "Category:1990 deaths", None).unwrap();
        let names: Vec<&str> = out.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Jane Roe", "John Doe"]);
        assert_eq!(out.rows[0].birth, NaiveDate::from_ymd_opt(1920, 3, 14).unwrap());
        assert_eq!(out.rows[0].created, NaiveDate::from_ymd_opt(2010, 5, 6).unwrap());
        assert_eq!(out.summary, ScanSummary { succeeded: 2, failed: 0 });
    }

    #[test]
    fn skips_lists_categories_and_missing_pages() {
        let src = FakeSource::new(vec![
            ("List of 2020 deaths", 0, Some(GOOD)),
            ("Deaths in January", 0, Some(GOOD)),
            ("Category:2020 deaths by cause", 14, Some(GOOD)),
            ("Ghost", 0, None),
            ("Jane Roe", 0, Some(GOOD)),
        ]);
        let out = scan(&src, "Category:2020 deaths", None).unwrap();
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].name, "Jane Roe");
        assert_eq!(out.summary, ScanSummary { succeeded: 1, failed: 0 });
        assert_eq!(*src.fetched.borrow(), ["Ghost", "Jane Roe"]);
    }

    #[test]
    fn extraction_failures_are_counted_not_fatal() {
        let src = FakeSource::new(vec![
            ("No Dates", 0, Some(NO_DATES)),
            ("Jane Roe", 0, Some(GOOD)),
            ("Also No Dates", 0, Some(NO_DATES)),
        ]);
        let out = scan(&src, "Category:1990 deaths", None).unwrap();
        assert_eq!(out.summary, ScanSummary { succeeded: 1, failed: 2 });
    }

    #[test]
    fn limit_stops_early() {
        let src = FakeSource::new(vec![
            ("A", 0, Some(GOOD)),
            ("B", 0, Some(GOOD)),
            ("C", 0, Some(GOOD)),
            ("D", 0, Some(GOOD)),
            ("E", 0, Some(GOOD)),
        ]);
        let out = scan(&src, "Category:1990 deaths", Some(2)).unwrap();
        assert_eq!(out.rows.len(), 2);
        assert_eq!(src.listed.get(), 2);
        assert_eq!(*src.fetched.borrow(), ["A", "B"]);
    }

    #[test]
    fn zero_limit_fetches_nothing() {
        let src = FakeSource::new(vec![("A", 0, Some(GOOD))]);
        let out = scan(&src, "Category:1990 deaths", Some(0)).unwrap();
        assert!(out.rows.is_empty());
        assert_eq!(src.listed.get(), 0);
    }

    #[test]
    fn source_errors_propagate() {
        let err = scan(&BrokenSource, "Category:1990 deaths", None).unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }
}
