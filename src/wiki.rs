use std::collections::{HashMap, VecDeque};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::settings::Settings;

const CATEGORY_NAMESPACE: i64 = 14;

/// One entry of a category listing, before anything about the page is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArticleHandle {
    pub title: String,
    #[serde(rename = "ns")]
    pub namespace: i64,
}

impl ArticleHandle {
    pub fn is_category(&self) -> bool {
        self.namespace == CATEGORY_NAMESPACE
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub title: String,
    pub text: String,
    /// Date of the page's first revision.
    pub created: NaiveDate,
}

/// Where category members and article text come from.
pub trait ArticleSource {
    /// Members of `category` in listing order. Implementations should page
    /// lazily so a caller that stops early issues no further requests.
    fn members<'a>(
        &'a self,
        category: &str,
    ) -> Box<dyn Iterator<Item = Result<ArticleHandle>> + 'a>;

    /// `Ok(None)` when the page does not exist.
    fn fetch(&self, handle: &ArticleHandle) -> Result<Option<ArticleRecord>>;
}

/// Blocking client for the MediaWiki Action API.
pub struct MediaWikiClient {
    http: reqwest::blocking::Client,
    api_url: String,
    page_size: u32,
}

impl MediaWikiClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(MediaWikiClient {
            http,
            api_url: settings.api_url.clone(),
            page_size: settings.page_size,
        })
    }

    fn query(&self, params: &[(&str, &str)]) -> Result<String> {
        let body = self
            .http
            .get(&self.api_url)
            .query(&[("action", "query"), ("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .with_context(|| format!("Request to {} failed", self.api_url))?
            .error_for_status()?
            .text()
            .context("Failed to read API response body")?;
        Ok(body)
    }

    fn members_page(
        &self,
        category: &str,
        cont: Option<&HashMap<String, String>>,
    ) -> Result<MembersPage> {
        let limit = self.page_size.to_string();
        let mut params = vec![
            ("list", "categorymembers"),
            ("cmtitle", category),
            ("cmprop", "title"),
            ("cmlimit", limit.as_str()),
        ];
        if let Some(cont) = cont {
            params.extend(cont.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        debug!(category, continued = cont.is_some(), "Fetching category members");
        parse_members(&self.query(&params)?)
    }
}

impl ArticleSource for MediaWikiClient {
    fn members<'a>(
        &'a self,
        category: &str,
    ) -> Box<dyn Iterator<Item = Result<ArticleHandle>> + 'a> {
        Box::new(CategoryMembers {
            client: self,
            category: category.to_string(),
            buffer: VecDeque::new(),
            cont: None,
            done: false,
        })
    }

    fn fetch(&self, handle: &ArticleHandle) -> Result<Option<ArticleRecord>> {
        let title = handle.title.as_str();
        let content = self.query(&[
            ("prop", "revisions"),
            ("titles", title),
            ("rvprop", "content"),
            ("rvslots", "main"),
        ])?;
        let Some(page) = parse_page(&content)? else {
            return Ok(None);
        };
        let text = page
            .revisions
            .into_iter()
            .next()
            .and_then(|r| r.slots)
            .map(|s| s.main.content)
            .with_context(|| format!("No revision content for {}", title))?;

        let oldest = self.query(&[
            ("prop", "revisions"),
            ("titles", title),
            ("rvprop", "timestamp"),
            ("rvlimit", "1"),
            ("rvdir", "newer"),
        ])?;
        let created = parse_page(&oldest)?
            .and_then(|p| p.revisions.into_iter().next())
            .and_then(|r| r.timestamp)
            .with_context(|| format!("No first revision timestamp for {}", title))?
            .date_naive();

        Ok(Some(ArticleRecord {
            title: page.title,
            text,
            created,
        }))
    }
}

/// Lazy `list=categorymembers` walk, following `continue` tokens one page at a time.
struct CategoryMembers<'a> {
    client: &'a MediaWikiClient,
    category: String,
    buffer: VecDeque<ArticleHandle>,
    cont: Option<HashMap<String, String>>,
    done: bool,
}

impl Iterator for CategoryMembers<'_> {
    type Item = Result<ArticleHandle>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(handle) = self.buffer.pop_front() {
                return Some(Ok(handle));
            }
            if self.done {
                return None;
            }
            match self.client.members_page(&self.category, self.cont.as_ref()) {
                Ok(page) => {
                    self.buffer.extend(page.members);
                    self.done = page.cont.is_none();
                    self.cont = page.cont;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

// ── API response shapes (formatversion=2) ──

#[derive(Debug, Deserialize)]
struct ApiResponse<Q> {
    query: Option<Q>,
    #[serde(rename = "continue")]
    cont: Option<HashMap<String, String>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    info: String,
}

#[derive(Debug, Deserialize)]
struct MembersQuery {
    #[serde(default)]
    categorymembers: Vec<ArticleHandle>,
}

#[derive(Debug, Deserialize)]
struct PagesQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    #[serde(default)]
    revisions: Vec<Revision>,
}

#[derive(Debug, Deserialize)]
struct Revision {
    timestamp: Option<DateTime<Utc>>,
    slots: Option<Slots>,
}

#[derive(Debug, Deserialize)]
struct Slots {
    main: Slot,
}

#[derive(Debug, Deserialize)]
struct Slot {
    #[serde(default)]
    content: String,
}

struct MembersPage {
    members: Vec<ArticleHandle>,
    cont: Option<HashMap<String, String>>,
}

fn decode<Q: DeserializeOwned>(body: &str) -> Result<ApiResponse<Q>> {
    let resp: ApiResponse<Q> =
        serde_json::from_str(body).context("Failed to decode MediaWiki API response")?;
    if let Some(err) = &resp.error {
        bail!("MediaWiki API error {}: {}", err.code, err.info);
    }
    Ok(resp)
}

fn parse_members(body: &str) -> Result<MembersPage> {
    let resp = decode::<MembersQuery>(body)?;
    Ok(MembersPage {
        members: resp.query.map(|q| q.categorymembers).unwrap_or_default(),
        cont: resp.cont,
    })
}

/// The single page in a `titles=` query, or `None` if it is missing/invalid.
fn parse_page(body: &str) -> Result<Option<Page>> {
    let resp = decode::<PagesQuery>(body)?;
    let page = resp
        .query
        .and_then(|q| q.pages.into_iter().next())
        .filter(|p| !p.missing && !p.invalid);
    Ok(page)
}
