// src/sources/anilist.rs
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::sources::types::{CandidateItem, ItemCategory, NewsSource, SeriesInfo};
use crate::sources::{ensure_metrics_described, normalize_title};
use crate::watchlist::SeriesKind;

pub const ANILIST_GRAPHQL_URL: &str = "https://graphql.anilist.co";

/// Ten most recently added not-yet-released anime, newest internal id first.
const ANNOUNCEMENTS_QUERY: &str = r#"
query {
    Page(page: 1, perPage: 10) {
        media(status: NOT_YET_RELEASED, type: ANIME, sort: ID_DESC) {
            title { romaji english }
            startDate { year month day }
            siteUrl
            format
        }
    }
}
"#;

const SERIES_LOOKUP_QUERY: &str = r#"
query ($search: String, $type: MediaType) {
    Media(search: $search, type: $type) {
        title { romaji english }
        status
        episodes
        chapters
        siteUrl
        description
    }
}
"#;

#[derive(Debug, Deserialize)]
struct Graphql<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct PageData {
    #[serde(rename = "Page")]
    page: Page,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    media: Vec<AnnouncementMedia>,
}

#[derive(Debug, Deserialize)]
struct AnnouncementMedia {
    title: MediaTitle,
    #[serde(rename = "startDate")]
    start_date: Option<StartDate>,
    #[serde(rename = "siteUrl")]
    site_url: Option<String>,
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MediaTitle {
    romaji: Option<String>,
    english: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StartDate {
    year: Option<i32>,
    month: Option<i32>,
    day: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct LookupData {
    #[serde(rename = "Media")]
    media: Option<LookupMedia>,
}

#[derive(Debug, Deserialize)]
struct LookupMedia {
    title: MediaTitle,
    status: Option<String>,
    episodes: Option<u32>,
    chapters: Option<u32>,
    #[serde(rename = "siteUrl")]
    site_url: Option<String>,
    description: Option<String>,
}

impl MediaTitle {
    /// Romaji preferred, english as fallback.
    fn preferred(&self) -> Option<String> {
        self.romaji
            .as_deref()
            .or(self.english.as_deref())
            .map(normalize_title)
            .filter(|t| !t.is_empty())
    }
}

fn format_start_date(d: &StartDate) -> String {
    let part = |p: Option<i32>| p.map_or_else(|| "?".to_string(), |v| v.to_string());
    format!("{}-{}-{}", part(d.year), part(d.month), part(d.day))
}

/// Map the announcements page into candidate items. Entries without any
/// usable title are skipped.
pub fn parse_announcements(body: &str) -> Result<Vec<CandidateItem>> {
    let resp: Graphql<PageData> =
        serde_json::from_str(body).context("parsing anilist announcements payload")?;
    let page = resp
        .data
        .context("anilist announcements payload had no data")?
        .page;

    let mut out = Vec::with_capacity(page.media.len());
    for media in page.media {
        let Some(title) = media.title.preferred() else {
            continue;
        };
        out.push(CandidateItem {
            category: ItemCategory::NewAnnouncement,
            title,
            url: media.site_url.unwrap_or_default(),
            posted_at: format_start_date(&media.start_date.unwrap_or_default()),
            format: media.format,
            subreddit: None,
        });
    }
    Ok(out)
}

pub fn parse_series_lookup(body: &str) -> Result<Option<SeriesInfo>> {
    let resp: Graphql<LookupData> =
        serde_json::from_str(body).context("parsing anilist lookup payload")?;
    let Some(media) = resp.data.and_then(|d| d.media) else {
        return Ok(None);
    };
    let Some(title) = media.title.preferred() else {
        return Ok(None);
    };
    Ok(Some(SeriesInfo {
        title,
        status: media.status,
        episodes: media.episodes,
        chapters: media.chapters,
        url: media.site_url.unwrap_or_default(),
        description: media.description,
    }))
}

#[derive(Clone)]
pub struct AniListClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl AniListClient {
    pub fn new() -> Self {
        Self::with_endpoint(ANILIST_GRAPHQL_URL.to_string())
    }

    /// Endpoint override for tests/tools.
    pub fn with_endpoint(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            timeout: Duration::from_secs(10),
        }
    }

    async fn post_query(&self, body: serde_json::Value) -> Result<String> {
        let resp = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("anilist request")?
            .error_for_status()
            .context("anilist non-2xx")?;
        resp.text().await.context("anilist body")
    }

    pub async fn fetch_announcements(&self) -> Result<Vec<CandidateItem>> {
        ensure_metrics_described();
        let t0 = std::time::Instant::now();

        let body = self
            .post_query(serde_json::json!({ "query": ANNOUNCEMENTS_QUERY }))
            .await?;
        let items = parse_announcements(&body)?;

        histogram!("relay_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("relay_items_total").increment(items.len() as u64);
        Ok(items)
    }

    /// Parameterized search by name and media kind. `Ok(None)` when the
    /// catalog has no match.
    pub async fn lookup_series(&self, name: &str, kind: SeriesKind) -> Result<Option<SeriesInfo>> {
        let body = self
            .post_query(serde_json::json!({
                "query": SERIES_LOOKUP_QUERY,
                "variables": { "search": name, "type": kind.as_media_type() },
            }))
            .await?;
        parse_series_lookup(&body)
    }
}

impl Default for AniListClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NewsSource for AniListClient {
    async fn fetch_latest(&self) -> Result<Vec<CandidateItem>> {
        self.fetch_announcements().await
    }

    fn name(&self) -> &'static str {
        "AniList"
    }
}
