// src/sources/reddit.rs
use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::sources::types::{CandidateItem, ItemCategory, NewsSource};
use crate::sources::{ensure_metrics_described, normalize_title};
use crate::watchlist::Watchlist;

pub const REDDIT_LISTING_URL: &str = "https://www.reddit.com/r/anime/new/.json";

/// Newest posts requested per cycle.
pub const LISTING_PAGE_SIZE: u32 = 15;

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: String,
    permalink: String,
    subreddit: String,
    created_utc: f64,
}

/// Keep only posts whose title matches the watchlist (keywords or series
/// terms; title only, never the body). Listing order is preserved.
pub fn parse_feed_matches(body: &str, watch: &Watchlist) -> Result<Vec<CandidateItem>> {
    let listing: Listing = serde_json::from_str(body).context("parsing reddit listing payload")?;

    let mut out = Vec::new();
    for child in listing.data.children {
        let post = child.data;
        let title = normalize_title(&post.title);
        if title.is_empty() || !watch.matches_title(&title) {
            continue;
        }
        out.push(CandidateItem {
            category: ItemCategory::FeedPost,
            title,
            url: format!("https://reddit.com{}", post.permalink),
            // Origin-assigned creation time keys feed identity; seconds are enough.
            posted_at: (post.created_utc as u64).to_string(),
            format: None,
            subreddit: Some(post.subreddit),
        });
    }
    Ok(out)
}

pub struct RedditSource {
    client: reqwest::Client,
    url: String,
    limit: u32,
    timeout: Duration,
    watch: Arc<RwLock<Watchlist>>,
}

impl RedditSource {
    pub fn new(watch: Arc<RwLock<Watchlist>>) -> Self {
        Self::with_url(REDDIT_LISTING_URL.to_string(), watch)
    }

    /// URL override for tests/tools.
    pub fn with_url(url: String, watch: Arc<RwLock<Watchlist>>) -> Self {
        // Reddit throttles the default library user agent.
        let client = reqwest::Client::builder()
            .user_agent(concat!("anime-news-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self {
            client,
            url,
            limit: LISTING_PAGE_SIZE,
            timeout: Duration::from_secs(10),
            watch,
        }
    }
}

#[async_trait]
impl NewsSource for RedditSource {
    async fn fetch_latest(&self) -> Result<Vec<CandidateItem>> {
        ensure_metrics_described();
        let t0 = std::time::Instant::now();

        let body = self
            .client
            .get(&self.url)
            .query(&[("limit", self.limit)])
            .timeout(self.timeout)
            .send()
            .await
            .context("reddit request")?
            .error_for_status()
            .context("reddit non-2xx")?
            .text()
            .await
            .context("reddit body")?;

        // Snapshot the watchlist after the await so the guard never crosses it.
        let items = {
            let watch = self.watch.read().expect("watchlist lock poisoned");
            parse_feed_matches(&body, &watch)?
        };

        histogram!("relay_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("relay_items_total").increment(items.len() as u64);
        Ok(items)
    }

    fn name(&self) -> &'static str {
        "Reddit"
    }
}
