// src/sources/types.rs
use anyhow::Result;

/// Where a candidate came from, which also decides how it is keyed and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    NewAnnouncement,
    FeedPost,
}

/// One piece of content fetched from an external source in one cycle.
/// Immutable value, produced fresh on every fetch.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CandidateItem {
    pub category: ItemCategory,
    pub title: String,
    pub url: String,
    /// Opaque origin timestamp: the estimated start date for announcements,
    /// the listing's numeric creation time (unix seconds) for feed posts.
    pub posted_at: String,
    /// Media format tag (TV, MOVIE, ...); announcements only.
    pub format: Option<String>,
    /// Origin subfeed; feed posts only.
    pub subreddit: Option<String>,
}

/// Result of a parameterized series lookup.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SeriesInfo {
    pub title: String,
    pub status: Option<String>,
    pub episodes: Option<u32>,
    pub chapters: Option<u32>,
    pub url: String,
    pub description: Option<String>,
}

#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<CandidateItem>>;
    fn name(&self) -> &'static str;
}
