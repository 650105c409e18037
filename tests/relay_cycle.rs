// tests/relay_cycle.rs
//
// Full-cycle scenarios with in-memory sources and sink: announce ordering,
// dedup across cycles, the no-sink fast path, and dispatch-failure handling.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use anime_news_relay::notify::{AnnouncementSink, TargetSink};
use anime_news_relay::relay::Relay;
use anime_news_relay::sources::types::{CandidateItem, ItemCategory, NewsSource};
use anime_news_relay::watchlist::Watchlist;

fn announcement(title: &str) -> CandidateItem {
    CandidateItem {
        category: ItemCategory::NewAnnouncement,
        title: title.to_string(),
        url: String::new(),
        posted_at: "2026-1-?".to_string(),
        format: Some("TV".to_string()),
        subreddit: None,
    }
}

fn feed_post(title: &str, created: &str) -> CandidateItem {
    CandidateItem {
        category: ItemCategory::FeedPost,
        title: title.to_string(),
        url: String::new(),
        posted_at: created.to_string(),
        format: None,
        subreddit: Some("anime".to_string()),
    }
}

fn test_sink() -> Option<TargetSink> {
    Some(TargetSink {
        webhook_url: "https://discord.example/webhook".to_string(),
        mention_role: None,
    })
}

fn shared_watchlist() -> Arc<RwLock<Watchlist>> {
    Arc::new(RwLock::new(Watchlist::builtin()))
}

struct StaticSource {
    name: &'static str,
    items: Vec<CandidateItem>,
    fetches: Arc<AtomicUsize>,
}

#[async_trait]
impl NewsSource for StaticSource {
    async fn fetch_latest(&self) -> Result<Vec<CandidateItem>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.clone())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

struct FailingSource;

#[async_trait]
impl NewsSource for FailingSource {
    async fn fetch_latest(&self) -> Result<Vec<CandidateItem>> {
        Err(anyhow!("connection reset"))
    }

    fn name(&self) -> &'static str {
        "Broken"
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    fn titles(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnnouncementSink for RecordingSink {
    async fn announce(&self, item: &CandidateItem, _sink: &TargetSink) -> Result<()> {
        self.calls.lock().unwrap().push(item.title.clone());
        Ok(())
    }
}

/// Fails exactly the first dispatch, then behaves like `RecordingSink`.
#[derive(Clone, Default)]
struct FlakySink {
    failed_once: Arc<AtomicBool>,
    inner: RecordingSink,
}

#[async_trait]
impl AnnouncementSink for FlakySink {
    async fn announce(&self, item: &CandidateItem, sink: &TargetSink) -> Result<()> {
        if !self.failed_once.swap(true, Ordering::SeqCst) {
            return Err(anyhow!("webhook 500"));
        }
        self.inner.announce(item, sink).await
    }
}

fn five_item_sources(fetches: Arc<AtomicUsize>) -> Vec<Box<dyn NewsSource>> {
    vec![
        Box::new(StaticSource {
            name: "AniList",
            items: vec![
                announcement("Dandadan 2nd Season"),
                announcement("Spy x Family Season 3"),
                announcement("Hyakkano Season 2"),
            ],
            fetches: fetches.clone(),
        }),
        Box::new(StaticSource {
            name: "Reddit",
            items: vec![
                feed_post("One Piece season 2 confirmed!", "1723000123"),
                feed_post("Roshidere anime adaptation rumor", "1723000456"),
            ],
            fetches,
        }),
    ]
}

#[tokio::test]
async fn empty_seen_set_announces_all_new_items_in_order() {
    let sink = RecordingSink::default();
    let relay = Relay::with_parts(
        five_item_sources(Arc::new(AtomicUsize::new(0))),
        Box::new(sink.clone()),
        test_sink(),
        shared_watchlist(),
        900,
    );

    let report = relay.run_cycle().await;
    assert_eq!(report.fetched, 5);
    assert_eq!(report.announced, 5);
    assert_eq!(report.send_failures, 0);

    // Announcements first, then feed matches, source order preserved.
    assert_eq!(
        sink.titles(),
        vec![
            "Dandadan 2nd Season",
            "Spy x Family Season 3",
            "Hyakkano Season 2",
            "One Piece season 2 confirmed!",
            "Roshidere anime adaptation rumor",
        ]
    );
    assert_eq!(relay.status().seen_len, 5);
}

#[tokio::test]
async fn second_cycle_announces_nothing_new() {
    let sink = RecordingSink::default();
    let relay = Relay::with_parts(
        five_item_sources(Arc::new(AtomicUsize::new(0))),
        Box::new(sink.clone()),
        test_sink(),
        shared_watchlist(),
        900,
    );

    relay.run_cycle().await;
    let second = relay.run_cycle().await;

    assert_eq!(second.announced, 0);
    assert_eq!(second.skipped_seen, 5);
    assert_eq!(sink.titles().len(), 5);
    assert_eq!(relay.status().seen_len, 5);
}

#[tokio::test]
async fn unconfigured_sink_skips_fetching_entirely() {
    let fetches = Arc::new(AtomicUsize::new(0));
    let sink = RecordingSink::default();
    let relay = Relay::with_parts(
        five_item_sources(fetches.clone()),
        Box::new(sink.clone()),
        None,
        shared_watchlist(),
        900,
    );

    let report = relay.run_cycle().await;
    assert_eq!(report, Default::default());
    assert_eq!(fetches.load(Ordering::SeqCst), 0, "no-op cycles must not fetch");
    assert!(sink.titles().is_empty());
    assert_eq!(relay.status().seen_len, 0);
}

#[tokio::test]
async fn one_failing_source_does_not_block_the_other() {
    let sink = RecordingSink::default();
    let sources: Vec<Box<dyn NewsSource>> = vec![
        Box::new(FailingSource),
        Box::new(StaticSource {
            name: "Reddit",
            items: vec![feed_post("One Piece season 2 confirmed!", "1723000123")],
            fetches: Arc::new(AtomicUsize::new(0)),
        }),
    ];
    let relay = Relay::with_parts(
        sources,
        Box::new(sink.clone()),
        test_sink(),
        shared_watchlist(),
        900,
    );

    let report = relay.run_cycle().await;
    assert_eq!(report.fetched, 1);
    assert_eq!(report.announced, 1);
    assert_eq!(sink.titles(), vec!["One Piece season 2 confirmed!"]);
}

#[tokio::test]
async fn failed_dispatch_is_not_recorded_and_is_retried_next_cycle() {
    let sink = FlakySink::default();
    let sources: Vec<Box<dyn NewsSource>> = vec![Box::new(StaticSource {
        name: "AniList",
        items: vec![
            announcement("Dandadan 2nd Season"),
            announcement("Spy x Family Season 3"),
        ],
        fetches: Arc::new(AtomicUsize::new(0)),
    })];
    let relay = Relay::with_parts(
        sources,
        Box::new(sink.clone()),
        test_sink(),
        shared_watchlist(),
        900,
    );

    let first = relay.run_cycle().await;
    assert_eq!(first.announced, 1);
    assert_eq!(first.send_failures, 1);
    assert_eq!(relay.status().seen_len, 1);

    let second = relay.run_cycle().await;
    assert_eq!(second.announced, 1, "failed item is re-attempted");
    assert_eq!(second.skipped_seen, 1);
    assert_eq!(relay.status().seen_len, 2);
    assert_eq!(
        sink.inner.titles(),
        vec!["Spy x Family Season 3", "Dandadan 2nd Season"]
    );
}

#[tokio::test]
async fn duplicate_identifier_within_one_cycle_announces_once() {
    let sink = RecordingSink::default();
    let fetches = Arc::new(AtomicUsize::new(0));
    let sources: Vec<Box<dyn NewsSource>> = vec![
        Box::new(StaticSource {
            name: "AniList",
            items: vec![announcement("Dandadan 2nd Season")],
            fetches: fetches.clone(),
        }),
        Box::new(StaticSource {
            name: "AniList-mirror",
            items: vec![announcement("Dandadan 2nd Season")],
            fetches,
        }),
    ];
    let relay = Relay::with_parts(
        sources,
        Box::new(sink.clone()),
        test_sink(),
        shared_watchlist(),
        900,
    );

    let report = relay.run_cycle().await;
    assert_eq!(report.announced, 1);
    assert_eq!(report.skipped_seen, 1);
    assert_eq!(sink.titles().len(), 1);
}
