// src/relay.rs
//! The relay context: sources, sink, watchlist, and the seen set behind a
//! single-cycle permit. `run_cycle` is one complete fetch-filter-announce-
//! record pass.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use metrics::{counter, gauge};
use tokio::sync::Mutex;

use crate::config::RelayConfig;
use crate::dedup::{item_id, SeenSet};
use crate::notify::discord::DiscordNotifier;
use crate::notify::{AnnouncementSink, TargetSink};
use crate::sources;
use crate::sources::anilist::AniListClient;
use crate::sources::reddit::RedditSource;
use crate::sources::types::{NewsSource, SeriesInfo};
use crate::watchlist::{SeriesKind, Watchlist};

/// Outcome of one poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct CycleReport {
    pub fetched: usize,
    pub announced: usize,
    pub skipped_seen: usize,
    pub send_failures: usize,
}

/// Operator-facing snapshot for the status command.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RelayStatus {
    pub sink_configured: bool,
    pub followed_series: usize,
    pub seen_len: usize,
    pub cycles_run: u64,
    pub announced_total: u64,
    pub last_cycle_unix: Option<u64>,
    pub interval_secs: u64,
}

#[derive(Debug, Default)]
struct RelayStats {
    cycles: AtomicU64,
    announced: AtomicU64,
    last_cycle_unix: AtomicU64,
    seen_len: AtomicU64,
}

pub struct Relay {
    /// Fetch order matters: announcements before feed matches.
    sources: Vec<Box<dyn NewsSource>>,
    sink_client: Box<dyn AnnouncementSink>,
    lookup: AniListClient,
    sink: RwLock<Option<TargetSink>>,
    watchlist: Arc<RwLock<Watchlist>>,
    /// Owning the seen set doubles as the cycle permit: a trigger that lands
    /// mid-cycle queues here and never runs concurrently.
    seen: Mutex<SeenSet>,
    stats: RelayStats,
    interval_secs: u64,
}

impl Relay {
    pub fn new(cfg: &RelayConfig, watchlist: Arc<RwLock<Watchlist>>) -> Self {
        let anilist = AniListClient::new();
        let sources: Vec<Box<dyn NewsSource>> = vec![
            Box::new(anilist.clone()),
            Box::new(RedditSource::new(watchlist.clone())),
        ];
        Self::assemble(
            sources,
            Box::new(DiscordNotifier::new()),
            anilist,
            cfg.default_sink(),
            watchlist,
            cfg.interval_secs,
        )
    }

    /// Explicit wiring for tests and tools.
    pub fn with_parts(
        sources: Vec<Box<dyn NewsSource>>,
        sink_client: Box<dyn AnnouncementSink>,
        sink: Option<TargetSink>,
        watchlist: Arc<RwLock<Watchlist>>,
        interval_secs: u64,
    ) -> Self {
        Self::assemble(
            sources,
            sink_client,
            AniListClient::new(),
            sink,
            watchlist,
            interval_secs,
        )
    }

    fn assemble(
        sources: Vec<Box<dyn NewsSource>>,
        sink_client: Box<dyn AnnouncementSink>,
        lookup: AniListClient,
        sink: Option<TargetSink>,
        watchlist: Arc<RwLock<Watchlist>>,
        interval_secs: u64,
    ) -> Self {
        sources::ensure_metrics_described();
        Self {
            sources,
            sink_client,
            lookup,
            sink: RwLock::new(sink),
            watchlist,
            seen: Mutex::new(SeenSet::new()),
            stats: RelayStats::default(),
            interval_secs,
        }
    }

    /// One complete pass: fetch both sources in order, announce every
    /// not-yet-seen item, record it only after a confirmed dispatch, then
    /// evict the seen set down to its bound.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut seen = self.seen.lock().await;

        let Some(sink) = self.target_sink() else {
            tracing::info!("no target sink configured; skipping cycle");
            return CycleReport::default();
        };

        let mut report = CycleReport::default();
        for source in &self.sources {
            let items = sources::fetch_or_empty(source.as_ref()).await;
            report.fetched += items.len();

            for item in items {
                let id = item_id(&item);
                if seen.contains(&id) {
                    report.skipped_seen += 1;
                    continue;
                }
                match self.sink_client.announce(&item, &sink).await {
                    Ok(()) => {
                        seen.record(id);
                        report.announced += 1;
                        counter!("relay_announced_total").increment(1);
                        tracing::info!(
                            title = %item.title,
                            category = ?item.category,
                            source = source.name(),
                            "announced"
                        );
                    }
                    Err(e) => {
                        // Not recorded: the item is re-attempted next cycle.
                        report.send_failures += 1;
                        counter!("relay_send_errors_total").increment(1);
                        tracing::warn!(error = ?e, title = %item.title, "announce failed");
                    }
                }
            }
        }

        seen.evict_over_capacity();

        let now = chrono::Utc::now().timestamp().max(0) as u64;
        self.stats.cycles.fetch_add(1, Ordering::Relaxed);
        self.stats
            .announced
            .fetch_add(report.announced as u64, Ordering::Relaxed);
        self.stats.last_cycle_unix.store(now, Ordering::Relaxed);
        self.stats
            .seen_len
            .store(seen.len() as u64, Ordering::Relaxed);
        counter!("relay_cycles_total").increment(1);
        gauge!("relay_seen_len").set(seen.len() as f64);
        gauge!("relay_last_cycle_ts").set(now as f64);

        report
    }

    /// Install (or replace) the target sink. Last write wins.
    pub fn configure_sink(&self, sink: TargetSink) {
        tracing::info!(mention_role = ?sink.mention_role, "target sink configured");
        *self.sink.write().expect("sink lock poisoned") = Some(sink);
    }

    pub fn target_sink(&self) -> Option<TargetSink> {
        self.sink.read().expect("sink lock poisoned").clone()
    }

    /// Returns false when the series was already followed.
    pub fn follow_series(&self, kind: SeriesKind, name: &str) -> bool {
        self.watchlist
            .write()
            .expect("watchlist lock poisoned")
            .follow(kind, name)
    }

    /// Series lookup with the source-boundary failure policy: a failed call
    /// reads as not-found.
    pub async fn lookup_series(&self, name: &str, kind: SeriesKind) -> Option<SeriesInfo> {
        match self.lookup.lookup_series(name, kind).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(error = ?e, series = name, "series lookup failed");
                None
            }
        }
    }

    pub fn status(&self) -> RelayStatus {
        let followed = self
            .watchlist
            .read()
            .expect("watchlist lock poisoned")
            .followed()
            .len();
        let last = self.stats.last_cycle_unix.load(Ordering::Relaxed);
        RelayStatus {
            sink_configured: self.target_sink().is_some(),
            followed_series: followed,
            seen_len: self.stats.seen_len.load(Ordering::Relaxed) as usize,
            cycles_run: self.stats.cycles.load(Ordering::Relaxed),
            announced_total: self.stats.announced.load(Ordering::Relaxed),
            last_cycle_unix: (last > 0).then_some(last),
            interval_secs: self.interval_secs,
        }
    }
}
