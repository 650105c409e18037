// src/sources/mod.rs
pub mod anilist;
pub mod reddit;
pub mod types;

use crate::sources::types::{CandidateItem, NewsSource};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("relay_items_total", "Candidate items parsed from sources.");
        describe_counter!("relay_announced_total", "Items announced to the sink.");
        describe_counter!(
            "relay_send_errors_total",
            "Announce dispatch failures (item retried next cycle)."
        );
        describe_counter!(
            "relay_source_errors_total",
            "Source fetch/parse errors absorbed as empty batches."
        );
        describe_counter!("relay_cycles_total", "Completed poll cycles.");
        describe_histogram!("relay_fetch_ms", "Source fetch+parse time in milliseconds.");
        describe_gauge!("relay_seen_len", "Identifiers currently held in the seen set.");
        describe_gauge!("relay_last_cycle_ts", "Unix ts when a poll cycle last ran.");
    });
}

/// Normalize a source-provided title: decode HTML entities (the listing API
/// escapes them), collapse whitespace, trim.
pub fn normalize_title(s: &str) -> String {
    let out = html_escape::decode_html_entities(s).to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&out, " ").trim().to_string()
}

/// Fetch from one source, absorbing any transport/parse error as an empty
/// batch for this cycle. Source failures are never fatal to the scheduler.
pub async fn fetch_or_empty(source: &dyn NewsSource) -> Vec<CandidateItem> {
    match source.fetch_latest().await {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(error = ?e, source = source.name(), "source error");
            counter!("relay_source_errors_total").increment(1);
            Vec::new()
        }
    }
}
