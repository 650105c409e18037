//! Notification relay binary entrypoint.
//! Wires the poll scheduler, the operator command surface, and metrics.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use anime_news_relay::config::RelayConfig;
use anime_news_relay::metrics::Metrics;
use anime_news_relay::relay::Relay;
use anime_news_relay::watchlist::Watchlist;
use anime_news_relay::{api, scheduler};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("anime_news_relay=info,relay=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = RelayConfig::from_env();

    let watchlist = match Watchlist::load_default() {
        Ok(wl) => wl,
        Err(e) => {
            tracing::warn!(error = ?e, "watchlist config failed to load; using built-in lists");
            Watchlist::builtin()
        }
    };
    let watchlist = Arc::new(RwLock::new(watchlist));

    let relay = Arc::new(Relay::new(&cfg, watchlist));
    if relay.target_sink().is_none() {
        tracing::info!("no webhook configured; polling idles until /setup");
    }

    let metrics = Metrics::init(cfg.interval_secs);
    let _poll = scheduler::spawn_poll_scheduler(
        relay.clone(),
        Duration::from_secs(cfg.interval_secs),
    );

    let router = api::create_router(api::AppState { relay }).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!(addr = %cfg.bind_addr, "relay listening");
    axum::serve(listener, router).await?;
    Ok(())
}
