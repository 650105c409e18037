//! Demo that pushes two sample items through the real notifier
//! (requires DISCORD_WEBHOOK_URL; logs and exits otherwise).

use anime_news_relay::notify::discord::DiscordNotifier;
use anime_news_relay::notify::{AnnouncementSink, TargetSink};
use anime_news_relay::sources::types::{CandidateItem, ItemCategory};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();
    let _ = dotenvy::dotenv();

    let Ok(webhook_url) = std::env::var("DISCORD_WEBHOOK_URL") else {
        tracing::warn!("DISCORD_WEBHOOK_URL not set; nothing to do");
        return;
    };
    let sink = TargetSink {
        webhook_url,
        mention_role: std::env::var("MENTION_ROLE_ID").ok(),
    };

    let items = [
        CandidateItem {
            category: ItemCategory::NewAnnouncement,
            title: "Demo: Dandadan 2nd Season".to_string(),
            url: "https://anilist.co/".to_string(),
            posted_at: "2026-7-?".to_string(),
            format: Some("TV".to_string()),
            subreddit: None,
        },
        CandidateItem {
            category: ItemCategory::FeedPost,
            title: "Demo: One Piece season 2 confirmed!".to_string(),
            url: "https://reddit.com/r/anime/".to_string(),
            posted_at: "1723000123".to_string(),
            format: None,
            subreddit: Some("anime".to_string()),
        },
    ];

    let notifier = DiscordNotifier::new();
    for item in &items {
        match notifier.announce(item, &sink).await {
            Ok(()) => tracing::info!(title = %item.title, "sent"),
            Err(e) => tracing::warn!(error = ?e, title = %item.title, "send failed"),
        }
        tokio::time::sleep(std::time::Duration::from_millis(400)).await;
    }

    println!("announce-demo done");
}
