// src/notify/discord.rs
use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{AnnouncementSink, TargetSink};
use crate::sources::types::{CandidateItem, ItemCategory};

const COLOR_ANNOUNCEMENT: u32 = 0x00FF00;
const COLOR_FEED: u32 = 0xFF9900;

#[derive(Clone)]
pub struct DiscordNotifier {
    client: Client,
    timeout: Duration,
    max_retries: u8,
}

impl DiscordNotifier {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    async fn post_webhook(&self, webhook: &str, payload: &DiscordWebhookPayload) -> Result<()> {
        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(webhook)
                .timeout(self.timeout)
                .json(payload)
                .send()
                .await;

            match res {
                Ok(rsp) => {
                    if let Err(e) = rsp.error_for_status_ref() {
                        if attempt < self.max_retries {
                            tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1)))
                                .await;
                            continue;
                        }
                        return Err(anyhow!("Discord webhook HTTP error: {e}"));
                    }
                    return Ok(());
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1))).await;
                        continue;
                    }
                    return Err(anyhow!("Discord webhook request failed: {e}"));
                }
            }
        }
    }
}

impl Default for DiscordNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AnnouncementSink for DiscordNotifier {
    async fn announce(&self, item: &CandidateItem, sink: &TargetSink) -> Result<()> {
        let payload = render(item, sink);
        self.post_webhook(&sink.webhook_url, &payload).await
    }
}

/// Category-specific templates: celebratory for catalog announcements,
/// cautionary for unconfirmed feed reports.
pub(crate) fn render(item: &CandidateItem, sink: &TargetSink) -> DiscordWebhookPayload {
    match item.category {
        ItemCategory::NewAnnouncement => {
            let embed = DiscordEmbed {
                title: "\u{1F38A} New anime announced!".to_string(),
                description: format!("**{}**", item.title),
                color: COLOR_ANNOUNCEMENT,
                url: non_empty(&item.url),
                fields: vec![
                    EmbedField::inline("Format", item.format.as_deref().unwrap_or("?")),
                    EmbedField::inline("Estimated date", &item.posted_at),
                    EmbedField::inline("Type", "New anime"),
                ],
                footer: Some(EmbedFooter {
                    text: "AniList".to_string(),
                }),
            };
            let content = match &sink.mention_role {
                Some(role) => format!("<@&{role}> New anime announced!"),
                None => "New anime announced!".to_string(),
            };
            DiscordWebhookPayload {
                content: Some(content),
                embeds: vec![embed],
            }
        }
        ItemCategory::FeedPost => {
            let subfeed = item.subreddit.as_deref().unwrap_or("anime");
            let embed = DiscordEmbed {
                title: "\u{1F50D} Possible news / leak".to_string(),
                description: item.title.clone(),
                color: COLOR_FEED,
                url: non_empty(&item.url),
                fields: vec![
                    EmbedField::inline("Source", &format!("r/{subfeed}")),
                    EmbedField::inline("Type", "Feed report"),
                ],
                footer: Some(EmbedFooter {
                    text: "\u{26A0}\u{FE0F} Unconfirmed information".to_string(),
                }),
            };
            DiscordWebhookPayload {
                content: None,
                embeds: vec![embed],
            }
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DiscordWebhookPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub embeds: Vec<DiscordEmbed>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DiscordEmbed {
    pub title: String,
    pub description: String,
    pub color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    fn inline(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            inline: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct EmbedFooter {
    pub text: String,
}
