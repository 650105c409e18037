// src/notify/mod.rs
pub mod discord;

use anyhow::Result;

use crate::sources::types::CandidateItem;

/// Destination channel for rendered alerts. Single process-wide instance,
/// last-write-wins on reconfiguration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TargetSink {
    pub webhook_url: String,
    #[serde(default)]
    pub mention_role: Option<String>,
}

#[async_trait::async_trait]
pub trait AnnouncementSink: Send + Sync {
    /// Render the item as a category-specific message and dispatch it.
    async fn announce(&self, item: &CandidateItem, sink: &TargetSink) -> Result<()>;
}
