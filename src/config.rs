// src/config.rs
//! Process configuration from the environment. Absence of a webhook means
//! the scheduler runs in no-op mode until the operator calls /setup.

use std::env;

use crate::notify::TargetSink;

pub const ENV_WEBHOOK_URL: &str = "DISCORD_WEBHOOK_URL";
pub const ENV_MENTION_ROLE: &str = "MENTION_ROLE_ID";
pub const ENV_INTERVAL_MINUTES: &str = "CHECK_INTERVAL_MINUTES";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";

pub const DEFAULT_INTERVAL_MINUTES: u64 = 15;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub interval_secs: u64,
    pub webhook_url: Option<String>,
    pub mention_role: Option<String>,
    pub bind_addr: String,
}

impl RelayConfig {
    pub fn from_env() -> Self {
        let minutes: u64 = env::var(ENV_INTERVAL_MINUTES)
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|m| *m > 0)
            .unwrap_or(DEFAULT_INTERVAL_MINUTES);

        Self {
            interval_secs: minutes * 60,
            webhook_url: non_empty_var(ENV_WEBHOOK_URL),
            mention_role: non_empty_var(ENV_MENTION_ROLE),
            bind_addr: non_empty_var(ENV_BIND_ADDR)
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        }
    }

    pub fn default_sink(&self) -> Option<TargetSink> {
        self.webhook_url.as_ref().map(|url| TargetSink {
            webhook_url: url.clone(),
            mention_role: self.mention_role.clone(),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
