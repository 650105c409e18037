// src/watchlist.rs
//! Injected match configuration for the feed filter: keyword terms, series
//! match terms, and the runtime-extendable followed-series list.

use std::fmt;
use std::path::{Path, PathBuf};
use std::{env, fs};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_WATCHLIST_CONFIG_PATH: &str = "config/watchlist.toml";
pub const ENV_WATCHLIST_CONFIG_PATH: &str = "WATCHLIST_CONFIG_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Manga,
    Anime,
}

impl SeriesKind {
    /// Lenient operator-input parse; anything outside {manga, anime} is invalid.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manga" => Some(Self::Manga),
            "anime" => Some(Self::Anime),
            _ => None,
        }
    }

    /// The catalog API's MediaType tag.
    pub fn as_media_type(self) -> &'static str {
        match self {
            Self::Manga => "MANGA",
            Self::Anime => "ANIME",
        }
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manga => f.write_str("manga"),
            Self::Anime => f.write_str("anime"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowedSeries {
    pub kind: SeriesKind,
    pub name: String,
}

/// On-disk schema (TOML).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchlistConfig {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub match_terms: Vec<String>,
    #[serde(default)]
    pub series: Vec<FollowedSeries>,
}

/// Compiled watchlist consulted by the feed filter. Term lists are held
/// lowercased; matching is case-insensitive substring on titles only.
#[derive(Debug, Clone, Default)]
pub struct Watchlist {
    keywords: Vec<String>,
    match_terms: Vec<String>,
    followed: Vec<FollowedSeries>,
}

const BUILTIN_KEYWORDS: &[&str] = &[
    "season 2",
    "season 3",
    "sequel",
    "announced",
    "confirmed",
    "leak",
    "rumor",
    "adaptation",
    "trailer",
    "release date",
    "anime awards",
    "cancel",
    "renewed",
    "delay",
];

const BUILTIN_MATCH_TERMS: &[&str] = &[
    "roshidere",
    "100 girlfriends",
    "dandadan",
    "spy x family",
    "one piece",
    "when will her tears dry",
];

fn clean_terms<I: IntoIterator<Item = String>>(items: I) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let t = item.trim().to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

impl Watchlist {
    /// Defaults used when no config file is present.
    pub fn builtin() -> Self {
        Self::from_config(WatchlistConfig {
            keywords: BUILTIN_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            match_terms: BUILTIN_MATCH_TERMS.iter().map(|s| s.to_string()).collect(),
            series: Vec::new(),
        })
    }

    pub fn from_config(cfg: WatchlistConfig) -> Self {
        let mut wl = Self {
            keywords: clean_terms(cfg.keywords),
            match_terms: clean_terms(cfg.match_terms),
            followed: Vec::new(),
        };
        for s in cfg.series {
            wl.follow(s.kind, &s.name);
        }
        wl
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: WatchlistConfig = toml::from_str(s).context("parsing watchlist toml")?;
        Ok(Self::from_config(cfg))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading watchlist from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load using env var + fallbacks:
    /// 1) $WATCHLIST_CONFIG_PATH (must exist)
    /// 2) config/watchlist.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = env::var(ENV_WATCHLIST_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("WATCHLIST_CONFIG_PATH points to non-existent path"));
        }
        let default = PathBuf::from(DEFAULT_WATCHLIST_CONFIG_PATH);
        if default.exists() {
            return Self::load_from(&default);
        }
        Ok(Self::builtin())
    }

    /// True iff the lower-cased title contains any keyword or series term.
    pub fn matches_title(&self, title: &str) -> bool {
        let t = title.to_lowercase();
        self.keywords.iter().any(|k| t.contains(k.as_str()))
            || self.match_terms.iter().any(|s| t.contains(s.as_str()))
    }

    /// Append a followed series. Returns false when the (kind, name) pair is
    /// already present. New names also join the title match terms.
    pub fn follow(&mut self, kind: SeriesKind, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let dup = self
            .followed
            .iter()
            .any(|s| s.kind == kind && s.name.eq_ignore_ascii_case(name));
        if dup {
            return false;
        }
        self.followed.push(FollowedSeries {
            kind,
            name: name.to_string(),
        });
        let term = name.to_lowercase();
        if !self.match_terms.contains(&term) {
            self.match_terms.push(term);
        }
        true
    }

    pub fn followed(&self) -> &[FollowedSeries] {
        &self.followed
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn match_terms(&self) -> &[String] {
        &self.match_terms
    }
}
