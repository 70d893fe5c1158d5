//! Wire types for the v1 REST API.
//!
//! Payload fields the plugin does not consume are not modeled; serde skips
//! them. Fields the backend has historically omitted or renamed carry
//! `#[serde(default)]` so a sparse payload still decodes.
use serde::Deserialize;
use std::collections::BTreeMap;

// ============================================================================
// Envelope
// ============================================================================

/// Response envelope shared by every endpoint. `pagination` arrives as a
/// sibling of `data`, not nested inside it.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Paging state. `total` is -1 for a session that has not loaded yet; the
/// backend itself always reports a non-negative total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub total: i64,
}

impl Pagination {
    /// State of a session before its first page has been fetched.
    pub fn fresh(limit: u64) -> Self {
        Self {
            offset: 0,
            limit,
            total: -1,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.total >= 0
    }

    /// True when another page exists beyond the one described here.
    pub fn has_more(&self) -> bool {
        self.is_loaded() && self.offset.saturating_add(self.limit) < self.total as u64
    }
}

/// One fetched page of a paged endpoint, normalized across the flat (shows)
/// and nested (episodes) payload layouts.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub pagination: Pagination,
    pub items: Vec<T>,
    /// Bean id → display name lookup carried by episode payloads.
    pub beans: BTreeMap<String, String>,
}

impl<T> Page<T> {
    pub fn new(pagination: Pagination, items: Vec<T>) -> Self {
        Self {
            pagination,
            items,
            beans: BTreeMap::new(),
        }
    }

    pub fn with_beans(mut self, beans: BTreeMap<String, String>) -> Self {
        self.beans = beans;
        self
    }
}

// ============================================================================
// Entities
// ============================================================================

/// One variant of an artwork set (e.g. "small", "large").
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageVariant {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Picks the variant named `name`, falling back to the last variant that
/// carries a URL when no name matches.
pub fn image_url<'a>(variants: &'a [ImageVariant], name: &str) -> Option<&'a str> {
    let mut candidate = None;
    for variant in variants {
        if let Some(url) = variant.url.as_deref() {
            candidate = Some(url);
            if variant.name.as_deref() == Some(name) {
                break;
            }
        }
    }
    candidate
}

/// Show as listed by the directory and search endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowPreview {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default, rename = "isTruePodcast")]
    pub is_true_podcast: bool,
    #[serde(default)]
    pub thumbnail: Vec<ImageVariant>,
    /// Set when older items stay on screen while an extension is rendered.
    #[serde(skip)]
    pub preload: bool,
    #[serde(skip)]
    pub preload_offset: u64,
}

impl ShowPreview {
    pub fn thumbnail_url(&self, name: &str) -> Option<&str> {
        image_url(&self.thumbnail, name)
    }
}

/// Full show record from `/media/show/{ID}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Show {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default, rename = "isTruePodcast")]
    pub is_true_podcast: bool,
    #[serde(default, rename = "hasUnsortedEpisodes")]
    pub has_unsorted_episodes: bool,
    #[serde(default)]
    pub thumbnail: Vec<ImageVariant>,
    #[serde(default)]
    pub slideshow: Vec<ImageVariant>,
    #[serde(default)]
    pub seasons: Vec<Season>,
    #[serde(default, rename = "showreelURL")]
    pub showreel_url: Option<String>,
}

impl Show {
    pub fn thumbnail_url(&self, name: &str) -> Option<&str> {
        image_url(&self.thumbnail, name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Season {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "numEpisodes")]
    pub num_episodes: i64,
}

/// Playback token attached to an episode.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaToken {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Hosting service of a playable token, in selection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoService {
    Youtube,
    Twitch,
    Soundcloud,
}

impl VideoService {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoService::Youtube => "youtube",
            VideoService::Twitch => "twitch",
            VideoService::Soundcloud => "soundcloud",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Episode {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "showId")]
    pub show_id: Option<i64>,
    #[serde(default, rename = "showName")]
    pub show_name: Option<String>,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default, rename = "distributionPublishingDate")]
    pub distribution_publishing_date: Option<String>,
    /// The backend has shipped this misspelled variant; keep accepting it.
    #[serde(default, rename = "distibutionPublishingDate")]
    pub distibution_publishing_date: Option<String>,
    #[serde(default, rename = "firstBroadcastdate")]
    pub first_broadcastdate: Option<String>,
    #[serde(default)]
    pub thumbnail: Vec<ImageVariant>,
    #[serde(default)]
    pub tokens: Vec<MediaToken>,
    #[serde(default)]
    pub next: Option<Box<Episode>>,
    #[serde(default)]
    pub prev: Option<Box<Episode>>,
    /// Set when older items stay on screen while an extension is rendered.
    #[serde(skip)]
    pub preload: bool,
    #[serde(skip)]
    pub preload_offset: u64,
}

impl Episode {
    pub fn thumbnail_url(&self, name: &str) -> Option<&str> {
        image_url(&self.thumbnail, name)
    }

    /// Release date string, preferring the fields the backend has used over
    /// time in the order it introduced them.
    pub fn release_date(&self) -> Option<&str> {
        self.distribution_publishing_date
            .as_deref()
            .or(self.distibution_publishing_date.as_deref())
            .or(self.first_broadcastdate.as_deref())
    }

    /// Release date parsed as a timestamp. `None` when absent or malformed.
    pub fn release_time(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        chrono::DateTime::parse_from_rfc3339(self.release_date()?).ok()
    }

    /// The playable token, picked by service priority: YouTube first, then
    /// Twitch, then Soundcloud.
    pub fn video_token(&self) -> Option<(VideoService, &str)> {
        for service in [
            VideoService::Youtube,
            VideoService::Twitch,
            VideoService::Soundcloud,
        ] {
            let found = self.tokens.iter().find_map(|t| match (&t.kind, &t.token) {
                (Some(kind), Some(token)) if kind == service.as_str() && !token.is_empty() => {
                    Some(token.as_str())
                }
                _ => None,
            });
            if let Some(token) = found {
                return Some((service, token));
            }
        }
        None
    }
}

/// Payload of every episode endpoint: the page items plus a bean id → name
/// lookup for the people appearing in them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EpisodePage {
    #[serde(default)]
    pub episodes: Vec<Episode>,
    #[serde(default)]
    pub bohnen: BTreeMap<String, String>,
}

/// Crew member ("Bohne"). The directory and detail endpoints disagree on
/// the name field, so both are modeled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Bean {
    #[serde(default)]
    pub mgmtid: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "computedName")]
    pub computed_name: Option<String>,
    #[serde(default, rename = "episodeCount")]
    pub episode_count: Option<i64>,
    #[serde(default)]
    pub images: Vec<ImageVariant>,
}

impl Bean {
    pub fn display_name(&self) -> Option<&str> {
        self.computed_name.as_deref().or(self.name.as_deref())
    }

    pub fn image(&self, name: &str) -> Option<&str> {
        image_url(&self.images, name)
    }
}

/// Combined payload of `/search/{EXPRESSION}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub shows: Vec<ShowPreview>,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

// ============================================================================
// Tests
// ============================================================================
