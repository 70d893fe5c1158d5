use crate::api::routes::{EpisodesOrder, ShowsFilter, ShowsOrder};
use crate::api::types::{Episode, Page, Pagination, ShowPreview};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Ticket handed out when a page load starts. A session only accepts the
/// response that carries its most recently issued ticket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Issues the next ticket from the shared counter. Tickets start at 1,
    /// so the default token of a fresh session never matches an issued one.
    pub fn next(counter: &AtomicU64) -> Self {
        Self(counter.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// Which list a session belongs to. The noun names the list in user-facing
/// supersede errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Shows,
    ShowEpisodes,
    SeasonEpisodes,
    NewEpisodes,
    BeanEpisodes,
}

impl ListKind {
    pub fn noun(self) -> &'static str {
        match self {
            ListKind::Shows => "show list",
            ListKind::ShowEpisodes => "show episode list",
            ListKind::SeasonEpisodes => "season episode list",
            ListKind::NewEpisodes => "new episode list",
            ListKind::BeanEpisodes => "bean episode list",
        }
    }
}

/// Identity of a list session. Order and filter are kept as the request
/// parameter strings, so any change in what would be sent to the server
/// changes the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListKey {
    pub kind: ListKind,
    pub id: Option<String>,
    pub order: Option<String>,
    pub filter: Option<String>,
}

impl ListKey {
    pub fn shows(order: Option<ShowsOrder>, filter: Option<ShowsFilter>) -> Self {
        Self {
            kind: ListKind::Shows,
            id: None,
            order: order.map(|o| o.as_param().to_owned()),
            filter: filter.map(|f| f.as_param().to_owned()),
        }
    }

    pub fn show_episodes(id: &str, order: EpisodesOrder) -> Self {
        Self {
            kind: ListKind::ShowEpisodes,
            id: Some(id.to_owned()),
            order: Some(order.as_param().to_owned()),
            filter: None,
        }
    }

    pub fn season_episodes(id: &str, order: EpisodesOrder) -> Self {
        Self {
            kind: ListKind::SeasonEpisodes,
            id: Some(id.to_owned()),
            order: Some(order.as_param().to_owned()),
            filter: None,
        }
    }

    pub fn new_episodes() -> Self {
        Self {
            kind: ListKind::NewEpisodes,
            id: None,
            order: None,
            filter: None,
        }
    }

    pub fn bean_episodes(id: &str, order: EpisodesOrder) -> Self {
        Self {
            kind: ListKind::BeanEpisodes,
            id: Some(id.to_owned()),
            order: Some(order.as_param().to_owned()),
            filter: None,
        }
    }
}

/// Items that can be marked as already-rendered when an extension appends
/// a page after them.
pub trait Preloadable {
    fn tag_preload(&mut self, offset: u64);
}

impl Preloadable for ShowPreview {
    fn tag_preload(&mut self, offset: u64) {
        self.preload = true;
        self.preload_offset = offset;
    }
}

impl Preloadable for Episode {
    fn tag_preload(&mut self, offset: u64) {
        self.preload = true;
        self.preload_offset = offset;
    }
}

/// Accumulated state of one paged list.
///
/// A session is created fresh for a key, loads its first page, and extends
/// by appending further pages until the reported total is reached or the
/// key changes. The creation time is fixed; a session past its TTL is
/// replaced rather than refreshed.
#[derive(Debug)]
pub struct ListSession<T> {
    key: ListKey,
    pagination: Pagination,
    items: Option<Vec<T>>,
    beans: BTreeMap<String, String>,
    extendable: bool,
    token: RequestToken,
    created_at: Instant,
}

/// Owned copy of a session's renderable state.
#[derive(Debug, Clone)]
pub struct ListSnapshot<T> {
    pub pagination: Pagination,
    pub items: Vec<T>,
    pub extendable: bool,
    pub beans: BTreeMap<String, String>,
}

impl<T> ListSession<T> {
    fn fresh(key: ListKey, limit: u64) -> Self {
        Self {
            key,
            pagination: Pagination::fresh(limit),
            items: None,
            beans: BTreeMap::new(),
            extendable: false,
            token: RequestToken::default(),
            created_at: Instant::now(),
        }
    }

    /// Returns `current` when it matches `key` and is still within its TTL,
    /// otherwise a fresh session for `key`.
    pub fn validated(current: Option<Self>, key: &ListKey, limit: u64, ttl: Duration) -> Self {
        match current {
            Some(session) if session.key == *key && session.is_fresh(ttl) => session,
            _ => Self::fresh(key.clone(), limit),
        }
    }

    pub fn key(&self) -> &ListKey {
        &self.key
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() < ttl
    }

    /// Whether a request should go out. An initial load only runs while no
    /// total is known; an extension only runs while pages remain.
    pub fn should_load(&self, extend: bool) -> bool {
        if extend {
            self.pagination.has_more()
        } else {
            !self.pagination.is_loaded()
        }
    }

    /// Issues the ticket for the next request and remembers it as the only
    /// one this session will still accept.
    pub fn start_load(&mut self, counter: &AtomicU64) -> RequestToken {
        let token = RequestToken::next(counter);
        self.token = token;
        token
    }

    /// Whether the response carrying `token` is still the expected one.
    pub fn stop_load(&self, token: RequestToken) -> bool {
        self.token == token
    }

    /// Offset for the next request: past the loaded window once a total is
    /// known, the initial offset before that.
    pub fn next_offset(&self) -> u64 {
        if self.pagination.is_loaded() {
            self.pagination.offset + self.pagination.limit
        } else {
            self.pagination.offset
        }
    }

    pub fn limit(&self) -> u64 {
        self.pagination.limit
    }

    /// Folds a fetched page into the session. The reported pagination
    /// replaces the stored one. Crew names merge without overwriting
    /// entries seen earlier. When a page is appended to existing items,
    /// every earlier item is re-marked as preloaded with its distance from
    /// the seam.
    pub fn merge_page(&mut self, page: Page<T>)
    where
        T: Preloadable,
    {
        self.extendable = page.pagination.has_more();
        self.pagination = page.pagination;

        for (id, name) in page.beans {
            self.beans.entry(id).or_insert(name);
        }

        let incoming = page.items;
        self.items = match self.items.take() {
            Some(mut previous) if !previous.is_empty() && !incoming.is_empty() => {
                let seam = previous.len();
                for (i, item) in previous.iter_mut().enumerate() {
                    item.tag_preload((seam - 1 - i) as u64);
                }
                previous.extend(incoming);
                Some(previous)
            }
            Some(previous) if !previous.is_empty() => Some(previous),
            _ => Some(incoming),
        };
    }

    pub fn snapshot(&self) -> ListSnapshot<T>
    where
        T: Clone,
    {
        ListSnapshot {
            pagination: self.pagination,
            items: self.items.clone().unwrap_or_default(),
            extendable: self.extendable,
            beans: self.beans.clone(),
        }
    }
}
