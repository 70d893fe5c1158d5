//! Drives the browsing sessions against the REST client: validates session
//! identity, gates duplicate loads, discards superseded responses and folds
//! accepted pages into the stored state.

use crate::api::routes::{EpisodesOrder, PageQuery, ShowsFilter, ShowsOrder};
use crate::api::types::{Bean, Episode, EpisodePage, Page, SearchResults, Show, ShowPreview};
use crate::api::ApiClient;
use crate::backdrop::Backdrop;
use crate::config::{Config, ConfigError};
use crate::error::BackendError;
use crate::request::{ContentRequest, ExtendRequest};
use crate::session::list::{ListKey, ListKind, ListSession, ListSnapshot, Preloadable};
use crate::session::search::{normalize_expression, SearchSession};
use crate::session::sort::{BeanDirectory, BeansOrder};
use std::future::Future;
use std::sync::atomic::AtomicU64;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Show id of the standing events channel featured on the overview.
const EVENT_SHOW_ID: &str = "405";
/// Episodes fetched per overview strip.
const OVERVIEW_EPISODES_LIMIT: u64 = 4;
/// Shows fetched per overview shelf.
const OVERVIEW_SHOWS_LIMIT: u64 = 6;

// A poisoned session lock is recoverable; sessions hold plain data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// The four overview strips, fetched in parallel.
#[derive(Debug, Clone)]
pub struct Overview {
    pub new_episodes: Vec<Episode>,
    pub event_episodes: Vec<Episode>,
    pub shows: Vec<ShowPreview>,
    pub podcasts: Vec<ShowPreview>,
}

/// Payload of a resolved content request.
#[derive(Debug)]
pub enum ContentData {
    Overview(Overview),
    ShowList(ListSnapshot<ShowPreview>),
    /// Show detail and its episode list load in parallel and fail
    /// independently; a missing episode list does not sink the show.
    Show {
        show: Result<Show, BackendError>,
        episodes: Result<ListSnapshot<Episode>, BackendError>,
    },
    NewEpisodes(ListSnapshot<Episode>),
    Beans(Vec<Bean>),
    Bean {
        bean: Result<Bean, BackendError>,
        episodes: Result<ListSnapshot<Episode>, BackendError>,
    },
    /// `None` when the expression was out of bounds and no search ran.
    Search(Option<SearchResults>),
}

/// Payload of a resolved extension request.
#[derive(Debug)]
pub enum ExtensionData {
    Shows(ListSnapshot<ShowPreview>),
    Episodes(ListSnapshot<Episode>),
}

/// Stateful facade over the REST API.
///
/// One slot per list family: the show directory, the episode lists (all four
/// kinds share one slot, keyed by identity), the active search and the crew
/// directory. Slots are locked only to read or update state, never across a
/// request.
#[derive(Debug)]
pub struct Backend {
    api: ApiClient,
    shows: Mutex<Option<ListSession<ShowPreview>>>,
    episodes: Mutex<Option<ListSession<Episode>>>,
    search: Mutex<Option<SearchSession>>,
    beans: Mutex<Option<BeanDirectory>>,
    tokens: AtomicU64,
    session_ttl: Duration,
    page_limit: u64,
}

impl Backend {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            api: ApiClient::from_config(config)?,
            shows: Mutex::new(None),
            episodes: Mutex::new(None),
            search: Mutex::new(None),
            beans: Mutex::new(None),
            tokens: AtomicU64::new(0),
            session_ttl: config.session_ttl(),
            page_limit: config.page_limit,
        })
    }

    // ========================================================================
    // Request dispatch
    // ========================================================================

    pub async fn resolve(&self, request: &ContentRequest) -> Result<ContentData, BackendError> {
        match request {
            ContentRequest::Overview => Ok(ContentData::Overview(self.overview().await?)),
            ContentRequest::Shows { order, filter } => Ok(ContentData::ShowList(
                self.show_list(*order, *filter).await?,
            )),
            ContentRequest::Show { id, season, order } => {
                let (show, episodes) = self
                    .show_with_episodes(id, season.as_deref(), *order)
                    .await;
                Ok(ContentData::Show { show, episodes })
            }
            ContentRequest::NewEpisodes => {
                Ok(ContentData::NewEpisodes(self.new_episode_list().await?))
            }
            ContentRequest::Beans { order } => Ok(ContentData::Beans(self.beans(*order).await?)),
            ContentRequest::Bean { id, order } => {
                let (bean, episodes) = self.bean_with_episodes(id, *order).await;
                Ok(ContentData::Bean { bean, episodes })
            }
            ContentRequest::Search { expression } => {
                Ok(ContentData::Search(self.search(expression).await?))
            }
        }
    }

    /// Resolves an extension request against the stored session. `None` when
    /// no matching session exists, so there is nothing to extend.
    pub async fn resolve_extension(
        &self,
        request: &ExtendRequest,
    ) -> Result<Option<ExtensionData>, BackendError> {
        match request {
            ExtendRequest::Shows => Ok(self
                .extend_show_list()
                .await?
                .map(ExtensionData::Shows)),
            ExtendRequest::ShowEpisodes => Ok(self
                .extend_episode_list(ListKind::ShowEpisodes)
                .await?
                .map(ExtensionData::Episodes)),
            ExtendRequest::SeasonEpisodes => Ok(self
                .extend_episode_list(ListKind::SeasonEpisodes)
                .await?
                .map(ExtensionData::Episodes)),
            ExtendRequest::NewEpisodes => Ok(self
                .extend_episode_list(ListKind::NewEpisodes)
                .await?
                .map(ExtensionData::Episodes)),
            ExtendRequest::BeanEpisodes => Ok(self
                .extend_episode_list(ListKind::BeanEpisodes)
                .await?
                .map(ExtensionData::Episodes)),
        }
    }

    // ========================================================================
    // List sessions
    // ========================================================================

    /// Runs one load cycle of a list session. The slot is locked to validate
    /// identity, gate the load and issue the ticket, then released for the
    /// request and re-locked to merge. A response that comes back to a slot
    /// with a newer ticket is discarded as superseded; a failed load clears
    /// the slot so the next request starts over.
    async fn drive_list<T, F, Fut>(
        &self,
        slot: &Mutex<Option<ListSession<T>>>,
        key: ListKey,
        extend: bool,
        fetch: F,
    ) -> Result<ListSnapshot<T>, BackendError>
    where
        T: Preloadable + Clone,
        F: FnOnce(PageQuery) -> Fut,
        Fut: Future<Output = Result<Page<T>, BackendError>>,
    {
        let (token, query) = {
            let mut guard = lock(slot);
            let mut session =
                ListSession::validated(guard.take(), &key, self.page_limit, self.session_ttl);
            if !session.should_load(extend) {
                tracing::trace!(list = key.kind.noun(), "Serving session without a request");
                let snapshot = session.snapshot();
                *guard = Some(session);
                return Ok(snapshot);
            }
            let token = session.start_load(&self.tokens);
            let query = PageQuery {
                offset: session.next_offset(),
                limit: session.limit(),
            };
            *guard = Some(session);
            (token, query)
        };

        let result = fetch(query).await;

        let mut guard = lock(slot);
        match result {
            Err(err) => {
                if err.is_transient() {
                    tracing::warn!(list = key.kind.noun(), error = %err, "List load failed");
                } else {
                    tracing::error!(list = key.kind.noun(), error = %err, "List load failed");
                }
                *guard = None;
                Err(err)
            }
            Ok(page) => match guard.as_mut() {
                Some(session) if session.stop_load(token) => {
                    session.merge_page(page);
                    Ok(session.snapshot())
                }
                _ => {
                    tracing::debug!(list = key.kind.noun(), "Discarding superseded response");
                    Err(BackendError::Superseded(key.kind.noun()))
                }
            },
        }
    }

    pub async fn show_list(
        &self,
        order: Option<ShowsOrder>,
        filter: Option<ShowsFilter>,
    ) -> Result<ListSnapshot<ShowPreview>, BackendError> {
        let key = ListKey::shows(order, filter);
        self.drive_list(&self.shows, key, false, |query| {
            self.api.shows(query, order, filter, false)
        })
        .await
    }

    /// Extends the stored show list by one page. `None` without a session.
    pub async fn extend_show_list(
        &self,
    ) -> Result<Option<ListSnapshot<ShowPreview>>, BackendError> {
        let key = lock(&self.shows).as_ref().map(|s| s.key().clone());
        let Some(key) = key else {
            return Ok(None);
        };
        let order = key.order.as_deref().and_then(ShowsOrder::from_param);
        let filter = key.filter.as_deref().and_then(ShowsFilter::from_param);
        let snapshot = self
            .drive_list(&self.shows, key, true, |query| {
                self.api.shows(query, order, filter, false)
            })
            .await?;
        Ok(Some(snapshot))
    }

    pub async fn show_episode_list(
        &self,
        id: &str,
        order: EpisodesOrder,
    ) -> Result<ListSnapshot<Episode>, BackendError> {
        check_id(id)?;
        let key = ListKey::show_episodes(id, order);
        self.drive_list(&self.episodes, key, false, |query| {
            self.api.show_episodes(id, query, order, false)
        })
        .await
    }

    pub async fn season_episode_list(
        &self,
        id: &str,
        order: EpisodesOrder,
    ) -> Result<ListSnapshot<Episode>, BackendError> {
        check_id(id)?;
        let key = ListKey::season_episodes(id, order);
        self.drive_list(&self.episodes, key, false, |query| {
            self.api.season_episodes(id, query, order, false)
        })
        .await
    }

    /// Newest episodes across all shows. Always newest-first.
    pub async fn new_episode_list(&self) -> Result<ListSnapshot<Episode>, BackendError> {
        let key = ListKey::new_episodes();
        self.drive_list(&self.episodes, key, false, |query| {
            self.api.new_episodes(query, EpisodesOrder::Newest, false)
        })
        .await
    }

    pub async fn bean_episode_list(
        &self,
        id: &str,
        order: EpisodesOrder,
    ) -> Result<ListSnapshot<Episode>, BackendError> {
        check_id(id)?;
        let key = ListKey::bean_episodes(id, order);
        self.drive_list(&self.episodes, key, false, |query| {
            self.api.bean_episodes(id, query, order, false)
        })
        .await
    }

    /// Extends the stored episode list by one page, provided it is of the
    /// expected kind. The request is re-derived from the stored identity.
    async fn extend_episode_list(
        &self,
        kind: ListKind,
    ) -> Result<Option<ListSnapshot<Episode>>, BackendError> {
        let key = lock(&self.episodes)
            .as_ref()
            .map(|s| s.key().clone())
            .filter(|key| key.kind == kind);
        let Some(key) = key else {
            return Ok(None);
        };
        let order = key
            .order
            .as_deref()
            .map(EpisodesOrder::from_param)
            .unwrap_or_default();
        let id = key.id.clone().unwrap_or_default();
        let snapshot = match kind {
            ListKind::ShowEpisodes => {
                self.drive_list(&self.episodes, key, true, |query| {
                    self.api.show_episodes(&id, query, order, false)
                })
                .await?
            }
            ListKind::SeasonEpisodes => {
                self.drive_list(&self.episodes, key, true, |query| {
                    self.api.season_episodes(&id, query, order, false)
                })
                .await?
            }
            ListKind::NewEpisodes => {
                self.drive_list(&self.episodes, key, true, |query| {
                    self.api.new_episodes(query, EpisodesOrder::Newest, false)
                })
                .await?
            }
            ListKind::BeanEpisodes => {
                self.drive_list(&self.episodes, key, true, |query| {
                    self.api.bean_episodes(&id, query, order, false)
                })
                .await?
            }
            ListKind::Shows => return Ok(None),
        };
        Ok(Some(snapshot))
    }

    // ========================================================================
    // Joined fetches
    // ========================================================================

    /// Show detail and its episode list, fetched in parallel. With a season
    /// the episodes come from the season endpoint instead of the show's.
    /// Each side reports its own outcome.
    pub async fn show_with_episodes(
        &self,
        show_id: &str,
        season_id: Option<&str>,
        order: EpisodesOrder,
    ) -> (
        Result<Show, BackendError>,
        Result<ListSnapshot<Episode>, BackendError>,
    ) {
        match season_id {
            Some(season) => {
                tokio::join!(
                    self.show(show_id),
                    self.season_episode_list(season, order)
                )
            }
            None => {
                tokio::join!(
                    self.show(show_id),
                    self.show_episode_list(show_id, order)
                )
            }
        }
    }

    /// Bean detail and their episode list, fetched in parallel. A bean can
    /// have no episodes, so the sides stay independent here too.
    pub async fn bean_with_episodes(
        &self,
        id: &str,
        order: EpisodesOrder,
    ) -> (
        Result<Bean, BackendError>,
        Result<ListSnapshot<Episode>, BackendError>,
    ) {
        tokio::join!(self.bean(id), self.bean_episode_list(id, order))
    }

    /// The landing strips: newest episodes, the events channel, the show
    /// shelf and the podcast shelf. All four load in parallel from the
    /// response cache and bypass the list sessions; on multiple failures the
    /// first branch in this order wins.
    pub async fn overview(&self) -> Result<Overview, BackendError> {
        let episodes_query = PageQuery {
            offset: 0,
            limit: OVERVIEW_EPISODES_LIMIT,
        };
        let shows_query = PageQuery {
            offset: 0,
            limit: OVERVIEW_SHOWS_LIMIT,
        };
        let (new_episodes, event_episodes, shows, podcasts) = tokio::join!(
            self.api
                .new_episodes(episodes_query, EpisodesOrder::Newest, true),
            self.api
                .show_episodes(EVENT_SHOW_ID, episodes_query, EpisodesOrder::Newest, true),
            self.api
                .shows(shows_query, Some(ShowsOrder::LastEpisode), None, true),
            self.api.shows(
                shows_query,
                Some(ShowsOrder::LastEpisode),
                Some(ShowsFilter::Podcast),
                true
            ),
        );
        Ok(Overview {
            new_episodes: new_episodes?.items,
            event_episodes: event_episodes?.items,
            shows: shows?.items,
            podcasts: podcasts?.items,
        })
    }

    // ========================================================================
    // Crew directory
    // ========================================================================

    /// The crew directory in the requested order. The fetched directory is
    /// kept with its sort keys until the session TTL runs out.
    pub async fn beans(&self, order: BeansOrder) -> Result<Vec<Bean>, BackendError> {
        {
            let guard = lock(&self.beans);
            if let Some(directory) = guard.as_ref() {
                if directory.is_fresh(self.session_ttl) {
                    return Ok(directory.ordered(order));
                }
            }
        }

        let fetched = self.api.beans().await?;
        tracing::debug!(count = fetched.len(), "Refreshed bean directory");
        let mut guard = lock(&self.beans);
        let directory = guard.insert(BeanDirectory::new(fetched));
        Ok(directory.ordered(order))
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Runs a search. `Ok(None)` when the expression is out of bounds after
    /// trimming. Results for the expression are served from the session
    /// while it lives; a response arriving after [`cancel_search`] or after
    /// a newer search reports the circumstance instead of stale results.
    ///
    /// [`cancel_search`]: Self::cancel_search
    pub async fn search(&self, raw: &str) -> Result<Option<SearchResults>, BackendError> {
        let Some(expression) = normalize_expression(raw) else {
            tracing::trace!("Search expression out of bounds, not searching");
            return Ok(None);
        };

        let token = {
            let mut guard = lock(&self.search);
            let mut session =
                SearchSession::validated(guard.take(), &expression, self.session_ttl);
            if let Some(results) = session.results().cloned() {
                *guard = Some(session);
                return Ok(Some(results));
            }
            let token = session.start_load(&self.tokens);
            *guard = Some(session);
            token
        };

        let result = self.api.search(&expression).await;

        let mut guard = lock(&self.search);
        if guard.is_none() {
            tracing::debug!(expression = %expression, "Search canceled while in flight");
            return Err(BackendError::Canceled);
        }
        match result {
            Err(err) => {
                *guard = None;
                Err(err)
            }
            Ok(results) => match guard.as_mut() {
                Some(session) if session.stop_load(token) => {
                    session.store_results(results.clone());
                    Ok(Some(results))
                }
                _ => Err(BackendError::Superseded("search results")),
            },
        }
    }

    /// Drops the search session. An in-flight response will report itself
    /// canceled. Returns whether there was a session to drop.
    pub fn cancel_search(&self) -> bool {
        lock(&self.search).take().is_some()
    }

    // ========================================================================
    // Single entities
    // ========================================================================

    pub async fn show(&self, id: &str) -> Result<Show, BackendError> {
        self.api.show(id).await
    }

    pub async fn bean(&self, id: &str) -> Result<Bean, BackendError> {
        self.api.bean(id).await
    }

    /// Episode detail with neighbor episodes and crew lookup.
    pub async fn episode(&self, id: &str) -> Result<EpisodePage, BackendError> {
        self.api.episode(id).await
    }

    /// Fetches artwork and extracts its backdrop colors. `Ok(None)` when the
    /// resource is not a usable image; fetch failures stay errors.
    pub async fn backdrop(&self, image_url: &str) -> Result<Option<Backdrop>, BackendError> {
        let bytes = self.api.fetch_bytes(image_url).await?;
        Ok(Backdrop::from_image_bytes(&bytes))
    }
}

fn check_id(id: &str) -> Result<(), BackendError> {
    if id.is_empty() {
        Err(BackendError::MissingId)
    } else {
        Ok(())
    }
}
