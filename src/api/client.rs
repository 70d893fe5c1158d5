use crate::api::cache::ResponseCache;
use crate::api::routes::{self, EpisodesOrder, PageQuery, ShowsFilter, ShowsOrder};
use crate::api::types::{
    Bean, Envelope, Episode, EpisodePage, Page, Pagination, SearchResults, Show, ShowPreview,
};
use crate::config::{Config, ConfigError};
use crate::error::BackendError;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use url::Url;

/// HTTP client for the fixed REST endpoints.
///
/// Single-entity and directory responses are cached by URL. Session page
/// fetches, episode details and searches bypass the cache; the list sessions
/// are their own cache layer. Callers that want a cached page (the overview)
/// say so per request.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    cache: Mutex<ResponseCache>,
    timeout: Duration,
    max_response_bytes: usize,
}

impl ApiClient {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base: config.base_url()?,
            cache: Mutex::new(ResponseCache::new(config.cache_ttl())),
            timeout: config.request_timeout(),
            max_response_bytes: config.max_response_bytes,
        })
    }

    // A poisoned lock only means some thread panicked mid-access; the cache
    // itself stays usable.
    fn cache(&self) -> MutexGuard<'_, ResponseCache> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn fetch(&self, url: &str) -> Result<(reqwest::StatusCode, String), BackendError> {
        tracing::debug!(url = %url, "GET");
        let response = tokio::time::timeout(self.timeout, self.http.get(url).send())
            .await
            .map_err(|_| BackendError::Timeout(self.timeout.as_secs()))?
            .map_err(BackendError::Network)?;
        let status = response.status();
        let body = read_limited_text(response, self.max_response_bytes).await?;
        Ok((status, body))
    }

    /// Fetches `url` and unwraps the response envelope. With `use_cache`,
    /// a previously stored body short-circuits the request and a freshly
    /// validated body is stored for the next caller.
    async fn request_payload<T: DeserializeOwned>(
        &self,
        url: &str,
        use_cache: bool,
    ) -> Result<(T, Option<Pagination>), BackendError> {
        if use_cache {
            let cached = self.cache().get(url);
            if let Some(body) = cached {
                tracing::trace!(url = %url, "Serving cached response");
                return decode_payload(&body, None);
            }
        }
        let (status, body) = self.fetch(url).await?;
        let payload = decode_payload(&body, Some(status))?;
        if use_cache {
            self.cache().put(url, body);
        }
        Ok(payload)
    }

    pub async fn show(&self, id: &str) -> Result<Show, BackendError> {
        check_id(id)?;
        let (show, _) = self
            .request_payload(&routes::show(&self.base, id), true)
            .await?;
        Ok(show)
    }

    pub async fn shows(
        &self,
        query: PageQuery,
        order: Option<ShowsOrder>,
        filter: Option<ShowsFilter>,
        use_cache: bool,
    ) -> Result<Page<ShowPreview>, BackendError> {
        let url = routes::shows(&self.base, query, order, filter);
        let (items, pagination): (Vec<ShowPreview>, _) =
            self.request_payload(&url, use_cache).await?;
        Ok(Page::new(page_pagination(query, pagination, items.len()), items))
    }

    pub async fn show_episodes(
        &self,
        id: &str,
        query: PageQuery,
        order: EpisodesOrder,
        use_cache: bool,
    ) -> Result<Page<Episode>, BackendError> {
        check_id(id)?;
        let url = routes::show_episodes(&self.base, id, query, order);
        self.episode_page(&url, query, use_cache).await
    }

    pub async fn season_episodes(
        &self,
        id: &str,
        query: PageQuery,
        order: EpisodesOrder,
        use_cache: bool,
    ) -> Result<Page<Episode>, BackendError> {
        check_id(id)?;
        let url = routes::season_episodes(&self.base, id, query, order);
        self.episode_page(&url, query, use_cache).await
    }

    pub async fn new_episodes(
        &self,
        query: PageQuery,
        order: EpisodesOrder,
        use_cache: bool,
    ) -> Result<Page<Episode>, BackendError> {
        let url = routes::new_episodes(&self.base, query, order);
        self.episode_page(&url, query, use_cache).await
    }

    pub async fn bean_episodes(
        &self,
        id: &str,
        query: PageQuery,
        order: EpisodesOrder,
        use_cache: bool,
    ) -> Result<Page<Episode>, BackendError> {
        check_id(id)?;
        let url = routes::bean_episodes(&self.base, id, query, order);
        self.episode_page(&url, query, use_cache).await
    }

    async fn episode_page(
        &self,
        url: &str,
        query: PageQuery,
        use_cache: bool,
    ) -> Result<Page<Episode>, BackendError> {
        let (payload, pagination): (EpisodePage, _) =
            self.request_payload(url, use_cache).await?;
        let pagination = page_pagination(query, pagination, payload.episodes.len());
        Ok(Page::new(pagination, payload.episodes).with_beans(payload.bohnen))
    }

    pub async fn bean(&self, id: &str) -> Result<Bean, BackendError> {
        check_id(id)?;
        let (bean, _) = self
            .request_payload(&routes::bean(&self.base, id), true)
            .await?;
        Ok(bean)
    }

    /// The full crew directory. Not paged; cached by URL.
    pub async fn beans(&self) -> Result<Vec<Bean>, BackendError> {
        let (beans, _) = self
            .request_payload(&routes::beans(&self.base), true)
            .await?;
        Ok(beans)
    }

    /// Episode detail. The payload reuses the nested page layout with the
    /// requested episode at index zero and its crew in `bohnen`.
    pub async fn episode(&self, id: &str) -> Result<EpisodePage, BackendError> {
        check_id(id)?;
        let (payload, _) = self
            .request_payload(&routes::episode(&self.base, id), false)
            .await?;
        Ok(payload)
    }

    pub async fn search(&self, expression: &str) -> Result<SearchResults, BackendError> {
        check_id(expression)?;
        let (results, _) = self
            .request_payload(&routes::search(&self.base, expression), false)
            .await?;
        Ok(results)
    }

    /// Fetches a raw resource, typically artwork. No envelope, no cache;
    /// the size cap still applies.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, BackendError> {
        tracing::debug!(url = %url, "GET (raw)");
        let response = tokio::time::timeout(self.timeout, self.http.get(url).send())
            .await
            .map_err(|_| BackendError::Timeout(self.timeout.as_secs()))?
            .map_err(BackendError::Network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::HttpStatus(status.as_u16()));
        }
        read_limited_bytes(response, self.max_response_bytes).await
    }
}

fn check_id(id: &str) -> Result<(), BackendError> {
    if id.is_empty() {
        Err(BackendError::MissingId)
    } else {
        Ok(())
    }
}

/// Unwraps the envelope checks shared by every endpoint. `status` is absent
/// for cached bodies, which already passed them once.
fn decode_payload<T: DeserializeOwned>(
    body: &str,
    status: Option<reqwest::StatusCode>,
) -> Result<(T, Option<Pagination>), BackendError> {
    let envelope: Envelope<T> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(err) => {
            // The backend reports application errors as envelopes even on
            // non-2xx statuses; only a body that is no envelope at all is
            // reported as the bare HTTP failure.
            return Err(match status {
                Some(status) if !status.is_success() => {
                    BackendError::HttpStatus(status.as_u16())
                }
                _ => BackendError::Decode(err),
            });
        }
    };
    if !envelope.success {
        return Err(BackendError::api(envelope.code, envelope.message));
    }
    match envelope.data {
        Some(data) => Ok((data, envelope.pagination)),
        None => Err(BackendError::MissingData),
    }
}

/// Pagination reported by the server, or a synthesized complete window when
/// the payload carries none.
fn page_pagination(query: PageQuery, got: Option<Pagination>, count: usize) -> Pagination {
    got.unwrap_or(Pagination {
        offset: query.offset,
        limit: query.limit,
        total: query.offset.saturating_add(count as u64) as i64,
    })
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, BackendError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(BackendError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(BackendError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(BackendError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

async fn read_limited_text(
    response: reqwest::Response,
    limit: usize,
) -> Result<String, BackendError> {
    let bytes = read_limited_bytes(response, limit).await?;
    String::from_utf8(bytes).map_err(|_| BackendError::InvalidUtf8)
}
