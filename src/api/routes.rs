//! Path templates and query assembly for the v1 REST API.
use url::Url;

const SHOW_PATH: &str = "/media/show/{ID}";
const SHOWS_PATH: &str = "/media/show/preview/all";
const SHOW_EPISODES_PATH: &str = "/media/episode/byshow/preview/{ID}";
const SEASON_EPISODES_PATH: &str = "/media/episode/byseason/preview/{ID}";
const NEW_EPISODES_PATH: &str = "/media/episode/preview/newest";
const BEAN_PATH: &str = "/bohne/{ID}";
const BEANS_PATH: &str = "/bohne/portrait/all";
const BEAN_EPISODES_PATH: &str = "/media/episode/bybohne/{ID}";
const EPISODE_PATH: &str = "/media/episode/{ID}";
const SEARCH_PATH: &str = "/search/{EXPRESSION}";

/// Offset/limit window of a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub offset: u64,
    pub limit: u64,
}

/// Server-side sort order of the show directory (`sortby` parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowsOrder {
    LastEpisode,
    Title,
}

impl ShowsOrder {
    /// The `sortby` value. Doubles as the canonical session identity token.
    pub fn as_param(&self) -> &'static str {
        match self {
            ShowsOrder::LastEpisode => "LastEpisode",
            ShowsOrder::Title => "Title",
        }
    }

    /// Maps the host's order token. Unrecognized tokens yield `None`, which
    /// omits the parameter and lets the server pick its default.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "default" => Some(ShowsOrder::LastEpisode),
            "title" => Some(ShowsOrder::Title),
            _ => None,
        }
    }

    /// Inverse of [`as_param`](Self::as_param), for requests re-derived from
    /// a stored session identity.
    pub fn from_param(param: &str) -> Option<Self> {
        match param {
            "LastEpisode" => Some(ShowsOrder::LastEpisode),
            "Title" => Some(ShowsOrder::Title),
            _ => None,
        }
    }
}

/// Show directory filter (`only` parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowsFilter {
    Podcast,
}

impl ShowsFilter {
    pub fn as_param(&self) -> &'static str {
        match self {
            ShowsFilter::Podcast => "podcast",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "podcast" => Some(ShowsFilter::Podcast),
            _ => None,
        }
    }

    pub fn from_param(param: &str) -> Option<Self> {
        match param {
            "podcast" => Some(ShowsFilter::Podcast),
            _ => None,
        }
    }
}

/// Episode list direction (`order` parameter). Newest-first is the default;
/// the host requests oldest-first with its "reverse" token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EpisodesOrder {
    #[default]
    Newest,
    Oldest,
}

impl EpisodesOrder {
    pub fn as_param(&self) -> &'static str {
        match self {
            EpisodesOrder::Newest => "DESC",
            EpisodesOrder::Oldest => "ASC",
        }
    }

    pub fn from_token(token: &str) -> Self {
        if token == "reverse" {
            EpisodesOrder::Oldest
        } else {
            EpisodesOrder::Newest
        }
    }

    pub fn from_param(param: &str) -> Self {
        if param == "ASC" {
            EpisodesOrder::Oldest
        } else {
            EpisodesOrder::Newest
        }
    }
}

fn root(base: &Url) -> &str {
    base.as_str().trim_end_matches('/')
}

fn id_path(template: &str, id: &str) -> String {
    template.replace("{ID}", &urlencoding::encode(id))
}

fn page_params(query: PageQuery) -> String {
    format!("offset={}&limit={}", query.offset, query.limit)
}

pub fn show(base: &Url, id: &str) -> String {
    format!("{}{}", root(base), id_path(SHOW_PATH, id))
}

pub fn shows(
    base: &Url,
    query: PageQuery,
    order: Option<ShowsOrder>,
    filter: Option<ShowsFilter>,
) -> String {
    let mut params = page_params(query);
    if let Some(order) = order {
        params.push_str("&sortby=");
        params.push_str(order.as_param());
    }
    if let Some(filter) = filter {
        params.push_str("&only=");
        params.push_str(filter.as_param());
    }
    format!("{}{}?{}", root(base), SHOWS_PATH, params)
}

pub fn show_episodes(base: &Url, id: &str, query: PageQuery, order: EpisodesOrder) -> String {
    format!(
        "{}{}?{}&order={}",
        root(base),
        id_path(SHOW_EPISODES_PATH, id),
        page_params(query),
        order.as_param()
    )
}

pub fn season_episodes(base: &Url, id: &str, query: PageQuery, order: EpisodesOrder) -> String {
    format!(
        "{}{}?{}&order={}",
        root(base),
        id_path(SEASON_EPISODES_PATH, id),
        page_params(query),
        order.as_param()
    )
}

pub fn new_episodes(base: &Url, query: PageQuery, order: EpisodesOrder) -> String {
    format!(
        "{}{}?{}&order={}",
        root(base),
        NEW_EPISODES_PATH,
        page_params(query),
        order.as_param()
    )
}

pub fn bean(base: &Url, id: &str) -> String {
    format!("{}{}", root(base), id_path(BEAN_PATH, id))
}

pub fn beans(base: &Url) -> String {
    format!("{}{}", root(base), BEANS_PATH)
}

pub fn bean_episodes(base: &Url, id: &str, query: PageQuery, order: EpisodesOrder) -> String {
    format!(
        "{}{}?{}&order={}",
        root(base),
        id_path(BEAN_EPISODES_PATH, id),
        page_params(query),
        order.as_param()
    )
}

pub fn episode(base: &Url, id: &str) -> String {
    format!("{}{}", root(base), id_path(EPISODE_PATH, id))
}

pub fn search(base: &Url, expression: &str) -> String {
    format!(
        "{}{}",
        root(base),
        SEARCH_PATH.replace("{EXPRESSION}", &urlencoding::encode(expression))
    )
}
