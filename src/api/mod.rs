//! Typed access to the Rocket Beans REST backend: route construction,
//! response entities, the HTTP client and its URL-keyed response cache.

pub mod cache;
pub mod client;
pub mod routes;
pub mod types;

pub use client::ApiClient;
pub use routes::{EpisodesOrder, PageQuery, ShowsFilter, ShowsOrder};
pub use types::{
    Bean, Episode, EpisodePage, Page, Pagination, SearchResults, Show, ShowPreview,
};
