//! Content backend for the Rocket Beans TV media-library plugin.
//!
//! The host hands over content identifiers ([`request::ContentRequest`]);
//! the [`backend::Backend`] resolves them against the REST API while
//! keeping paged list sessions, the active search and the crew directory
//! in memory. [`pins`] persists the user's pinned shows and beans through
//! the host's key-value store, and [`backdrop`] turns artwork into the
//! ambient background colors of detail pages.

pub mod api;
pub mod backdrop;
pub mod backend;
pub mod config;
pub mod error;
pub mod pins;
pub mod request;
pub mod session;
pub mod storage;

pub use backdrop::Backdrop;
pub use backend::{Backend, ContentData, ExtensionData, Overview};
pub use config::{Config, ConfigError};
pub use error::BackendError;
pub use pins::{MoveDirection, Pin, PinBoard};
pub use request::{ContentRequest, ExtendRequest, RequestError};
