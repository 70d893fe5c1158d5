//! In-memory browsing state: paged list sessions, the active search and the
//! sortable crew directory. Sessions carry no I/O; the backend drives them.

pub mod list;
pub mod search;
pub mod sort;

pub use list::{ListKey, ListKind, ListSession, ListSnapshot, Preloadable, RequestToken};
pub use search::{normalize_expression, SearchSession};
pub use sort::{BeanDirectory, BeansOrder};
