use crate::api::types::SearchResults;
use crate::session::list::RequestToken;
use std::sync::atomic::AtomicU64;
use std::time::{Duration, Instant};

/// Shortest accepted search expression, after trimming.
pub const MIN_EXPRESSION_LEN: usize = 2;
/// Longest accepted search expression.
pub const MAX_EXPRESSION_LEN: usize = 40;

/// Trims the raw input and applies the length bounds. Out-of-bounds input
/// is not an error; it simply does not search.
pub fn normalize_expression(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if (MIN_EXPRESSION_LEN..=MAX_EXPRESSION_LEN).contains(&len) {
        Some(trimmed.to_owned())
    } else {
        None
    }
}

/// State of the active search. Keyed by the normalized expression; results
/// for the same expression are served from here until the TTL runs out.
#[derive(Debug)]
pub struct SearchSession {
    expression: String,
    results: Option<SearchResults>,
    token: RequestToken,
    created_at: Instant,
}

impl SearchSession {
    fn fresh(expression: String) -> Self {
        Self {
            expression,
            results: None,
            token: RequestToken::default(),
            created_at: Instant::now(),
        }
    }

    /// Returns `current` when it belongs to `expression` and is still within
    /// its TTL, otherwise a fresh session.
    pub fn validated(current: Option<Self>, expression: &str, ttl: Duration) -> Self {
        match current {
            Some(session) if session.expression == expression && session.is_fresh(ttl) => session,
            _ => Self::fresh(expression.to_owned()),
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() < ttl
    }

    pub fn results(&self) -> Option<&SearchResults> {
        self.results.as_ref()
    }

    pub fn store_results(&mut self, results: SearchResults) {
        self.results = Some(results);
    }

    pub fn start_load(&mut self, counter: &AtomicU64) -> RequestToken {
        let token = RequestToken::next(counter);
        self.token = token;
        token
    }

    pub fn stop_load(&self, token: RequestToken) -> bool {
        self.token == token
    }
}
