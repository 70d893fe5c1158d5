//! Persistence seam for pinned entries. The host exposes a string key-value
//! store; values are stored as URL-safe base64 over JSON so they survive
//! hosts that mangle structural characters.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Key prefix namespacing this plugin's entries in the shared store.
pub const STORAGE_PREFIX: &str = "rbtv:";

pub fn storage_key(name: &str) -> String {
    format!("{STORAGE_PREFIX}{name}")
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Malformed storage blob: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Malformed storage encoding: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// String key-value persistence as the host offers it.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory store, for tests and hosts without persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

pub fn encode_blob<T: Serialize>(value: &T) -> Result<String, StorageError> {
    Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(value)?))
}

pub fn decode_blob<T: DeserializeOwned>(blob: &str) -> Result<T, StorageError> {
    let bytes = URL_SAFE_NO_PAD.decode(blob)?;
    Ok(serde_json::from_slice(&bytes)?)
}
