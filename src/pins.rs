//! Pinned shows and beans. Pins live in the host's key-value store and are
//! restored on startup; every mutation persists immediately.

use crate::backend::Backend;
use crate::error::BackendError;
use crate::storage::{decode_blob, encode_blob, storage_key, KeyValueStore, StorageError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SHOWS_KEY: &str = "pinned_shows";
const BEANS_KEY: &str = "pinned_beans";

#[derive(Debug, Error)]
pub enum PinError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// One pinned entry. The title is kept from pin time so the list renders
/// without a fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub id: String,
    pub title: String,
    /// Blobs written before this field existed restore as freshly pinned.
    #[serde(default = "Utc::now")]
    pub pinned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
    Start,
    End,
}

/// The user's pinned shows and beans, in display order.
#[derive(Debug)]
pub struct PinBoard<S: KeyValueStore> {
    store: S,
    shows: Vec<Pin>,
    beans: Vec<Pin>,
}

impl<S: KeyValueStore> PinBoard<S> {
    /// Restores both pin lists from the store. An unreadable blob is
    /// discarded; losing pins beats refusing to start.
    pub fn restore(store: S) -> Self {
        let shows = load_list(&store, &storage_key(SHOWS_KEY));
        let beans = load_list(&store, &storage_key(BEANS_KEY));
        Self {
            store,
            shows,
            beans,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn pinned_shows(&self) -> &[Pin] {
        &self.shows
    }

    pub fn pinned_beans(&self) -> &[Pin] {
        &self.beans
    }

    pub fn is_show_pinned(&self, id: &str) -> bool {
        self.shows.iter().any(|pin| pin.id == id)
    }

    pub fn is_bean_pinned(&self, id: &str) -> bool {
        self.beans.iter().any(|pin| pin.id == id)
    }

    /// Pins a show by fetching it and keeping its canonical id and title.
    /// `Ok(false)` when it is already pinned or has no title to pin under.
    pub async fn pin_show(&mut self, backend: &Backend, id: &str) -> Result<bool, PinError> {
        if self.is_show_pinned(id) {
            return Ok(false);
        }
        let show = backend.show(id).await?;
        let Some(title) = show.title else {
            tracing::warn!(id, "Show has no title, not pinning");
            return Ok(false);
        };
        let pin = Pin {
            id: show.id.to_string(),
            title,
            pinned_at: Utc::now(),
        };
        if self.is_show_pinned(&pin.id) {
            return Ok(false);
        }
        self.shows.push(pin);
        self.persist_shows()?;
        Ok(true)
    }

    pub fn unpin_show(&mut self, id: &str) -> Result<bool, StorageError> {
        let before = self.shows.len();
        self.shows.retain(|pin| pin.id != id);
        if self.shows.len() == before {
            return Ok(false);
        }
        self.persist_shows()?;
        Ok(true)
    }

    pub fn move_pinned_show(
        &mut self,
        id: &str,
        direction: MoveDirection,
    ) -> Result<bool, StorageError> {
        if !move_pin(&mut self.shows, id, direction) {
            return Ok(false);
        }
        self.persist_shows()?;
        Ok(true)
    }

    /// Pins a bean. The detail record provides the management id the
    /// directory refers to and the display name; without either there is
    /// nothing stable to pin.
    pub async fn pin_bean(&mut self, backend: &Backend, id: &str) -> Result<bool, PinError> {
        if self.is_bean_pinned(id) {
            return Ok(false);
        }
        let bean = backend.bean(id).await?;
        let (Some(mgmtid), Some(name)) = (bean.mgmtid, bean.display_name()) else {
            tracing::warn!(id, "Bean has no usable identity, not pinning");
            return Ok(false);
        };
        let pin = Pin {
            id: mgmtid.to_string(),
            title: name.to_owned(),
            pinned_at: Utc::now(),
        };
        if self.is_bean_pinned(&pin.id) {
            return Ok(false);
        }
        self.beans.push(pin);
        self.persist_beans()?;
        Ok(true)
    }

    pub fn unpin_bean(&mut self, id: &str) -> Result<bool, StorageError> {
        let before = self.beans.len();
        self.beans.retain(|pin| pin.id != id);
        if self.beans.len() == before {
            return Ok(false);
        }
        self.persist_beans()?;
        Ok(true)
    }

    pub fn move_pinned_bean(
        &mut self,
        id: &str,
        direction: MoveDirection,
    ) -> Result<bool, StorageError> {
        if !move_pin(&mut self.beans, id, direction) {
            return Ok(false);
        }
        self.persist_beans()?;
        Ok(true)
    }

    fn persist_shows(&mut self) -> Result<(), StorageError> {
        persist_list(&mut self.store, &storage_key(SHOWS_KEY), &self.shows)
    }

    fn persist_beans(&mut self) -> Result<(), StorageError> {
        persist_list(&mut self.store, &storage_key(BEANS_KEY), &self.beans)
    }
}

fn load_list<S: KeyValueStore>(store: &S, key: &str) -> Vec<Pin> {
    match store.get(key) {
        None => Vec::new(),
        Some(blob) => match decode_blob(&blob) {
            Ok(pins) => pins,
            Err(err) => {
                tracing::warn!(key, error = %err, "Discarding unreadable pin list");
                Vec::new()
            }
        },
    }
}

// An empty list removes the key instead of storing an empty blob.
fn persist_list<S: KeyValueStore>(
    store: &mut S,
    key: &str,
    pins: &[Pin],
) -> Result<(), StorageError> {
    if pins.is_empty() {
        store.remove(key);
    } else {
        store.set(key, &encode_blob(&pins)?);
    }
    Ok(())
}

fn move_pin(pins: &mut Vec<Pin>, id: &str, direction: MoveDirection) -> bool {
    let Some(index) = pins.iter().position(|pin| pin.id == id) else {
        return false;
    };
    match direction {
        MoveDirection::Up if index > 0 => {
            pins.swap(index, index - 1);
            true
        }
        MoveDirection::Down if index + 1 < pins.len() => {
            pins.swap(index, index + 1);
            true
        }
        MoveDirection::Start if index > 0 => {
            let pin = pins.remove(index);
            pins.insert(0, pin);
            true
        }
        MoveDirection::End if index + 1 < pins.len() => {
            let pin = pins.remove(index);
            pins.push(pin);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;

    fn pin(id: &str) -> Pin {
        Pin {
            id: id.to_owned(),
            title: format!("Title {id}"),
            pinned_at: Utc::now(),
        }
    }

    fn seeded_board(ids: &[&str]) -> PinBoard<MemoryStore> {
        let pins: Vec<Pin> = ids.iter().map(|id| pin(id)).collect();
        let mut store = MemoryStore::new();
        store.set(&storage_key(SHOWS_KEY), &encode_blob(&pins).unwrap());
        PinBoard::restore(store)
    }

    fn ids(pins: &[Pin]) -> Vec<&str> {
        pins.iter().map(|pin| pin.id.as_str()).collect()
    }

    #[test]
    fn test_restore_from_empty_store() {
        let board = PinBoard::restore(MemoryStore::new());
        assert!(board.pinned_shows().is_empty());
        assert!(board.pinned_beans().is_empty());
    }

    #[test]
    fn test_restore_discards_corrupt_blob() {
        let mut store = MemoryStore::new();
        store.set(&storage_key(SHOWS_KEY), "??not a blob??");
        let board = PinBoard::restore(store);
        assert!(board.pinned_shows().is_empty());
    }

    #[test]
    fn test_restore_round_trip() {
        let board = seeded_board(&["95", "17"]);
        assert_eq!(ids(board.pinned_shows()), vec!["95", "17"]);
        assert!(board.is_show_pinned("95"));
        assert!(!board.is_show_pinned("96"));
    }

    #[test]
    fn test_unpin_removes_and_persists() {
        let mut board = seeded_board(&["95", "17"]);
        assert!(board.unpin_show("95").unwrap());
        assert_eq!(ids(board.pinned_shows()), vec!["17"]);
        assert!(!board.unpin_show("95").unwrap());

        // Emptying the list removes the key entirely.
        assert!(board.unpin_show("17").unwrap());
        assert!(board.store().get(&storage_key(SHOWS_KEY)).is_none());
    }

    #[test]
    fn test_move_up_and_down() {
        let mut board = seeded_board(&["a", "b", "c"]);
        assert!(board.move_pinned_show("c", MoveDirection::Up).unwrap());
        assert_eq!(ids(board.pinned_shows()), vec!["a", "c", "b"]);

        assert!(board.move_pinned_show("a", MoveDirection::Down).unwrap());
        assert_eq!(ids(board.pinned_shows()), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_move_start_and_end() {
        let mut board = seeded_board(&["a", "b", "c"]);
        assert!(board.move_pinned_show("c", MoveDirection::Start).unwrap());
        assert_eq!(ids(board.pinned_shows()), vec!["c", "a", "b"]);

        assert!(board.move_pinned_show("c", MoveDirection::End).unwrap());
        assert_eq!(ids(board.pinned_shows()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_moves_at_boundaries_are_no_ops() {
        let mut board = seeded_board(&["a", "b"]);
        assert!(!board.move_pinned_show("a", MoveDirection::Up).unwrap());
        assert!(!board.move_pinned_show("a", MoveDirection::Start).unwrap());
        assert!(!board.move_pinned_show("b", MoveDirection::Down).unwrap());
        assert!(!board.move_pinned_show("b", MoveDirection::End).unwrap());
        assert_eq!(ids(board.pinned_shows()), vec!["a", "b"]);
    }

    #[test]
    fn test_move_of_unknown_or_single_pin_is_a_no_op() {
        let mut board = seeded_board(&["a"]);
        assert!(!board.move_pinned_show("a", MoveDirection::Up).unwrap());
        assert!(!board.move_pinned_show("a", MoveDirection::End).unwrap());
        assert!(!board.move_pinned_show("x", MoveDirection::Up).unwrap());
    }

    #[test]
    fn test_restore_accepts_blob_without_timestamps() {
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        use base64::Engine;

        let legacy = URL_SAFE_NO_PAD.encode(br#"[{"id":"95","title":"Kino+"}]"#);
        let mut store = MemoryStore::new();
        store.set(&storage_key(SHOWS_KEY), &legacy);
        let board = PinBoard::restore(store);
        assert_eq!(ids(board.pinned_shows()), vec!["95"]);
    }
}
