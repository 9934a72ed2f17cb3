//! Change feed for observing mask mutations.
//!
//! Every successful create, update and delete emits a [`MaskEvent`] once
//! the new snapshot has been handed to the backend. Typical consumers are
//! UI views that re-render a mask list and sync layers that push edits.
//!
//! # Usage
//!
//! ```rust
//! use maskstore_core::{MaskEventKind, MaskStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MaskStore::open_in_memory()?;
//! let events = store.subscribe();
//!
//! let mask = store.create(None);
//! let event = events.recv()?;
//! assert_eq!(event.kind, MaskEventKind::Created);
//! assert_eq!(event.mask_id, mask.id);
//! # Ok(())
//! # }
//! ```

use crate::mask::MaskId;
use parking_lot::RwLock;
use std::sync::mpsc::{self, Receiver, Sender};

/// Kind of mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskEventKind {
    /// A mask was created.
    Created,
    /// An existing mask was replaced by an updated copy.
    Updated,
    /// A mask was removed.
    Deleted,
}

/// A single mutation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskEvent {
    /// Strictly increasing per store.
    pub sequence: u64,
    /// The affected mask.
    pub mask_id: MaskId,
    /// What happened to it.
    pub kind: MaskEventKind,
}

impl MaskEvent {
    /// Creates a `Created` event.
    pub fn created(sequence: u64, mask_id: MaskId) -> Self {
        Self {
            sequence,
            mask_id,
            kind: MaskEventKind::Created,
        }
    }

    /// Creates an `Updated` event.
    pub fn updated(sequence: u64, mask_id: MaskId) -> Self {
        Self {
            sequence,
            mask_id,
            kind: MaskEventKind::Updated,
        }
    }

    /// Creates a `Deleted` event.
    pub fn deleted(sequence: u64, mask_id: MaskId) -> Self {
        Self {
            sequence,
            mask_id,
            kind: MaskEventKind::Deleted,
        }
    }
}

/// Distributes mask events to subscribers.
///
/// Subscribers whose receiver was dropped are pruned on the next emit.
/// The last `max_history` events are kept for cursor polling.
pub struct ChangeFeed {
    subscribers: RwLock<Vec<Sender<MaskEvent>>>,
    history: RwLock<Vec<MaskEvent>>,
    max_history: usize,
}

impl ChangeFeed {
    /// Creates a feed with the default history limit.
    pub fn new() -> Self {
        Self::with_max_history(crate::config::DEFAULT_CHANGE_FEED_HISTORY)
    }

    /// Creates a feed that keeps at most `max_history` events.
    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            history: RwLock::new(Vec::new()),
            max_history,
        }
    }

    /// Returns a receiver for all future events.
    pub fn subscribe(&self) -> Receiver<MaskEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.write().push(tx);
        rx
    }

    /// Records `event` and sends it to every live subscriber.
    pub fn emit(&self, event: MaskEvent) {
        {
            let mut history = self.history.write();
            history.push(event.clone());
            if history.len() > self.max_history {
                let excess = history.len() - self.max_history;
                history.drain(0..excess);
            }
        }

        let mut subscribers = self.subscribers.write();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Returns up to `limit` events with sequence greater than `cursor`.
    pub fn poll(&self, cursor: u64, limit: usize) -> Vec<MaskEvent> {
        self.history
            .read()
            .iter()
            .filter(|e| e.sequence > cursor)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Sequence of the newest event in history, or 0.
    pub fn latest_sequence(&self) -> u64 {
        self.history.read().last().map_or(0, |e| e.sequence)
    }

    /// Number of live subscribers as of the last emit.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Number of events in history.
    pub fn history_len(&self) -> usize {
        self.history.read().len()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChangeFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeFeed")
            .field("subscribers", &self.subscriber_count())
            .field("history", &self.history_len())
            .field("max_history", &self.max_history)
            .finish()
    }
}
