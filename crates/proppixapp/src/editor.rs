//! # Photo Editor
//!
//! [`PhotoEditor`] is the shareable handle a UI keeps for one open photo editor. It owns
//! a [`PhotoSession`] and a sync state machine:
//!
//! ```text
//!            save()                 Ok
//!   Idle ───────────► Syncing ─────────────► Idle
//!    ▲                   │  Err / dropped
//!    │     save()        ▼
//!    └──────────────── Failed(msg)
//! ```
//!
//! A `save()` issued while another one is in flight is rejected with
//! [`PhotoError::SyncInProgress`] instead of racing it. Edits made while a save runs
//! wait for it to finish.

use crate::error::{PhotoError, Result};
use crate::model::{LocalFile, Photo};
use crate::session::{Direction, PhotoItem, PhotoSession, PreviewHandle, Removal};
use crate::store::{BlobStore, PhotoRecords};
use crate::sync::{sync, SyncReport};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Syncing,
    Failed(String),
}

fn lock_state(state: &Mutex<SyncState>) -> MutexGuard<'_, SyncState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Holds the state at `Syncing` until finished. If the save future is dropped
/// mid-flight, the state falls to `Failed`.
struct SyncTicket<'a> {
    state: &'a Mutex<SyncState>,
    finished: bool,
}

impl<'a> SyncTicket<'a> {
    fn begin(state: &'a Mutex<SyncState>) -> Result<Self> {
        let mut current = lock_state(state);
        if *current == SyncState::Syncing {
            return Err(PhotoError::SyncInProgress);
        }
        *current = SyncState::Syncing;
        Ok(Self {
            state,
            finished: false,
        })
    }

    fn finish(mut self, outcome: &Result<SyncReport>) {
        *lock_state(self.state) = match outcome {
            Ok(_) => SyncState::Idle,
            Err(e) => SyncState::Failed(e.to_string()),
        };
        self.finished = true;
    }
}

impl Drop for SyncTicket<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *lock_state(self.state) = SyncState::Failed("sync interrupted".to_string());
        }
    }
}

pub struct PhotoEditor {
    session: tokio::sync::Mutex<PhotoSession>,
    state: Mutex<SyncState>,
}

impl PhotoEditor {
    pub fn new(session: PhotoSession) -> Self {
        Self {
            session: tokio::sync::Mutex::new(session),
            state: Mutex::new(SyncState::Idle),
        }
    }

    pub fn state(&self) -> SyncState {
        lock_state(&self.state).clone()
    }

    pub async fn property_id(&self) -> Option<Uuid> {
        self.session.lock().await.property_id()
    }

    pub async fn attach(&self, property_id: Uuid) {
        self.session.lock().await.attach(property_id);
    }

    /// Copy of the current ordered list.
    pub async fn items(&self) -> Vec<PhotoItem> {
        self.session.lock().await.items().to_vec()
    }

    pub async fn pending_deletions(&self) -> Vec<Photo> {
        self.session.lock().await.pending_deletions().to_vec()
    }

    pub async fn live_previews(&self) -> usize {
        self.session.lock().await.previews().live_count()
    }

    pub async fn append_new(&self, files: Vec<LocalFile>) -> Vec<PreviewHandle> {
        self.session.lock().await.append_new(files)
    }

    pub async fn move_item(&self, index: usize, direction: Direction) -> bool {
        self.session.lock().await.move_item(index, direction)
    }

    pub async fn promote(&self, index: usize) -> bool {
        self.session.lock().await.promote(index)
    }

    pub async fn remove(&self, index: usize) -> Option<Removal> {
        self.session.lock().await.remove(index)
    }

    pub async fn merge_on_reload(&self, photos: Vec<Photo>) {
        self.session.lock().await.merge_on_reload(photos);
    }

    /// Run one sync of the session, rejecting a concurrent one.
    ///
    /// On failure the unsynced new items get fresh previews so the editor can keep
    /// showing them.
    pub async fn save<B, R>(&self, blobs: &B, records: &R) -> Result<SyncReport>
    where
        B: BlobStore + ?Sized,
        R: PhotoRecords + ?Sized,
    {
        let ticket = SyncTicket::begin(&self.state)?;
        let mut session = self.session.lock().await;

        let outcome = sync(blobs, records, &mut session).await;
        if outcome.is_err() {
            session.refresh_previews();
        }
        ticket.finish(&outcome);
        outcome
    }
}
