//! # Photo Editing Session
//!
//! A [`PhotoSession`] holds what the user currently sees in a photo editor: one ordered
//! list mixing photos that already exist in the stores with files picked locally, plus
//! the photos the user removed but that are still in the stores.
//!
//! ```text
//! items:    [ New(c.jpg) | Existing(B, order 1) ]      <- position = future display order
//! pending:  { A }                                     <- deleted from the stores on sync
//! ```
//!
//! Every operation here is local and infallible. Nothing reaches a store until the
//! session is handed to [`crate::sync::sync`].
//!
//! ## Invariants
//!
//! - A photo in the pending deletion set never appears in `items`.
//! - Every `New` item owns exactly one live [`PreviewHandle`]; removing the item, or
//!   uploading it, revokes the handle.
//! - `move_item` and `promote` only permute `items`; length and membership are unchanged.

use crate::model::{LocalFile, Photo};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// A locally displayable reference to a file that is not uploaded yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewHandle(Uuid);

impl PreviewHandle {
    pub fn url(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "preview://{}", self.0)
    }
}

/// Issues and revokes preview handles, tracking which are still live.
#[derive(Debug, Default)]
pub struct PreviewPool {
    live: HashSet<PreviewHandle>,
}

impl PreviewPool {
    pub fn issue(&mut self) -> PreviewHandle {
        let handle = PreviewHandle(Uuid::new_v4());
        self.live.insert(handle);
        handle
    }

    /// Returns false if the handle was already revoked.
    pub fn revoke(&mut self, handle: PreviewHandle) -> bool {
        self.live.remove(&handle)
    }

    pub fn is_live(&self, handle: PreviewHandle) -> bool {
        self.live.contains(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

/// A picked file waiting for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub file: LocalFile,
    pub preview: PreviewHandle,
}

/// One entry of the ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoItem {
    Existing(Photo),
    New(NewItem),
}

impl PhotoItem {
    pub fn is_new(&self) -> bool {
        matches!(self, PhotoItem::New(_))
    }

    pub fn as_existing(&self) -> Option<&Photo> {
        match self {
            PhotoItem::Existing(photo) => Some(photo),
            PhotoItem::New(_) => None,
        }
    }

    pub fn file_name(&self) -> &str {
        match self {
            PhotoItem::Existing(photo) => &photo.file_name,
            PhotoItem::New(item) => &item.file.name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// What `remove` did with the item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// A new item was dropped; nothing was ever stored.
    Discarded(LocalFile),
    /// An existing photo was queued for deletion on the next sync.
    Deferred(Uuid),
}

#[derive(Debug, Default)]
pub struct PhotoSession {
    property_id: Option<Uuid>,
    items: Vec<PhotoItem>,
    pending: Vec<Photo>,
    previews: PreviewPool,
    last_batch_millis: Option<i64>,
}

impl PhotoSession {
    /// Start editing the photos of a saved property.
    pub fn open(property_id: Uuid, mut photos: Vec<Photo>) -> Self {
        crate::store::sort_by_display_order(&mut photos);
        Self {
            property_id: Some(property_id),
            items: photos.into_iter().map(PhotoItem::Existing).collect(),
            ..Default::default()
        }
    }

    /// A session for a property that is not saved yet. Files can be staged but the
    /// session cannot sync until [`PhotoSession::attach`] gives it a property.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, property_id: Uuid) {
        self.property_id = Some(property_id);
    }

    pub fn property_id(&self) -> Option<Uuid> {
        self.property_id
    }

    pub fn items(&self) -> &[PhotoItem] {
        &self.items
    }

    pub fn pending_deletions(&self) -> &[Photo] {
        &self.pending
    }

    pub fn previews(&self) -> &PreviewPool {
        &self.previews
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when a sync would change something in the stores.
    pub fn needs_sync(&self) -> bool {
        !self.pending.is_empty()
            || self.items.iter().enumerate().any(|(i, item)| match item {
                PhotoItem::New(_) => true,
                PhotoItem::Existing(photo) => photo.display_order as usize != i,
            })
    }

    /// Append picked files, in selection order, each with a fresh preview.
    pub fn append_new(&mut self, files: impl IntoIterator<Item = LocalFile>) -> Vec<PreviewHandle> {
        let mut issued = Vec::new();
        for file in files {
            let preview = self.previews.issue();
            self.items.push(PhotoItem::New(NewItem { file, preview }));
            issued.push(preview);
        }
        issued
    }

    /// Swap the item at `index` with its neighbour. Returns false (and changes
    /// nothing) at the list boundary or for an out-of-range index.
    pub fn move_item(&mut self, index: usize, direction: Direction) -> bool {
        if index >= self.items.len() {
            return false;
        }
        let target = match direction {
            Direction::Up if index == 0 => return false,
            Direction::Up => index - 1,
            Direction::Down if index + 1 == self.items.len() => return false,
            Direction::Down => index + 1,
        };
        self.items.swap(index, target);
        true
    }

    /// Make the item at `index` the primary photo, shifting the ones before it down.
    pub fn promote(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.items.len() {
            return false;
        }
        let item = self.items.remove(index);
        self.items.insert(0, item);
        true
    }

    /// Take the item at `index` out of the list.
    ///
    /// Existing photos are only queued for deletion; the stores are not touched.
    pub fn remove(&mut self, index: usize) -> Option<Removal> {
        if index >= self.items.len() {
            return None;
        }
        match self.items.remove(index) {
            PhotoItem::New(item) => {
                self.previews.revoke(item.preview);
                Some(Removal::Discarded(item.file))
            }
            PhotoItem::Existing(photo) => {
                let id = photo.id;
                self.pending.push(photo);
                Some(Removal::Deferred(id))
            }
        }
    }

    /// Rebuild the existing items from freshly fetched rows, keeping unsynced new
    /// items (after them, in their current order) and hiding pending deletions.
    pub fn merge_on_reload(&mut self, mut photos: Vec<Photo>) {
        crate::store::sort_by_display_order(&mut photos);
        let pending: HashSet<Uuid> = self.pending.iter().map(|p| p.id).collect();
        let fresh = photos
            .into_iter()
            .filter(|p| !pending.contains(&p.id))
            .map(PhotoItem::Existing);
        let staged = std::mem::take(&mut self.items)
            .into_iter()
            .filter(PhotoItem::is_new);
        self.items = fresh.chain(staged).collect();
    }

    /// Timestamp for the next upload batch, strictly after the previous batch of
    /// this session so a retry never reuses a path.
    pub(crate) fn next_batch_millis(&mut self, now: i64) -> i64 {
        let millis = match self.last_batch_millis {
            Some(last) if now <= last => last + 1,
            _ => now,
        };
        self.last_batch_millis = Some(millis);
        millis
    }

    pub(crate) fn take_pending(&mut self) -> Vec<Photo> {
        std::mem::take(&mut self.pending)
    }

    /// Swap a committed new item for the row that now represents it.
    pub(crate) fn commit_new(&mut self, index: usize, photo: Photo) {
        if let Some(slot) = self.items.get_mut(index) {
            if let PhotoItem::New(item) = std::mem::replace(slot, PhotoItem::Existing(photo)) {
                self.previews.revoke(item.preview);
            }
        }
    }

    pub(crate) fn set_display_order(&mut self, index: usize, order: u32) {
        if let Some(PhotoItem::Existing(photo)) = self.items.get_mut(index) {
            photo.display_order = order;
        }
    }

    /// Revoke the previews of every item still waiting for upload.
    ///
    /// The items stay in the list so a retry can upload them; their previews are
    /// reissued.
    pub(crate) fn release_previews(&mut self) {
        for item in self.items.iter() {
            if let PhotoItem::New(new) = item {
                self.previews.revoke(new.preview);
            }
        }
    }

    /// Give every new item a live preview again (after a failed sync released them).
    pub fn refresh_previews(&mut self) {
        for item in self.items.iter_mut() {
            if let PhotoItem::New(new) = item {
                if !self.previews.is_live(new.preview) {
                    new.preview = self.previews.issue();
                }
            }
        }
    }
}
