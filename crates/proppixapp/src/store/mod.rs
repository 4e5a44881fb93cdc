//! # Storage Layer
//!
//! Photos live in two external stores that know nothing about each other:
//!
//! 1. **Blob store** ([`BlobStore`]): the image bytes, addressed by path.
//! 2. **Record store** ([`PhotoRecords`]): one row per photo with its path, display order
//!    and file metadata.
//!
//! Neither store offers transactions that span the other, so every multi-step operation
//! in this crate is best-effort: a crash or failure between "upload" and "insert" leaves
//! an orphan blob, a failure between "remove" and "delete" leaves an orphan row. The
//! reconciler in [`crate::sync`] orders its calls so that retrying a failed batch is safe.
//!
//! ## Session Gate
//!
//! Mutations are only allowed for an authenticated administrator. The check itself is
//! owned by the surrounding application; this crate consumes it through [`SessionGate`].
//!
//! ## Implementations
//!
//! - [`mem::MemBlobStore`], [`mem::MemRecordStore`]: in-memory, with failure injection
//!   and call counters, for testing logic without I/O.
//! - [`fs::FsBlobStore`], [`fs::FsRecordStore`]: a bucket directory and a JSON table on
//!   local disk, used by the CLI.
//!
//! ## Storage Layout (fs backends)
//!
//! ```text
//! <data-dir>/
//! ├── proppix.toml            # Configuration
//! ├── photos.json             # Record store table
//! ├── photos.lock             # Held while a process rewrites photos.json
//! └── pics/                   # Bucket
//!     └── {property}/{millis}-{n}.{ext}
//! ```
//!
//! Several processes may share one data directory. Each rewrite of `photos.json` holds
//! an exclusive lock on `photos.lock`, so concurrent writers never drop each other's
//! rows. Between editors the last write of a row still wins.

use crate::error::Result;
use crate::model::{NewPhoto, Photo, PhotoPatch};
use async_trait::async_trait;
use uuid::Uuid;

pub mod fs;
pub mod mem;

/// Object storage addressed by path.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `path`. Uploading to an existing path is an error.
    async fn upload(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Remove every listed path. Missing paths are not an error.
    async fn remove(&self, paths: &[String]) -> Result<()>;

    /// Publicly reachable URL for `path`. Never fails; the object may not exist.
    fn public_url(&self, path: &str) -> String;
}

/// The photo table of the record store.
#[async_trait]
pub trait PhotoRecords: Send + Sync {
    /// All photos of a property, ordered by ascending display order.
    async fn select_by_property(&self, property_id: Uuid) -> Result<Vec<Photo>>;

    async fn insert(&self, photo: NewPhoto) -> Result<Photo>;

    /// Returns `PhotoNotFound` if no row has this id.
    async fn update(&self, id: Uuid, patch: PhotoPatch) -> Result<()>;

    /// Deleting a missing row is not an error.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// "Is there an authenticated administrative session?"
#[async_trait]
pub trait SessionGate: Send + Sync {
    async fn is_authenticated(&self) -> bool;
}

/// A gate with a fixed answer. The CLI runs as the local administrator.
#[derive(Debug, Clone, Copy)]
pub struct StaticGate(pub bool);

#[async_trait]
impl SessionGate for StaticGate {
    async fn is_authenticated(&self) -> bool {
        self.0
    }
}

/// Sort rows the way `select_by_property` must return them.
pub(crate) fn sort_by_display_order(photos: &mut [Photo]) {
    photos.sort_by(|a, b| {
        a.display_order
            .cmp(&b.display_order)
            .then(a.created_at.cmp(&b.created_at))
    });
}
