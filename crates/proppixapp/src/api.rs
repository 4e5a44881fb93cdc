//! # API Facade
//!
//! The API layer is a **thin facade** over sessions and the reconciler. It is the single
//! entry point for UI clients (the CLI, a web backoffice, ...).
//!
//! ## Role and Responsibilities
//!
//! - **Gates** every mutation behind [`SessionGate::is_authenticated`].
//! - **Opens** editors on the current rows of a property.
//! - **Saves** editors through their single-flight guard.
//! - **Validates** picked files at the boundary (size and MIME type), before they ever
//!   reach a session.
//!
//! ## Two Ways to Edit
//!
//! The property forms stage edits in a [`PhotoEditor`] and save once:
//!
//! ```text
//! let editor = api.open(property).await?;
//! editor.append_new(files).await;
//! editor.promote(2).await;
//! api.save(&editor).await?;
//! ```
//!
//! The standalone photo manager applies each action immediately. The `*_now` methods
//! do exactly that: open, apply one local operation, save.
//!
//! ## Generic Over Stores
//!
//! `PhotosApi<B, R, G>` is generic over the blob store, record store and gate:
//! - Production (CLI): `PhotosApi<FsBlobStore, FsRecordStore, StaticGate>`
//! - Testing: `PhotosApi<MemBlobStore, MemRecordStore, StaticGate>`

use crate::config::PhotosConfig;
use crate::editor::PhotoEditor;
use crate::error::{PhotoError, Result};
use crate::model::{LocalFile, Photo};
use crate::session::{Direction, PhotoSession};
use crate::store::{BlobStore, PhotoRecords, SessionGate};
use crate::sync::SyncReport;
use uuid::Uuid;

/// A stored photo as a client displays it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoView {
    pub photo: Photo,
    pub url: String,
    /// Zero-based position in the property's list.
    pub position: usize,
}

impl PhotoView {
    pub fn is_primary(&self) -> bool {
        self.position == 0
    }
}

pub struct PhotosApi<B, R, G> {
    blobs: B,
    records: R,
    gate: G,
    config: PhotosConfig,
}

impl<B, R, G> PhotosApi<B, R, G>
where
    B: BlobStore,
    R: PhotoRecords,
    G: SessionGate,
{
    pub fn new(blobs: B, records: R, gate: G, config: PhotosConfig) -> Self {
        Self {
            blobs,
            records,
            gate,
            config,
        }
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    pub fn records(&self) -> &R {
        &self.records
    }

    pub fn config(&self) -> &PhotosConfig {
        &self.config
    }

    pub fn photo_url(&self, photo: &Photo) -> String {
        self.blobs.public_url(&photo.bucket_path)
    }

    /// Stored photos of a property in display order, with their public URLs.
    pub async fn list(&self, property_id: Uuid) -> Result<Vec<PhotoView>> {
        let photos = self.records.select_by_property(property_id).await?;
        Ok(photos
            .into_iter()
            .enumerate()
            .map(|(position, photo)| PhotoView {
                url: self.photo_url(&photo),
                photo,
                position,
            })
            .collect())
    }

    /// Open an editor on the current photos of a saved property.
    pub async fn open(&self, property_id: Uuid) -> Result<PhotoEditor> {
        let photos = self.records.select_by_property(property_id).await?;
        Ok(PhotoEditor::new(PhotoSession::open(property_id, photos)))
    }

    /// Open an editor for a property that is not saved yet.
    pub fn open_detached(&self) -> PhotoEditor {
        PhotoEditor::new(PhotoSession::detached())
    }

    /// Refetch the rows of the editor's property and merge them into it.
    pub async fn reload(&self, editor: &PhotoEditor) -> Result<()> {
        let property_id = editor
            .property_id()
            .await
            .ok_or_else(|| PhotoError::Validation("Editor has no property yet".to_string()))?;
        let photos = self.records.select_by_property(property_id).await?;
        editor.merge_on_reload(photos).await;
        Ok(())
    }

    pub async fn save(&self, editor: &PhotoEditor) -> Result<SyncReport> {
        self.require_session().await?;
        editor.save(&self.blobs, &self.records).await
    }

    /// Check picked files against the upload policy. The first offending file fails.
    pub fn validate_files(&self, files: &[LocalFile]) -> Result<()> {
        for file in files {
            if let Err(e) = self.config.validate_file(file) {
                tracing::warn!(file = %file.name, "rejected upload: {}", e);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Append files to the end of a property's photos and sync right away.
    pub async fn upload_now(&self, property_id: Uuid, files: Vec<LocalFile>) -> Result<SyncReport> {
        self.validate_files(&files)?;
        self.require_session().await?;
        let editor = self.open(property_id).await?;
        editor.append_new(files).await;
        self.save(&editor).await
    }

    /// Delete the photo at `index` and renumber the rest.
    pub async fn remove_now(&self, property_id: Uuid, index: usize) -> Result<SyncReport> {
        self.require_session().await?;
        let editor = self.open(property_id).await?;
        if editor.remove(index).await.is_none() {
            return Err(no_photo_at(index));
        }
        self.save(&editor).await
    }

    /// Swap the photo at `index` with its neighbour. At a boundary nothing changes.
    pub async fn move_now(
        &self,
        property_id: Uuid,
        index: usize,
        direction: Direction,
    ) -> Result<SyncReport> {
        self.require_session().await?;
        let editor = self.open(property_id).await?;
        if editor.items().await.get(index).is_none() {
            return Err(no_photo_at(index));
        }
        editor.move_item(index, direction).await;
        self.save(&editor).await
    }

    /// Make the photo at `index` the primary one.
    pub async fn promote_now(&self, property_id: Uuid, index: usize) -> Result<SyncReport> {
        self.require_session().await?;
        let editor = self.open(property_id).await?;
        if editor.items().await.get(index).is_none() {
            return Err(no_photo_at(index));
        }
        editor.promote(index).await;
        self.save(&editor).await
    }

    async fn require_session(&self) -> Result<()> {
        if self.gate.is_authenticated().await {
            Ok(())
        } else {
            tracing::warn!("photo mutation refused without an authenticated session");
            Err(PhotoError::Unauthenticated)
        }
    }
}

fn no_photo_at(index: usize) -> PhotoError {
    PhotoError::Validation(format!("No photo at position {}", index + 1))
}
