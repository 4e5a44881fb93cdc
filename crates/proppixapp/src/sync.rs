//! # Reconciler
//!
//! [`sync`] makes the blob store and the record store match a [`PhotoSession`]:
//!
//! 1. **Drain deletions**: for every pending photo, remove its blob, then delete its row.
//!    Failures are logged and recorded in the report but never stop the batch.
//! 2. **Walk items**: position `i` in the list becomes display order `i`.
//!    - Existing photo: update its order, unless it already is `i`.
//!    - New file: upload to `"{property}/{millis}-{i}.{ext}"`, then insert its row.
//!      The inserted row replaces the item in the session, so a retry never uploads it
//!      twice.
//!
//!    The first failure stops the walk. Whatever was applied before it stays applied.
//! 3. **Release**: previews of new items that were not reached are revoked; the items
//!    stay in the session for a retry.
//!
//! There is no transaction and no rollback. A retry after a partial failure is safe:
//! deletions are already gone from the session, reorders are idempotent, and committed
//! uploads are already `Existing` items. The only unsafe window is between a
//! successful upload and its insert; a retry then uploads the file again under a new
//! timestamped path and the first blob is orphaned.

use crate::error::{PhotoError, Result};
use crate::model::{LocalFile, NewPhoto, Photo, PhotoPatch};
use crate::session::{PhotoItem, PhotoSession};
use crate::store::{BlobStore, PhotoRecords};
use chrono::Utc;
use uuid::Uuid;

/// A pending deletion step that failed and was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainFailure {
    pub photo_id: Uuid,
    pub bucket_path: String,
    pub error: String,
}

/// What a successful sync did.
#[derive(Debug, Default, Clone)]
pub struct SyncReport {
    /// Photos whose blob and row were both removed.
    pub deleted: Vec<Uuid>,
    pub drain_failures: Vec<DrainFailure>,
    /// Existing photos whose display order was rewritten.
    pub updated: usize,
    /// Existing photos already at the right order.
    pub skipped: usize,
    pub inserted: Vec<Photo>,
}

impl SyncReport {
    /// True when the stores were not touched at all.
    pub fn is_noop(&self) -> bool {
        self.deleted.is_empty()
            && self.drain_failures.is_empty()
            && self.updated == 0
            && self.inserted.is_empty()
    }
}

/// Blob path for a new upload.
///
/// `position` keeps paths unique within one batch, `millis` across batches.
pub fn storage_path(property_id: Uuid, millis: i64, position: usize, file: &LocalFile) -> String {
    match file.extension() {
        Some(ext) => format!("{}/{}-{}.{}", property_id, millis, position, ext),
        None => format!("{}/{}-{}", property_id, millis, position),
    }
}

fn display_order(position: usize) -> Result<u32> {
    u32::try_from(position)
        .map_err(|_| PhotoError::Validation(format!("Position {} is out of range", position)))
}

/// Apply `session` to the stores. See the module docs for the exact protocol.
pub async fn sync<B, R>(blobs: &B, records: &R, session: &mut PhotoSession) -> Result<SyncReport>
where
    B: BlobStore + ?Sized,
    R: PhotoRecords + ?Sized,
{
    let property_id = session.property_id().ok_or_else(|| {
        PhotoError::Validation("Save the property before adding photos".to_string())
    })?;

    let mut report = SyncReport::default();
    drain_deletions(blobs, records, session.take_pending(), &mut report).await;

    let walked = walk_items(blobs, records, property_id, session, &mut report).await;
    session.release_previews();

    match walked {
        Ok(()) => {
            tracing::info!(
                %property_id,
                deleted = report.deleted.len(),
                drain_failures = report.drain_failures.len(),
                updated = report.updated,
                skipped = report.skipped,
                inserted = report.inserted.len(),
                "photo sync complete"
            );
            Ok(report)
        }
        Err(err) => {
            tracing::error!(
                %property_id,
                inserted = report.inserted.len(),
                updated = report.updated,
                "photo sync stopped: {}",
                err
            );
            Err(err)
        }
    }
}

async fn drain_deletions<B, R>(blobs: &B, records: &R, pending: Vec<Photo>, report: &mut SyncReport)
where
    B: BlobStore + ?Sized,
    R: PhotoRecords + ?Sized,
{
    for photo in pending {
        let mut failed = false;

        if let Err(e) = blobs.remove(std::slice::from_ref(&photo.bucket_path)).await {
            tracing::warn!(photo_id = %photo.id, path = %photo.bucket_path, "blob removal failed: {}", e);
            report.drain_failures.push(DrainFailure {
                photo_id: photo.id,
                bucket_path: photo.bucket_path.clone(),
                error: e.to_string(),
            });
            failed = true;
        }

        if let Err(e) = records.delete(photo.id).await {
            tracing::warn!(photo_id = %photo.id, "row deletion failed: {}", e);
            report.drain_failures.push(DrainFailure {
                photo_id: photo.id,
                bucket_path: photo.bucket_path.clone(),
                error: e.to_string(),
            });
            failed = true;
        }

        if !failed {
            tracing::debug!(photo_id = %photo.id, "deleted photo");
            report.deleted.push(photo.id);
        }
    }
}

async fn walk_items<B, R>(
    blobs: &B,
    records: &R,
    property_id: Uuid,
    session: &mut PhotoSession,
    report: &mut SyncReport,
) -> Result<()>
where
    B: BlobStore + ?Sized,
    R: PhotoRecords + ?Sized,
{
    let millis = session.next_batch_millis(Utc::now().timestamp_millis());

    for position in 0..session.len() {
        let order = display_order(position)?;

        match &session.items()[position] {
            PhotoItem::Existing(photo) => {
                if photo.display_order == order {
                    report.skipped += 1;
                    continue;
                }
                let (id, path) = (photo.id, photo.bucket_path.clone());
                records
                    .update(id, PhotoPatch::order(order))
                    .await
                    .map_err(|e| PhotoError::sync_failed(position, &path, e))?;
                session.set_display_order(position, order);
                report.updated += 1;
            }
            PhotoItem::New(item) => {
                let path = storage_path(property_id, millis, position, &item.file);
                let row = NewPhoto::for_upload(property_id, path.clone(), order, &item.file);

                blobs
                    .upload(&path, &item.file.bytes)
                    .await
                    .map_err(|e| PhotoError::sync_failed(position, &path, e))?;
                let photo = records
                    .insert(row)
                    .await
                    .map_err(|e| PhotoError::sync_failed(position, &path, e))?;

                tracing::debug!(photo_id = %photo.id, %path, order, "uploaded photo");
                session.commit_new(position, photo.clone());
                report.inserted.push(photo);
            }
        }
    }
    Ok(())
}
