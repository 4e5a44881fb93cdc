use super::{sort_by_display_order, BlobStore, PhotoRecords};
use crate::error::{PhotoError, Result};
use crate::model::{NewPhoto, Photo, PhotoPatch};
use async_trait::async_trait;
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Write `content` next to `target` and rename it into place.
async fn write_atomic(target: &Path, content: &[u8]) -> Result<()> {
    let dir = target
        .parent()
        .ok_or_else(|| PhotoError::Validation(format!("No parent for {}", target.display())))?;
    fs::create_dir_all(dir).await?;
    let tmp = dir.join(format!(".write-{}.tmp", Uuid::new_v4()));
    fs::write(&tmp, content).await?;
    fs::rename(&tmp, target).await?;
    Ok(())
}

/// A bucket directory on local disk.
pub struct FsBlobStore {
    root: PathBuf,
    base_url: String,
}

impl FsBlobStore {
    /// Objects live under `root`. When `base_url` is `None`, URLs are `file://` links
    /// into `root`.
    pub fn new(root: PathBuf, base_url: Option<String>) -> Self {
        let base_url = base_url.unwrap_or_else(|| format!("file://{}", root.display()));
        Self { root, base_url }
    }

    /// Resolve a blob path inside the bucket, refusing anything that would escape it.
    fn object_path(&self, path: &str) -> Result<PathBuf> {
        let rel = Path::new(path);
        let safe = !path.is_empty()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(PhotoError::Validation(format!(
                "Invalid blob path: {:?}",
                path
            )));
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload(&self, path: &str, data: &[u8]) -> Result<()> {
        let target = self.object_path(path)?;
        if fs::try_exists(&target).await? {
            return Err(PhotoError::Blob(format!("Object already exists: {}", path)));
        }
        write_atomic(&target, data).await?;
        tracing::debug!(path, bytes = data.len(), "stored blob");
        Ok(())
    }

    async fn remove(&self, paths: &[String]) -> Result<()> {
        for path in paths {
            let target = self.object_path(path)?;
            match fs::remove_file(&target).await {
                Ok(()) => tracing::debug!(path = %path, "removed blob"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(PhotoError::Io(e)),
            }
        }
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// The photo table as a JSON file (`photos.json`), rewritten atomically on every change.
///
/// Every read-modify-write cycle holds `write_lock` within the process and an exclusive
/// lock on `photos.lock` across processes.
pub struct FsRecordStore {
    table: PathBuf,
    write_lock: Mutex<()>,
}

impl FsRecordStore {
    pub fn new(table: PathBuf) -> Self {
        Self {
            table,
            write_lock: Mutex::new(()),
        }
    }

    /// Take the table's lock file, waiting for any other process holding it.
    /// Released when the returned file is dropped.
    async fn lock_table(&self) -> Result<File> {
        let path = self.table.with_extension("lock");
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }
        let file = tokio::task::spawn_blocking(move || -> std::io::Result<File> {
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&path)?;
            file.lock_exclusive()?;
            Ok(file)
        })
        .await
        .map_err(|e| PhotoError::Record(format!("Table lock task failed: {}", e)))??;
        Ok(file)
    }

    async fn load(&self) -> Result<HashMap<Uuid, Photo>> {
        if !fs::try_exists(&self.table).await? {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&self.table).await?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    async fn save(&self, rows: &HashMap<Uuid, Photo>) -> Result<()> {
        let content = serde_json::to_string_pretty(rows)?;
        write_atomic(&self.table, content.as_bytes()).await
    }
}

#[async_trait]
impl PhotoRecords for FsRecordStore {
    async fn select_by_property(&self, property_id: Uuid) -> Result<Vec<Photo>> {
        let rows = self.load().await?;
        let mut photos: Vec<Photo> = rows
            .into_values()
            .filter(|p| p.property_id == property_id)
            .collect();
        sort_by_display_order(&mut photos);
        Ok(photos)
    }

    async fn insert(&self, photo: NewPhoto) -> Result<Photo> {
        let _guard = self.write_lock.lock().await;
        let _table = self.lock_table().await?;
        let mut rows = self.load().await?;
        if rows.values().any(|p| p.bucket_path == photo.bucket_path) {
            return Err(PhotoError::Record(format!(
                "Duplicate bucket path: {}",
                photo.bucket_path
            )));
        }
        let row = Photo::from_new(photo);
        rows.insert(row.id, row.clone());
        self.save(&rows).await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, patch: PhotoPatch) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let _table = self.lock_table().await?;
        let mut rows = self.load().await?;
        rows.get_mut(&id)
            .ok_or(PhotoError::PhotoNotFound(id))?
            .apply(&patch);
        self.save(&rows).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let _table = self.lock_table().await?;
        let mut rows = self.load().await?;
        if rows.remove(&id).is_some() {
            self.save(&rows).await?;
        }
        Ok(())
    }
}
