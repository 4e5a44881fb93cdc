use super::{sort_by_display_order, BlobStore, PhotoRecords};
use crate::error::{PhotoError, Result};
use crate::model::{NewPhoto, Photo, PhotoPatch};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Number of calls each store method received. Lets tests assert that an
/// operation did (or did not) reach the store.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub upload: usize,
    pub remove: usize,
    pub select: usize,
    pub insert: usize,
    pub update: usize,
    pub delete: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.upload + self.remove + self.select + self.insert + self.update + self.delete
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    // A poisoned lock only means a test panicked mid-call; the data is still usable.
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
struct BlobState {
    objects: HashMap<String, Vec<u8>>,
    calls: CallCounts,
    simulate_upload_error: bool,
    simulate_remove_error: bool,
    /// Zero-based upload call numbers that fail.
    failing_uploads: HashSet<usize>,
}

/// In-memory blob store for testing.
///
/// Uses a `Mutex` rather than `RefCell` because the store traits are `Send + Sync`
/// and tests drive them from a multi-threaded runtime.
pub struct MemBlobStore {
    base_url: String,
    state: Mutex<BlobState>,
}

impl Default for MemBlobStore {
    fn default() -> Self {
        Self::new("memory://pics")
    }
}

impl MemBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            state: Mutex::new(BlobState::default()),
        }
    }

    /// Make every upload fail.
    pub fn set_simulate_upload_error(&self, simulate: bool) {
        lock(&self.state).simulate_upload_error = simulate;
    }

    /// Make every remove fail.
    pub fn set_simulate_remove_error(&self, simulate: bool) {
        lock(&self.state).simulate_remove_error = simulate;
    }

    /// Fail only the `n`-th upload call (zero-based, counted from now on or before).
    pub fn fail_upload_call(&self, n: usize) {
        lock(&self.state).failing_uploads.insert(n);
    }

    /// Seed an object without counting it as an upload.
    pub fn put(&self, path: &str, data: &[u8]) {
        lock(&self.state)
            .objects
            .insert(path.to_string(), data.to_vec());
    }

    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        lock(&self.state).objects.get(path).cloned()
    }

    pub fn contains(&self, path: &str) -> bool {
        lock(&self.state).objects.contains_key(path)
    }

    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = lock(&self.state).objects.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn calls(&self) -> CallCounts {
        lock(&self.state).calls
    }
}

#[async_trait]
impl BlobStore for MemBlobStore {
    async fn upload(&self, path: &str, data: &[u8]) -> Result<()> {
        let mut state = lock(&self.state);
        let call = state.calls.upload;
        state.calls.upload += 1;

        if state.simulate_upload_error || state.failing_uploads.contains(&call) {
            return Err(PhotoError::Blob(format!("Simulated upload error: {}", path)));
        }
        if state.objects.contains_key(path) {
            return Err(PhotoError::Blob(format!("Object already exists: {}", path)));
        }
        state.objects.insert(path.to_string(), data.to_vec());
        Ok(())
    }

    async fn remove(&self, paths: &[String]) -> Result<()> {
        let mut state = lock(&self.state);
        state.calls.remove += 1;

        if state.simulate_remove_error {
            return Err(PhotoError::Blob("Simulated remove error".to_string()));
        }
        for path in paths {
            state.objects.remove(path);
        }
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[derive(Default)]
struct RecordState {
    rows: HashMap<Uuid, Photo>,
    calls: CallCounts,
    simulate_write_error: bool,
    failing_deletes: HashSet<Uuid>,
}

/// In-memory photo table for testing.
#[derive(Default)]
pub struct MemRecordStore {
    state: Mutex<RecordState>,
}

impl MemRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make insert, update and delete fail.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        lock(&self.state).simulate_write_error = simulate;
    }

    /// Make deleting this one row fail.
    pub fn fail_delete_of(&self, id: Uuid) {
        lock(&self.state).failing_deletes.insert(id);
    }

    /// Seed a row without counting it as an insert.
    pub fn seed(&self, photo: Photo) {
        lock(&self.state).rows.insert(photo.id, photo);
    }

    pub fn get(&self, id: Uuid) -> Option<Photo> {
        lock(&self.state).rows.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn calls(&self) -> CallCounts {
        lock(&self.state).calls
    }
}

#[async_trait]
impl PhotoRecords for MemRecordStore {
    async fn select_by_property(&self, property_id: Uuid) -> Result<Vec<Photo>> {
        let mut state = lock(&self.state);
        state.calls.select += 1;
        let mut photos: Vec<Photo> = state
            .rows
            .values()
            .filter(|p| p.property_id == property_id)
            .cloned()
            .collect();
        sort_by_display_order(&mut photos);
        Ok(photos)
    }

    async fn insert(&self, photo: NewPhoto) -> Result<Photo> {
        let mut state = lock(&self.state);
        state.calls.insert += 1;
        if state.simulate_write_error {
            return Err(PhotoError::Record("Simulated write error".to_string()));
        }
        let row = Photo::from_new(photo);
        state.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, patch: PhotoPatch) -> Result<()> {
        let mut state = lock(&self.state);
        state.calls.update += 1;
        if state.simulate_write_error {
            return Err(PhotoError::Record("Simulated write error".to_string()));
        }
        let row = state
            .rows
            .get_mut(&id)
            .ok_or(PhotoError::PhotoNotFound(id))?;
        row.apply(&patch);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut state = lock(&self.state);
        state.calls.delete += 1;
        if state.simulate_write_error || state.failing_deletes.contains(&id) {
            return Err(PhotoError::Record(format!("Simulated delete error: {}", id)));
        }
        state.rows.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_photo(property_id: Uuid, order: u32) -> NewPhoto {
        NewPhoto {
            property_id,
            bucket_path: format!("{}/1-{}.jpg", property_id, order),
            display_order: order,
            file_name: format!("{}.jpg", order),
            file_size: Some(1),
            mime_type: Some("image/jpeg".to_string()),
            alt_text: None,
        }
    }

    #[tokio::test]
    async fn upload_rejects_existing_path() {
        let blobs = MemBlobStore::default();
        blobs.upload("a/1.jpg", b"x").await.unwrap();
        assert!(blobs.upload("a/1.jpg", b"y").await.is_err());
        assert_eq!(blobs.get("a/1.jpg"), Some(b"x".to_vec()));
    }

    #[tokio::test]
    async fn remove_ignores_missing_paths() {
        let blobs = MemBlobStore::default();
        blobs.put("a/1.jpg", b"x");
        blobs
            .remove(&["a/1.jpg".to_string(), "a/2.jpg".to_string()])
            .await
            .unwrap();
        assert!(blobs.paths().is_empty());
    }

    #[tokio::test]
    async fn failing_upload_call_only_hits_that_call() {
        let blobs = MemBlobStore::default();
        blobs.fail_upload_call(1);
        assert!(blobs.upload("a", b"1").await.is_ok());
        assert!(blobs.upload("b", b"2").await.is_err());
        assert!(blobs.upload("c", b"3").await.is_ok());
        assert_eq!(blobs.calls().upload, 3);
        assert_eq!(blobs.paths(), vec!["a", "c"]);
    }

    #[test]
    fn public_url_joins_base_and_path() {
        let blobs = MemBlobStore::new("https://cdn.example/pics/");
        assert_eq!(
            blobs.public_url("p/1-0.jpg"),
            "https://cdn.example/pics/p/1-0.jpg"
        );
    }

    #[tokio::test]
    async fn select_is_scoped_and_ordered() {
        let records = MemRecordStore::new();
        let property = Uuid::new_v4();
        let other = Uuid::new_v4();
        records.insert(new_photo(property, 2)).await.unwrap();
        records.insert(new_photo(property, 0)).await.unwrap();
        records.insert(new_photo(other, 1)).await.unwrap();
        records.insert(new_photo(property, 1)).await.unwrap();

        let orders: Vec<u32> = records
            .select_by_property(property)
            .await
            .unwrap()
            .iter()
            .map(|p| p.display_order)
            .collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn update_missing_row_is_not_found() {
        let records = MemRecordStore::new();
        let id = Uuid::new_v4();
        let err = records.update(id, PhotoPatch::order(0)).await.unwrap_err();
        assert!(matches!(err, PhotoError::PhotoNotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn write_error_simulation() {
        let records = MemRecordStore::new();
        records.set_simulate_write_error(true);
        assert!(records.insert(new_photo(Uuid::new_v4(), 0)).await.is_err());
        assert!(records.is_empty());
        assert_eq!(records.calls().insert, 1);
    }
}
