use proppixapp::error::PhotoError;
use proppixapp::model::{NewPhoto, PhotoPatch};
use proppixapp::store::fs::{FsBlobStore, FsRecordStore};
use proppixapp::store::{BlobStore, PhotoRecords};
use std::fs;
use tempfile::TempDir;
use uuid::Uuid;

fn setup() -> (TempDir, FsBlobStore, FsRecordStore) {
    let dir = TempDir::new().unwrap();
    let blobs = FsBlobStore::new(dir.path().join("pics"), None);
    let records = FsRecordStore::new(dir.path().join("photos.json"));
    (dir, blobs, records)
}

fn new_photo(property_id: Uuid, order: u32, path: &str) -> NewPhoto {
    NewPhoto {
        property_id,
        bucket_path: path.to_string(),
        display_order: order,
        file_name: format!("{}.jpg", order),
        file_size: Some(3),
        mime_type: Some("image/jpeg".to_string()),
        alt_text: None,
    }
}

#[tokio::test]
async fn test_fs_blob_upload_and_remove() {
    let (dir, blobs, _) = setup();
    let property = Uuid::new_v4();
    let path = format!("{}/1700000000000-0.jpg", property);

    blobs.upload(&path, b"jpg").await.unwrap();
    let on_disk = dir.path().join("pics").join(&path);
    assert_eq!(fs::read(&on_disk).unwrap(), b"jpg");

    // Uploading twice to one path is refused.
    assert!(blobs.upload(&path, b"other").await.is_err());

    blobs.remove(&[path.clone()]).await.unwrap();
    assert!(!on_disk.exists());

    // Removing again is fine.
    blobs.remove(&[path]).await.unwrap();
}

#[tokio::test]
async fn test_fs_blob_leaves_no_tmp_files() {
    let (dir, blobs, _) = setup();
    blobs.upload("p/0.jpg", b"a").await.unwrap();
    blobs.upload("p/1.jpg", b"b").await.unwrap();

    for entry in fs::read_dir(dir.path().join("pics").join("p")).unwrap() {
        let path = entry.unwrap().path();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
    }
}

#[tokio::test]
async fn test_fs_blob_rejects_escaping_paths() {
    let (_dir, blobs, _) = setup();
    for bad in ["../outside.jpg", "/etc/passwd", "", "p/../../x"] {
        let err = blobs.upload(bad, b"x").await.unwrap_err();
        assert!(matches!(err, PhotoError::Validation(_)), "{:?} accepted", bad);
    }
}

#[tokio::test]
async fn test_fs_blob_public_url() {
    let dir = TempDir::new().unwrap();
    let with_base = FsBlobStore::new(
        dir.path().to_path_buf(),
        Some("https://cdn.example/pics/".to_string()),
    );
    assert_eq!(with_base.public_url("p/0.jpg"), "https://cdn.example/pics/p/0.jpg");

    let local = FsBlobStore::new(dir.path().to_path_buf(), None);
    assert!(local.public_url("p/0.jpg").starts_with("file://"));
    assert!(local.public_url("p/0.jpg").ends_with("/p/0.jpg"));
}

#[tokio::test]
async fn test_fs_records_crud() {
    let (_dir, _, records) = setup();
    let property = Uuid::new_v4();

    let b = records.insert(new_photo(property, 1, "p/b.jpg")).await.unwrap();
    let a = records.insert(new_photo(property, 0, "p/a.jpg")).await.unwrap();
    records
        .insert(new_photo(Uuid::new_v4(), 0, "q/a.jpg"))
        .await
        .unwrap();

    let listed = records.select_by_property(property).await.unwrap();
    assert_eq!(listed, vec![a.clone(), b.clone()]);

    records.update(a.id, PhotoPatch::order(1)).await.unwrap();
    records.update(b.id, PhotoPatch::order(0)).await.unwrap();
    let ids: Vec<Uuid> = records
        .select_by_property(property)
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![b.id, a.id]);

    records.delete(a.id).await.unwrap();
    records.delete(a.id).await.unwrap();
    assert_eq!(records.select_by_property(property).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_fs_records_reject_duplicate_path_and_missing_update() {
    let (_dir, _, records) = setup();
    let property = Uuid::new_v4();
    records.insert(new_photo(property, 0, "p/a.jpg")).await.unwrap();

    assert!(matches!(
        records.insert(new_photo(property, 1, "p/a.jpg")).await,
        Err(PhotoError::Record(_))
    ));
    assert!(matches!(
        records.update(Uuid::new_v4(), PhotoPatch::order(3)).await,
        Err(PhotoError::PhotoNotFound(_))
    ));
}

#[tokio::test]
async fn test_fs_records_persist_across_instances() {
    let (dir, _, records) = setup();
    let property = Uuid::new_v4();
    let photo = records.insert(new_photo(property, 0, "p/a.jpg")).await.unwrap();
    drop(records);

    let reopened = FsRecordStore::new(dir.path().join("photos.json"));
    assert_eq!(reopened.select_by_property(property).await.unwrap(), vec![photo]);
}

#[tokio::test]
async fn test_fs_records_missing_table_is_empty() {
    let (_dir, _, records) = setup();
    assert!(records
        .select_by_property(Uuid::new_v4())
        .await
        .unwrap()
        .is_empty());
}

async fn insert_many(store: &FsRecordStore, property: Uuid, tag: &str, count: u32) {
    for i in 0..count {
        store
            .insert(new_photo(property, i, &format!("p/{}-{}.jpg", tag, i)))
            .await
            .unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fs_records_separate_instances_keep_every_row() {
    // Two stores on one table stand in for two processes sharing a data directory.
    let (dir, _, first) = setup();
    let second = FsRecordStore::new(dir.path().join("photos.json"));
    let property = Uuid::new_v4();

    tokio::join!(
        insert_many(&first, property, "a", 15),
        insert_many(&second, property, "b", 15),
    );

    assert_eq!(first.select_by_property(property).await.unwrap().len(), 30);
    assert!(dir.path().join("photos.lock").exists());
}
