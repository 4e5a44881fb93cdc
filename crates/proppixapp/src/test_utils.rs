use crate::api::PhotosApi;
use crate::config::PhotosConfig;
use crate::model::LocalFile;
use crate::store::mem::{MemBlobStore, MemRecordStore};
use crate::store::StaticGate;
use uuid::Uuid;

pub type MemApi = PhotosApi<MemBlobStore, MemRecordStore, StaticGate>;

pub struct TestEnv {
    pub api: MemApi,
    /// A saved property with no photos yet.
    pub property: Uuid,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_gate(StaticGate(true))
    }

    pub fn unauthenticated() -> Self {
        Self::with_gate(StaticGate(false))
    }

    fn with_gate(gate: StaticGate) -> Self {
        Self {
            api: PhotosApi::new(
                MemBlobStore::default(),
                MemRecordStore::new(),
                gate,
                PhotosConfig::default(),
            ),
            property: Uuid::new_v4(),
        }
    }
}

/// A small valid JPEG-typed file whose bytes are its name.
pub fn image(name: &str) -> LocalFile {
    LocalFile::new(name, Some("image/jpeg"), name.as_bytes().to_vec())
}
