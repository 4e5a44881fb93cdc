//! # Domain Model: Photos and Local Files
//!
//! This module defines the data structures shared by every layer: [`Photo`] (a persisted
//! row), [`NewPhoto`] (the insert payload), [`PhotoPatch`] (a partial update), and
//! [`LocalFile`] (a file the user picked but nothing has uploaded yet).
//!
//! ## Display Order
//!
//! Each photo carries a zero-based `display_order` within its property. Order `0` is the
//! primary (cover) photo. There is no separate "primary" flag: [`Photo::is_primary`] is
//! derived from the order alone.
//!
//! After a successful sync the orders of one property form the contiguous set
//! `{0, …, N-1}`. While a session is being edited the rows may temporarily disagree with
//! what the user sees; the editing session is the source of truth until it is saved.
//!
//! ## Row Format
//!
//! Rows serialize with snake_case keys so the record store can persist them as-is:
//!
//! ```text
//! { "id", "property_id", "bucket_path", "display_order", "file_name",
//!   "file_size", "mime_type", "width", "height", "alt_text", "created_at" }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: Uuid,
    pub property_id: Uuid,
    /// Key of the image in the blob store, e.g. `"{property}/{millis}-{n}.jpg"`.
    pub bucket_path: String,
    pub display_order: u32,
    pub file_name: String,
    pub file_size: Option<u64>,
    pub mime_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub alt_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Photo {
    /// Materialize a row from an insert payload. Used by record stores.
    pub fn from_new(new: NewPhoto) -> Self {
        Self {
            id: Uuid::new_v4(),
            property_id: new.property_id,
            bucket_path: new.bucket_path,
            display_order: new.display_order,
            file_name: new.file_name,
            file_size: new.file_size,
            mime_type: new.mime_type,
            width: None,
            height: None,
            alt_text: new.alt_text,
            created_at: Utc::now(),
        }
    }

    pub fn is_primary(&self) -> bool {
        self.display_order == 0
    }

    /// Apply the fields present in `patch`.
    pub fn apply(&mut self, patch: &PhotoPatch) {
        if let Some(order) = patch.display_order {
            self.display_order = order;
        }
        if let Some(alt) = &patch.alt_text {
            self.alt_text = alt.clone();
        }
    }

    /// Text shown to users in place of the image.
    pub fn label(&self) -> &str {
        self.alt_text.as_deref().unwrap_or(&self.file_name)
    }
}

/// Photo fields without identity, as sent to [`crate::store::PhotoRecords::insert`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPhoto {
    pub property_id: Uuid,
    pub bucket_path: String,
    pub display_order: u32,
    pub file_name: String,
    pub file_size: Option<u64>,
    pub mime_type: Option<String>,
    pub alt_text: Option<String>,
}

impl NewPhoto {
    pub fn for_upload(property_id: Uuid, bucket_path: String, order: u32, file: &LocalFile) -> Self {
        Self {
            property_id,
            bucket_path,
            display_order: order,
            file_name: file.name.clone(),
            file_size: Some(file.size()),
            mime_type: file.mime_type.clone(),
            alt_text: None,
        }
    }
}

/// Partial update of a photo row. `None` leaves the field untouched.
///
/// `alt_text` is doubly optional so a patch can clear it: `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoPatch {
    pub display_order: Option<u32>,
    pub alt_text: Option<Option<String>>,
}

impl PhotoPatch {
    pub fn order(display_order: u32) -> Self {
        Self {
            display_order: Some(display_order),
            ..Default::default()
        }
    }
}

/// A file selected by the user, held in memory until a sync uploads it.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, mime_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.map(str::to_string),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Text after the last `.` of the file name, if any.
    pub fn extension(&self) -> Option<&str> {
        match self.name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => Some(ext),
            _ => None,
        }
    }
}

// Bytes are elided so session dumps stay readable.
impl std::fmt::Debug for LocalFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}
