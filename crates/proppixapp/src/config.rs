//! # Configuration
//!
//! Configuration is managed by [`confique`], which layers environment variables over a
//! TOML file over compiled defaults.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `PROPPIX_BUCKET`, `PROPPIX_PUBLIC_BASE_URL`, etc.
//! 2. **Config file**: `proppix.toml` in the data directory.
//! 3. **Compiled defaults**: via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `bucket` | `pics` | Bucket (directory) holding photo blobs |
//! | `public_base_url` | none | Prefix of public photo URLs; `file://` links when absent |
//! | `max_file_size` | `10485760` | Largest accepted upload, in bytes |
//! | `accepted_mime_prefix` | `image/` | Uploads must have a MIME type with this prefix |

use crate::error::{PhotoError, Result};
use crate::model::LocalFile;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "proppix.toml";

const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Configuration for proppix, stored in `proppix.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PhotosConfig {
    /// Bucket holding photo blobs.
    #[config(env = "PROPPIX_BUCKET", default = "pics")]
    pub bucket: String,

    /// Prefix of public photo URLs.
    #[config(env = "PROPPIX_PUBLIC_BASE_URL")]
    pub public_base_url: Option<String>,

    /// Largest accepted upload, in bytes.
    #[config(env = "PROPPIX_MAX_FILE_SIZE", default = 10485760)]
    pub max_file_size: u64,

    /// Uploads must carry a MIME type starting with this prefix.
    #[config(env = "PROPPIX_ACCEPTED_MIME_PREFIX", default = "image/")]
    pub accepted_mime_prefix: String,
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            bucket: "pics".to_string(),
            public_base_url: None,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            accepted_mime_prefix: "image/".to_string(),
        }
    }
}

impl PhotosConfig {
    /// Load from the environment and `<data_dir>/proppix.toml`. A missing file is fine.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config = Self::builder()
            .env()
            .file(data_dir.join(CONFIG_FILE))
            .load()?;
        Ok(config)
    }

    pub fn bucket_dir(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.bucket)
    }

    /// Check a picked file against the upload policy.
    ///
    /// This is the UI-boundary check; editing sessions accept anything.
    pub fn validate_file(&self, file: &LocalFile) -> Result<()> {
        if file.size() > self.max_file_size {
            return Err(PhotoError::Validation(format!(
                "{} is {} bytes; the limit is {} bytes",
                file.name,
                file.size(),
                self.max_file_size
            )));
        }
        let accepted = file
            .mime_type
            .as_deref()
            .is_some_and(|mime| mime.starts_with(&self.accepted_mime_prefix));
        if !accepted {
            return Err(PhotoError::Validation(format!(
                "{} is not an accepted file type (expected {}*)",
                file.name, self.accepted_mime_prefix
            )));
        }
        Ok(())
    }
}
