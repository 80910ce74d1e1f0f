// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flat-directory storage for uploaded models.
//!
//! Files are named `<unix-millis><.ext>` at upload time and kept until
//! someone deletes them by hand. Nothing else about an upload is recorded.

use crate::error::ApiError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Upload directory on local disk.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Open the store, creating the directory if it doesn't exist.
    pub async fn new(upload_dir: &str) -> Self {
        let path = PathBuf::from(upload_dir);

        if let Err(e) = tokio::fs::create_dir_all(&path).await {
            tracing::warn!(
                error = %e,
                path = %path.display(),
                "Failed to create upload directory"
            );
        }

        Self { root: path }
    }

    /// Directory files are stored in (also the static-serving root).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stored name for an upload: timestamp plus the original extension.
    pub fn generate_name(original_name: &str, timestamp_ms: u128) -> String {
        match extension_of(original_name) {
            Some(ext) => format!("{}.{}", timestamp_ms, ext),
            None => timestamp_ms.to_string(),
        }
    }

    /// Write an upload and return its stored name.
    ///
    /// Two uploads in the same millisecond get consecutive timestamps rather
    /// than overwriting each other.
    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<String, ApiError> {
        let mut timestamp = now_millis();
        loop {
            let name = Self::generate_name(original_name, timestamp);
            let path = self.root.join(&name);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => {
                    write_or_discard(&path, file, data).await?;
                    tracing::info!(
                        filename = %name,
                        original = %original_name,
                        size = data.len(),
                        "Stored upload"
                    );
                    return Ok(name);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => timestamp += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Read a stored model by name.
    pub async fn read(&self, name: &str) -> Result<Vec<u8>, ApiError> {
        let path = self.resolve(name)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ApiError::NotFound(format!("Model not found: {}", name)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Map a stored name to its path, refusing anything that is not a plain
    /// file name inside the store.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, ApiError> {
        let is_plain = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\'])
            && !name.contains('\0');
        if !is_plain {
            return Err(ApiError::InvalidParameter(format!("Invalid model name: {}", name)));
        }
        Ok(self.root.join(name))
    }
}

/// Write `data` to a freshly created file, removing the file again if the
/// write does not complete.
async fn write_or_discard<W>(path: &Path, mut file: W, data: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = match file.write_all(data).await {
        Ok(()) => file.flush().await,
        Err(e) => Err(e),
    };
    let Err(e) = written else {
        return Ok(());
    };

    drop(file);
    if let Err(remove_err) = tokio::fs::remove_file(path).await {
        tracing::warn!(
            path = %path.display(),
            error = %remove_err,
            "Failed to remove partial upload"
        );
    }
    Err(e)
}

fn extension_of(original_name: &str) -> Option<&str> {
    // Browsers may send a full client-side path
    let base = original_name.rsplit(['/', '\\']).next().unwrap_or(original_name);
    let (stem, ext) = base.rsplit_once('.')?;
    let valid = !stem.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then_some(ext)
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}
