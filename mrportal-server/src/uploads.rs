//! Local disk storage for uploaded files.
//!
//! Files are written as `<uuid-v7><.ext>` under the configured directory and
//! served back read-only under [`PUBLIC_PREFIX`].

use bytes::Bytes;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// URL prefix the upload directory is mounted at.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Longest file extension kept from the client's file name.
const MAX_EXTENSION_LEN: usize = 10;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `contents` to a fresh file and return its public path.
    ///
    /// Only the extension of `original_name` is kept, and only when it is
    /// short and alphanumeric.
    pub async fn save(
        &self,
        original_name: Option<&str>,
        contents: Bytes,
    ) -> Result<String, UploadError> {
        let name = match original_name.and_then(extension) {
            Some(ext) => format!("{}.{ext}", Uuid::now_v7()),
            None => Uuid::now_v7().to_string(),
        };
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&name), &contents).await?;
        tracing::debug!(file = %name, size = contents.len(), "Upload stored");
        Ok(format!("{PUBLIC_PREFIX}/{name}"))
    }

    /// Remove a file stored by [`Self::save`] whose record was never written.
    pub async fn discard(&self, public_path: &str) {
        let Some(name) = public_path
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.contains('/'))
        else {
            return;
        };
        if let Err(e) = tokio::fs::remove_file(self.root.join(name)).await {
            tracing::warn!(file = %name, error = %e, "Failed to discard upload");
        }
    }
}

fn extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let valid = !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.bytes().all(|b| b.is_ascii_alphanumeric());
    valid.then(|| ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_sanitised() {
        assert_eq!(extension("report.PDF").as_deref(), Some("pdf"));
        assert_eq!(extension("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension("noext"), None);
        assert_eq!(extension("evil.p/../x"), None);
        assert_eq!(extension("trailing."), None);
    }

    #[tokio::test]
    async fn test_save_writes_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadDir::new(dir.path().join("nested"));
        let path = uploads
            .save(Some("brochure.pdf"), Bytes::from_static(b"%PDF-1.7"))
            .await
            .unwrap();
        assert!(path.starts_with("/uploads/"));
        assert!(path.ends_with(".pdf"));

        let name = path.trim_start_matches("/uploads/");
        let stored = tokio::fs::read(uploads.root().join(name)).await.unwrap();
        assert_eq!(stored, b"%PDF-1.7");

        uploads.discard(&path).await;
        assert!(!uploads.root().join(name).exists());
    }
}
