//! Storage of uploaded files on the local file system.
//!
//! Files live under `<root>/<namespace>/` with generated names and are
//! addressed by URLs of the form `/<namespace>/<file>`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::domain::image::ImageUpload;

/// Namespace holding the featured product images.
pub const PRODUCT_IMAGE_NAMESPACE: &str = "img/featured";

/// Result type returned by [`FileStorage`] implementations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised while writing or removing stored files.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("file system error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid file url `{0}`")]
    InvalidUrl(String),
}

/// File storage used for product images.
pub trait FileStorage {
    /// Persist `image` inside `namespace` and return its public URL.
    fn store(&self, image: &ImageUpload, namespace: &str) -> StorageResult<String>;
    /// Remove the file behind `url` from `namespace`. Missing files are not an error.
    fn remove(&self, url: &str, namespace: &str) -> StorageResult<()>;
}

/// [`FileStorage`] backed by a directory on the local disk.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory that public URLs are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn namespace_dir(&self, namespace: &str) -> PathBuf {
        namespace
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
            .fold(self.root.clone(), |dir, segment| dir.join(segment))
    }
}

impl FileStorage for LocalFileStorage {
    fn store(&self, image: &ImageUpload, namespace: &str) -> StorageResult<String> {
        let dir = self.namespace_dir(namespace);
        fs::create_dir_all(&dir)?;

        let extension = image.extension().unwrap_or_else(|| "bin".to_string());
        let file_name = format!("{}.{extension}", Uuid::new_v4().simple());
        fs::write(dir.join(&file_name), &image.bytes)?;

        Ok(format!("/{}/{file_name}", namespace.trim_matches('/')))
    }

    fn remove(&self, url: &str, namespace: &str) -> StorageResult<()> {
        // Only the last segment is trusted so a URL cannot leave the namespace.
        let file_name = Path::new(url)
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| StorageError::InvalidUrl(url.to_string()))?;

        let path = self.namespace_dir(namespace).join(file_name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::warn!("Stored file {} is already gone", path.display());
                Ok(())
            }
            Err(err) => Err(StorageError::Io(err)),
        }
    }
}

#[cfg(test)]
mockall::mock! {
    pub FileStorage {}

    impl FileStorage for FileStorage {
        fn store(&self, image: &ImageUpload, namespace: &str) -> StorageResult<String>;
        fn remove(&self, url: &str, namespace: &str) -> StorageResult<()>;
    }
}
