use super::{DocumentStorage, StorageError, StoredDocument};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

/// Documents stored as files under a root directory and served from
/// `public_base_url` by whatever fronts that directory.
pub struct LocalFileStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalFileStorage {
    pub fn new<P: AsRef<Path>>(root: P, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, blob_name: &str) -> PathBuf {
        self.root.join(blob_name)
    }
}

#[async_trait]
impl DocumentStorage for LocalFileStorage {
    async fn upload(
        &self,
        blob_name: &str,
        _content_type: Option<&str>,
        data: &[u8],
    ) -> Result<StoredDocument, StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.path_for(blob_name);
        tokio::fs::write(&path, data).await?;

        info!(path = %path.display(), size = data.len(), "Document stored");

        Ok(StoredDocument {
            blob_name: blob_name.to_string(),
            url: format!("{}/{}", self.public_base_url, blob_name),
        })
    }

    async fn delete(&self, blob_name: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.path_for(blob_name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
