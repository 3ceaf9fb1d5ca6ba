//! Storage for medical documents attached to sick-leave requests.

mod azure;
mod ledger;
mod local;

pub use azure::AzureBlobStorage;
pub use ledger::{UploadLedger, sweep_orphans};
pub use local::LocalFileStorage;

use async_trait::async_trait;
use derive_more::Display;
use uuid::Uuid;

#[derive(Debug, Display)]
pub enum StorageError {
    #[display(fmt = "I/O error: {}", _0)]
    Io(std::io::Error),

    #[display(fmt = "HTTP error: {}", _0)]
    Http(reqwest::Error),

    #[display(fmt = "storage rejected blob '{}' with status {}", blob, status)]
    Rejected { status: u16, blob: String },

    #[display(fmt = "invalid storage url: {}", _0)]
    InvalidUrl(String),
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(e: reqwest::Error) -> Self {
        StorageError::Http(e)
    }
}

/// A file received with a leave submission.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl DocumentUpload {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Where an uploaded document ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub blob_name: String,
    pub url: String,
}

#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Writes `data` under `blob_name`, replacing any existing blob, and
    /// returns its retrievable reference.
    async fn upload(
        &self,
        blob_name: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> Result<StoredDocument, StorageError>;

    /// Removes a blob. Removing a blob that does not exist is not an error.
    async fn delete(&self, blob_name: &str) -> Result<(), StorageError>;
}

/// Keeps only characters safe for both blob names and file paths.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "document".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Unique blob name in the form `<kind>-<uuid>-<file name>`.
pub fn unique_blob_name(kind: &str, original_file_name: Option<&str>) -> String {
    format!(
        "{}-{}-{}",
        kind,
        Uuid::new_v4(),
        sanitize_file_name(original_file_name.unwrap_or_default())
    )
}
