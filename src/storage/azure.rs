use super::{DocumentStorage, StorageError, StoredDocument};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, info};

const API_VERSION: &str = "2021-08-06";

/// Azure Blob Storage over its REST API, authorized with a SAS token.
pub struct AzureBlobStorage {
    client: Client,
    account: String,
    container: String,
    sas_token: String,
}

impl AzureBlobStorage {
    pub fn new(account: String, container: String, sas_token: String) -> Self {
        Self {
            client: Client::new(),
            account,
            container,
            // tokens are often copied with their leading '?'
            sas_token: sas_token.trim_start_matches('?').to_string(),
        }
    }

    /// Public URL of a blob, without credentials.
    fn blob_url(&self, blob_name: &str) -> Result<Url, StorageError> {
        let base = format!("https://{}.blob.core.windows.net", self.account);
        let mut url = Url::parse(&base).map_err(|e| StorageError::InvalidUrl(e.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| StorageError::InvalidUrl(base.clone()))?
            .push(&self.container)
            .push(blob_name);

        Ok(url)
    }

    fn signed_url(&self, blob_name: &str) -> Result<Url, StorageError> {
        let mut url = self.blob_url(blob_name)?;
        url.set_query(Some(&self.sas_token));
        Ok(url)
    }
}

#[async_trait]
impl DocumentStorage for AzureBlobStorage {
    async fn upload(
        &self,
        blob_name: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> Result<StoredDocument, StorageError> {
        debug!(blob = blob_name, size = data.len(), "Uploading blob");

        let response = self
            .client
            .put(self.signed_url(blob_name)?)
            .header("x-ms-blob-type", "BlockBlob")
            .header("x-ms-version", API_VERSION)
            .header(
                "Content-Type",
                content_type.unwrap_or("application/octet-stream"),
            )
            .body(data.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::Rejected {
                status: response.status().as_u16(),
                blob: blob_name.to_string(),
            });
        }

        info!(blob = blob_name, container = %self.container, "Blob uploaded");

        Ok(StoredDocument {
            blob_name: blob_name.to_string(),
            url: self.blob_url(blob_name)?.to_string(),
        })
    }

    async fn delete(&self, blob_name: &str) -> Result<(), StorageError> {
        let response = self
            .client
            .delete(self.signed_url(blob_name)?)
            .header("x-ms-version", API_VERSION)
            .send()
            .await?;

        match response.status() {
            s if s.is_success() || s == StatusCode::NOT_FOUND => {
                info!(blob = blob_name, "Blob deleted");
                Ok(())
            }
            s => Err(StorageError::Rejected {
                status: s.as_u16(),
                blob: blob_name.to_string(),
            }),
        }
    }
}
