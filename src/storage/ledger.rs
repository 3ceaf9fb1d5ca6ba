use super::{DocumentStorage, StoredDocument};
use futures::channel::mpsc::{UnboundedReceiver, unbounded};
use moka::future::Cache;
use moka::notification::RemovalCause;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Uploads that are stored but not yet referenced by a persisted leave
/// request.
///
/// An upload is staged right after it reaches storage and committed once the
/// record pointing at it is saved. Entries that outlive the TTL without a
/// commit are handed to [`OrphanedUploads`] for deletion.
#[derive(Clone)]
pub struct UploadLedger {
    staged: Cache<String, StoredDocument>,
}

/// Receiving side of expired ledger entries.
pub struct OrphanedUploads {
    rx: UnboundedReceiver<StoredDocument>,
}

impl UploadLedger {
    pub fn new(ttl: Duration) -> (Self, OrphanedUploads) {
        let (tx, rx) = unbounded();

        let staged = Cache::builder()
            .time_to_live(ttl)
            .eviction_listener(move |_blob: Arc<String>, doc: StoredDocument, cause| {
                // commits invalidate explicitly; only expiry means orphaned
                if matches!(cause, RemovalCause::Expired) {
                    let _ = tx.unbounded_send(doc);
                }
            })
            .build();

        (Self { staged }, OrphanedUploads { rx })
    }

    pub async fn stage(&self, doc: &StoredDocument) {
        self.staged.insert(doc.blob_name.clone(), doc.clone()).await;
    }

    pub async fn commit(&self, blob_name: &str) {
        self.staged.invalidate(blob_name).await;
    }

    pub async fn is_staged(&self, blob_name: &str) -> bool {
        self.staged.get(blob_name).await.is_some()
    }

    /// Runs cache housekeeping so expired entries reach the orphan channel.
    pub async fn flush_expired(&self) {
        self.staged.run_pending_tasks().await;
    }
}

impl OrphanedUploads {
    fn drain(&mut self) -> Vec<StoredDocument> {
        let mut docs = Vec::new();
        while let Ok(doc) = self.rx.try_recv() {
            docs.push(doc);
        }
        docs
    }
}

/// Deletes every orphan currently known. Returns how many were removed.
pub async fn sweep_once(
    ledger: &UploadLedger,
    orphans: &mut OrphanedUploads,
    storage: &dyn DocumentStorage,
) -> usize {
    ledger.flush_expired().await;

    let mut removed = 0;
    for doc in orphans.drain() {
        match storage.delete(&doc.blob_name).await {
            Ok(()) => {
                warn!(blob = %doc.blob_name, "Deleted orphaned upload");
                removed += 1;
            }
            Err(e) => error!(error = %e, blob = %doc.blob_name, "Failed to delete orphaned upload"),
        }
    }
    removed
}

/// Background loop deleting uploads that were never committed.
pub async fn sweep_orphans(
    ledger: UploadLedger,
    mut orphans: OrphanedUploads,
    storage: Arc<dyn DocumentStorage>,
    every: Duration,
) {
    info!(interval_secs = every.as_secs(), "Orphan upload sweeper started");

    let mut interval = actix_web::rt::time::interval(every);
    loop {
        interval.tick().await;
        sweep_once(&ledger, &mut orphans, storage.as_ref()).await;
    }
}
