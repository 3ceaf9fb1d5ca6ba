use crate::error::LeaveError;
use crate::model::leave_request::{
    LeaveQuery, LeaveRequest, LeaveRequestData, LeaveStatus, LeaveType,
};
use crate::repository::LeaveRepository;
use crate::storage::{DocumentStorage, DocumentUpload, StoredDocument, UploadLedger, unique_blob_name};
use crate::utils::business_days::business_days;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

const MEDICAL_DOCUMENT_KIND: &str = "medicalDocument";

pub type LeaveResult<T> = Result<T, LeaveError>;

/// Business rules that vary per deployment.
#[derive(Debug, Clone, Copy)]
pub struct LeavePolicy {
    /// Sick leave longer than this many business days keeps a medical document.
    pub medical_document_threshold_days: u32,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            medical_document_threshold_days: 2,
        }
    }
}

/// Owns the leave request lifecycle: submission, status changes, updates,
/// deletion and queries. Holds no record state between calls.
#[derive(Clone)]
pub struct LeaveService {
    repo: Arc<dyn LeaveRepository>,
    storage: Arc<dyn DocumentStorage>,
    ledger: UploadLedger,
    policy: LeavePolicy,
}

/// Checks required fields and builds a record (id 0) from `data`.
fn build_leave(data: LeaveRequestData, status: LeaveStatus) -> LeaveResult<LeaveRequest> {
    if data.employee_id.trim().is_empty() {
        return Err(LeaveError::invalid("employeeId is required"));
    }

    let leave_type = data
        .leave_type
        .ok_or_else(|| LeaveError::invalid("leaveType is required"))?;

    let (start, end) = match (data.leave_start_date, data.leave_end_date) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(LeaveError::invalid(
                "leaveStartDate and leaveEndDate are required",
            ));
        }
    };

    if start > end {
        return Err(LeaveError::invalid(
            "leaveStartDate cannot be after leaveEndDate",
        ));
    }

    Ok(LeaveRequest {
        id: 0,
        employee_id: data.employee_id,
        first_name: data.first_name,
        last_name: data.last_name,
        email: data.email,
        position: data.position,
        phone: data.phone,
        manager_id: data.manager_id,
        manager_name: data.manager_name,
        manager_email: data.manager_email,
        leave_type,
        leave_status: status,
        leave_start_date: start,
        leave_end_date: end,
        leave_reason: data.leave_reason,
        comments: data.comments,
        duration_type: data.duration_type,
        duration: data.duration,
        medical_document: data.medical_document,
        rejection_reason: data.rejection_reason,
        created_at: None,
    })
}

impl LeaveService {
    pub fn new(
        repo: Arc<dyn LeaveRepository>,
        storage: Arc<dyn DocumentStorage>,
        ledger: UploadLedger,
        policy: LeavePolicy,
    ) -> Self {
        Self {
            repo,
            storage,
            ledger,
            policy,
        }
    }

    /// Whether a document supplied with `leave` must be kept.
    fn keeps_medical_document(&self, leave: &LeaveRequest) -> bool {
        if leave.leave_type != LeaveType::Sick {
            return false;
        }

        let days = business_days(leave.leave_start_date, leave.leave_end_date);
        debug!(business_days = days, "Computed sick leave length");
        days > self.policy.medical_document_threshold_days
    }

    async fn store_document(&self, document: DocumentUpload) -> LeaveResult<StoredDocument> {
        if document.is_empty() {
            return Err(LeaveError::invalid("File is empty or null"));
        }

        let blob_name = unique_blob_name(MEDICAL_DOCUMENT_KIND, document.file_name.as_deref());
        let stored = self
            .storage
            .upload(&blob_name, document.content_type.as_deref(), &document.data)
            .await?;

        self.ledger.stage(&stored).await;
        Ok(stored)
    }

    /// Undo an upload whose record could not be saved. If the delete fails
    /// the ledger keeps the entry and the sweeper retries after its TTL.
    async fn discard_document(&self, stored: &StoredDocument) {
        match self.storage.delete(&stored.blob_name).await {
            Ok(()) => {
                self.ledger.commit(&stored.blob_name).await;
                warn!(blob = %stored.blob_name, "Removed upload of unsaved leave request");
            }
            Err(e) => {
                error!(error = %e, blob = %stored.blob_name, "Could not remove upload of unsaved leave request");
            }
        }
    }

    async fn find_existing(&self, id: u64) -> LeaveResult<LeaveRequest> {
        self.repo
            .find(id)
            .await?
            .ok_or(LeaveError::NotFound(id))
    }

    async fn save_existing(&self, leave: &LeaveRequest) -> LeaveResult<LeaveRequest> {
        self.repo
            .save(leave)
            .await?
            .ok_or(LeaveError::NotFound(leave.id))
    }

    #[instrument(
        name = "leave_submit",
        skip(self, data, document),
        fields(employee_id = %data.employee_id)
    )]
    pub async fn submit(
        &self,
        data: LeaveRequestData,
        document: Option<DocumentUpload>,
    ) -> LeaveResult<LeaveRequest> {
        let status = data.leave_status.unwrap_or_default();
        if status == LeaveStatus::Rejected {
            return Err(LeaveError::invalid(
                "A leave request cannot be submitted as REJECTED",
            ));
        }
        let mut leave = build_leave(data, status)?;

        // both are outcomes of the lifecycle, never caller input
        leave.medical_document = None;
        leave.rejection_reason = None;

        let stored = match document {
            Some(document) if self.keeps_medical_document(&leave) => {
                Some(self.store_document(document).await?)
            }
            Some(_) => {
                debug!("Medical document not required, ignoring attachment");
                None
            }
            None => None,
        };
        leave.medical_document = stored.as_ref().map(|doc| doc.url.clone());

        match self.repo.insert(&leave).await {
            Ok(saved) => {
                if let Some(doc) = &stored {
                    self.ledger.commit(&doc.blob_name).await;
                }
                info!(leave_id = saved.id, leave_type = %saved.leave_type, "Leave request submitted");
                Ok(saved)
            }
            Err(e) => {
                if let Some(doc) = &stored {
                    self.discard_document(doc).await;
                }
                Err(e.into())
            }
        }
    }

    pub async fn get(&self, id: u64) -> LeaveResult<LeaveRequest> {
        self.find_existing(id).await
    }

    #[instrument(name = "leave_approve", skip(self))]
    pub async fn approve(&self, id: u64) -> LeaveResult<LeaveRequest> {
        let mut leave = self.find_existing(id).await?;
        leave.leave_status = leave.leave_status.try_transition(LeaveStatus::Approved)?;

        let saved = self.save_existing(&leave).await?;
        info!(leave_id = id, "Leave request approved");
        Ok(saved)
    }

    #[instrument(name = "leave_reject", skip(self))]
    pub async fn reject(&self, id: u64, reason: &str) -> LeaveResult<LeaveRequest> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(LeaveError::invalid("Rejection reason is required"));
        }

        let mut leave = self.find_existing(id).await?;
        leave.leave_status = leave.leave_status.try_transition(LeaveStatus::Rejected)?;
        leave.rejection_reason = Some(reason.to_string());

        let saved = self.save_existing(&leave).await?;
        info!(leave_id = id, "Leave request rejected");
        Ok(saved)
    }

    /// Replaces the caller-editable fields with `data`. A status in `data`
    /// must be reachable from the current one; no status keeps the current
    /// one.
    ///
    /// The medical document is never taken from `data`: the stored one is
    /// kept while the record still qualifies for it and dropped otherwise.
    /// Moving to REJECTED needs a `rejectionReason`; a REJECTED record keeps
    /// its reason unless a new one is given.
    #[instrument(name = "leave_update", skip(self, data))]
    pub async fn update(&self, id: u64, data: LeaveRequestData) -> LeaveResult<LeaveRequest> {
        let current = self.find_existing(id).await?;

        let target = data.leave_status.unwrap_or(current.leave_status);
        let status = current.leave_status.try_transition(target)?;

        let new_reason = data
            .rejection_reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .map(str::to_string);

        let rejection_reason = match status {
            LeaveStatus::Rejected => Some(
                new_reason
                    .or(current.rejection_reason)
                    .ok_or_else(|| LeaveError::invalid("Rejection reason is required"))?,
            ),
            _ => None,
        };

        let mut leave = LeaveRequest {
            id,
            created_at: current.created_at,
            rejection_reason,
            ..build_leave(data, status)?
        };

        leave.medical_document = if self.keeps_medical_document(&leave) {
            current.medical_document
        } else {
            if current.medical_document.is_some() {
                debug!(leave_id = id, "Record no longer needs its medical document");
            }
            None
        };

        let saved = self.save_existing(&leave).await?;
        info!(leave_id = id, "Leave request updated");
        Ok(saved)
    }

    #[instrument(name = "leave_delete", skip(self))]
    pub async fn delete(&self, id: u64) -> LeaveResult<String> {
        if !self.repo.delete(id).await? {
            return Err(LeaveError::NotFound(id));
        }

        info!(leave_id = id, "Leave request deleted");
        Ok(format!("Leave request {} deleted successfully", id))
    }

    pub async fn list_all(&self) -> LeaveResult<Vec<LeaveRequest>> {
        Ok(self.repo.list(&LeaveQuery::default()).await?)
    }

    pub async fn list_by_manager_and_status(
        &self,
        manager_id: &str,
        status: LeaveStatus,
    ) -> LeaveResult<Vec<LeaveRequest>> {
        let query = LeaveQuery {
            manager_id: Some(manager_id.to_string()),
            status: Some(status),
            ..Default::default()
        };
        Ok(self.repo.list(&query).await?)
    }

    /// Pending, approved or rejected requests of one employee.
    pub async fn list_for_employee(
        &self,
        employee_id: &str,
        status: LeaveStatus,
    ) -> LeaveResult<Vec<LeaveRequest>> {
        let query = LeaveQuery {
            employee_id: Some(employee_id.to_string()),
            status: Some(status),
            ..Default::default()
        };
        Ok(self.repo.list(&query).await?)
    }

    pub async fn list_by_manager(&self, manager_id: &str) -> LeaveResult<Vec<LeaveRequest>> {
        let query = LeaveQuery {
            manager_id: Some(manager_id.to_string()),
            ..Default::default()
        };
        Ok(self.repo.list(&query).await?)
    }

    pub async fn list_by_employee(&self, employee_id: &str) -> LeaveResult<Vec<LeaveRequest>> {
        let query = LeaveQuery {
            employee_id: Some(employee_id.to_string()),
            ..Default::default()
        };
        Ok(self.repo.list(&query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryLeaveRepository;
    use crate::test_support::{BrokenRepository, MemoryStorage, date, sample_data};
    use std::time::Duration;

    struct Harness {
        service: LeaveService,
        repo: InMemoryLeaveRepository,
        storage: MemoryStorage,
        ledger: UploadLedger,
    }

    fn harness_with(storage: MemoryStorage) -> Harness {
        let repo = InMemoryLeaveRepository::new();
        let (ledger, _orphans) = UploadLedger::new(Duration::from_secs(60));
        let service = LeaveService::new(
            Arc::new(repo.clone()),
            Arc::new(storage.clone()),
            ledger.clone(),
            LeavePolicy::default(),
        );
        Harness {
            service,
            repo,
            storage,
            ledger,
        }
    }

    fn harness() -> Harness {
        harness_with(MemoryStorage::default())
    }

    fn note() -> Option<DocumentUpload> {
        Some(DocumentUpload {
            file_name: Some("doctor note.pdf".into()),
            content_type: Some("application/pdf".into()),
            data: b"%PDF-1.4".to_vec(),
        })
    }

    fn sick(start: chrono::NaiveDate, end: chrono::NaiveDate) -> LeaveRequestData {
        LeaveRequestData {
            leave_type: Some(LeaveType::Sick),
            leave_start_date: Some(start),
            leave_end_date: Some(end),
            ..sample_data("E1", "M1")
        }
    }

    #[actix_web::test]
    async fn long_sick_leave_keeps_the_document() {
        let h = harness();
        // Mon 2024-03-04 .. Fri 2024-03-08: five business days
        let saved = h
            .service
            .submit(sick(date(2024, 3, 4), date(2024, 3, 8)), note())
            .await
            .unwrap();

        let url = saved.medical_document.expect("document reference");
        assert!(url.contains("medicalDocument-"));
        assert!(url.ends_with("doctor_note.pdf"));
        assert_eq!(h.storage.len(), 1);
        assert_eq!(saved.leave_status, LeaveStatus::Pending);
    }

    #[actix_web::test]
    async fn short_sick_leave_ignores_the_document() {
        let h = harness();
        let saved = h
            .service
            .submit(sick(date(2024, 3, 5), date(2024, 3, 5)), note())
            .await
            .unwrap();

        assert_eq!(saved.medical_document, None);
        assert_eq!(h.storage.len(), 0);
    }

    #[actix_web::test]
    async fn holidays_do_not_count_toward_the_threshold() {
        let h = harness();
        // Wed 2024-12-25 .. Fri 2024-12-27: Christmas leaves two business days
        let saved = h
            .service
            .submit(sick(date(2024, 12, 25), date(2024, 12, 27)), note())
            .await
            .unwrap();

        assert_eq!(saved.medical_document, None);
    }

    #[actix_web::test]
    async fn long_sick_leave_without_document_is_accepted() {
        let h = harness();
        let saved = h
            .service
            .submit(sick(date(2024, 3, 4), date(2024, 3, 8)), None)
            .await
            .unwrap();

        assert_eq!(saved.medical_document, None);
        assert_eq!(h.repo.len(), 1);
    }

    #[actix_web::test]
    async fn vacation_never_uploads() {
        let h = harness();
        let saved = h.service.submit(sample_data("E1", "M1"), note()).await.unwrap();
        assert_eq!(saved.medical_document, None);
        assert_eq!(h.storage.len(), 0);
    }

    #[actix_web::test]
    async fn empty_document_is_invalid_input() {
        let h = harness();
        let empty = Some(DocumentUpload {
            file_name: Some("empty.pdf".into()),
            content_type: None,
            data: Vec::new(),
        });

        let err = h
            .service
            .submit(sick(date(2024, 3, 4), date(2024, 3, 8)), empty)
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::InvalidInput(_)));
        assert_eq!(h.repo.len(), 0);
    }

    #[actix_web::test]
    async fn upload_failure_is_reported_and_nothing_is_stored() {
        let h = harness_with(MemoryStorage {
            fail_uploads: true,
            ..Default::default()
        });

        let err = h
            .service
            .submit(sick(date(2024, 3, 4), date(2024, 3, 8)), note())
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::Upload(_)));
        assert_eq!(h.repo.len(), 0);
    }

    #[actix_web::test]
    async fn failed_insert_removes_the_uploaded_document() {
        let storage = MemoryStorage::default();
        let (ledger, _orphans) = UploadLedger::new(Duration::from_secs(60));
        let service = LeaveService::new(
            Arc::new(BrokenRepository),
            Arc::new(storage.clone()),
            ledger,
            LeavePolicy::default(),
        );

        let err = service
            .submit(sick(date(2024, 3, 4), date(2024, 3, 8)), note())
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::Store(_)));
        assert_eq!(storage.len(), 0);
    }

    #[actix_web::test]
    async fn failed_compensation_leaves_upload_staged() {
        let storage = MemoryStorage {
            fail_deletes: true,
            ..Default::default()
        };
        let (ledger, _orphans) = UploadLedger::new(Duration::from_secs(60));
        let service = LeaveService::new(
            Arc::new(BrokenRepository),
            Arc::new(storage.clone()),
            ledger.clone(),
            LeavePolicy::default(),
        );

        service
            .submit(sick(date(2024, 3, 4), date(2024, 3, 8)), note())
            .await
            .unwrap_err();

        assert_eq!(storage.len(), 1);
        let blob = storage.blob_names().pop().unwrap();
        assert!(ledger.is_staged(&blob).await);
    }

    #[actix_web::test]
    async fn successful_submit_commits_the_upload() {
        let h = harness();
        h.service
            .submit(sick(date(2024, 3, 4), date(2024, 3, 8)), note())
            .await
            .unwrap();

        let blob = h.storage.blob_names().pop().unwrap();
        assert!(!h.ledger.is_staged(&blob).await);
    }

    #[actix_web::test]
    async fn submit_validates_required_fields() {
        let h = harness();

        let missing_type = LeaveRequestData {
            leave_type: None,
            ..sample_data("E1", "M1")
        };
        let blank_employee = sample_data("  ", "M1");
        let reversed = LeaveRequestData {
            leave_start_date: Some(date(2024, 3, 8)),
            leave_end_date: Some(date(2024, 3, 4)),
            ..sample_data("E1", "M1")
        };
        let no_end = LeaveRequestData {
            leave_end_date: None,
            ..sample_data("E1", "M1")
        };

        for data in [missing_type, blank_employee, reversed, no_end] {
            let err = h.service.submit(data, None).await.unwrap_err();
            assert!(matches!(err, LeaveError::InvalidInput(_)), "{err}");
        }
        assert_eq!(h.repo.len(), 0);
    }

    #[actix_web::test]
    async fn submit_honors_caller_status_and_drops_lifecycle_fields() {
        let h = harness();
        let data = LeaveRequestData {
            leave_status: Some(LeaveStatus::Approved),
            medical_document: Some("https://elsewhere/doc.pdf".into()),
            rejection_reason: Some("n/a".into()),
            ..sample_data("E1", "M1")
        };

        let saved = h.service.submit(data, None).await.unwrap();
        assert_eq!(saved.leave_status, LeaveStatus::Approved);
        assert_eq!(saved.medical_document, None);
        assert_eq!(saved.rejection_reason, None);

        let rejected = LeaveRequestData {
            leave_status: Some(LeaveStatus::Rejected),
            rejection_reason: Some("n/a".into()),
            ..sample_data("E2", "M1")
        };
        assert!(matches!(
            h.service.submit(rejected, None).await.unwrap_err(),
            LeaveError::InvalidInput(_)
        ));
        assert_eq!(h.repo.len(), 1);
    }

    #[actix_web::test]
    async fn approve_missing_id_is_not_found_and_changes_nothing() {
        let h = harness();
        let existing = h.service.submit(sample_data("E1", "M1"), None).await.unwrap();

        let err = h.service.approve(999).await.unwrap_err();
        assert!(matches!(err, LeaveError::NotFound(999)));
        assert_eq!(h.repo.len(), 1);
        assert_eq!(h.service.get(existing.id).await.unwrap(), existing);
    }

    #[actix_web::test]
    async fn approve_moves_pending_to_approved() {
        let h = harness();
        let leave = h.service.submit(sample_data("E1", "M1"), None).await.unwrap();

        let approved = h.service.approve(leave.id).await.unwrap();
        assert_eq!(approved.leave_status, LeaveStatus::Approved);

        // approving twice is harmless
        assert!(h.service.approve(leave.id).await.is_ok());
    }

    #[actix_web::test]
    async fn reject_records_reason_and_rereject_overwrites_it() {
        let h = harness();
        let leave = h.service.submit(sample_data("E1", "M1"), None).await.unwrap();

        let rejected = h.service.reject(leave.id, "flu").await.unwrap();
        assert_eq!(rejected.leave_status, LeaveStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("flu"));

        let again = h.service.reject(leave.id, "overlapping release").await.unwrap();
        assert_eq!(again.rejection_reason.as_deref(), Some("overlapping release"));
    }

    #[actix_web::test]
    async fn final_states_cannot_flip() {
        let h = harness();
        let a = h.service.submit(sample_data("E1", "M1"), None).await.unwrap();
        let b = h.service.submit(sample_data("E2", "M1"), None).await.unwrap();

        h.service.approve(a.id).await.unwrap();
        h.service.reject(b.id, "staffing").await.unwrap();

        assert!(matches!(
            h.service.reject(a.id, "late").await.unwrap_err(),
            LeaveError::InvalidTransition { .. }
        ));
        assert!(matches!(
            h.service.approve(b.id).await.unwrap_err(),
            LeaveError::InvalidTransition { .. }
        ));
        assert_eq!(h.service.get(a.id).await.unwrap().leave_status, LeaveStatus::Approved);
    }

    #[actix_web::test]
    async fn reject_requires_a_reason() {
        let h = harness();
        let leave = h.service.submit(sample_data("E1", "M1"), None).await.unwrap();

        let err = h.service.reject(leave.id, "   ").await.unwrap_err();
        assert!(matches!(err, LeaveError::InvalidInput(_)));
        assert!(matches!(
            h.service.reject(404, "flu").await.unwrap_err(),
            LeaveError::NotFound(404)
        ));
    }

    #[actix_web::test]
    async fn update_overwrites_fields_and_keeps_identity() {
        let h = harness();
        let leave = h.service.submit(sample_data("E1", "M1"), None).await.unwrap();

        let data = LeaveRequestData {
            leave_type: Some(LeaveType::Personal),
            leave_end_date: Some(date(2024, 3, 6)),
            comments: Some("shortened".into()),
            ..sample_data("E1", "M2")
        };
        let updated = h.service.update(leave.id, data).await.unwrap();

        assert_eq!(updated.id, leave.id);
        assert_eq!(updated.created_at, leave.created_at);
        assert_eq!(updated.manager_id, "M2");
        assert_eq!(updated.leave_type, LeaveType::Personal);
        assert_eq!(updated.leave_end_date, date(2024, 3, 6));
        assert_eq!(updated.comments.as_deref(), Some("shortened"));
        assert_eq!(updated.leave_status, LeaveStatus::Pending);
    }

    #[actix_web::test]
    async fn update_guards_status_changes() {
        let h = harness();
        let leave = h.service.submit(sample_data("E1", "M1"), None).await.unwrap();
        h.service.approve(leave.id).await.unwrap();

        let back_to_pending = LeaveRequestData {
            leave_status: Some(LeaveStatus::Pending),
            ..sample_data("E1", "M1")
        };
        assert!(matches!(
            h.service.update(leave.id, back_to_pending).await.unwrap_err(),
            LeaveError::InvalidTransition { .. }
        ));

        // no status in the payload keeps APPROVED
        let kept = h.service.update(leave.id, sample_data("E1", "M1")).await.unwrap();
        assert_eq!(kept.leave_status, LeaveStatus::Approved);

        assert!(matches!(
            h.service.update(77, sample_data("E1", "M1")).await.unwrap_err(),
            LeaveError::NotFound(77)
        ));
    }

    #[actix_web::test]
    async fn update_ignores_document_references_from_the_payload() {
        let h = harness();
        let leave = h.service.submit(sample_data("E1", "M1"), None).await.unwrap();

        let data = LeaveRequestData {
            medical_document: Some("https://elsewhere.test/doc.pdf".into()),
            ..sample_data("E1", "M1")
        };
        let updated = h.service.update(leave.id, data).await.unwrap();

        assert_eq!(updated.leave_type, LeaveType::Vacation);
        assert_eq!(updated.medical_document, None);
    }

    #[actix_web::test]
    async fn update_keeps_the_document_only_while_it_is_required() {
        let h = harness();
        let leave = h
            .service
            .submit(sick(date(2024, 3, 4), date(2024, 3, 8)), note())
            .await
            .unwrap();
        let stored = leave.medical_document.clone();
        assert!(stored.is_some());

        let still_long = LeaveRequestData {
            comments: Some("still sick".into()),
            medical_document: Some("https://elsewhere.test/doc.pdf".into()),
            ..sick(date(2024, 3, 4), date(2024, 3, 8))
        };
        let updated = h.service.update(leave.id, still_long).await.unwrap();
        assert_eq!(updated.medical_document, stored);

        let as_vacation = LeaveRequestData {
            leave_type: Some(LeaveType::Vacation),
            ..sick(date(2024, 3, 4), date(2024, 3, 8))
        };
        let updated = h.service.update(leave.id, as_vacation).await.unwrap();
        assert_eq!(updated.medical_document, None);
    }

    #[actix_web::test]
    async fn update_preserves_and_requires_rejection_reasons() {
        let h = harness();
        let rejected = h.service.submit(sample_data("E1", "M1"), None).await.unwrap();
        h.service.reject(rejected.id, "no cover").await.unwrap();

        // omitted reason keeps the stored one
        let updated = h
            .service
            .update(rejected.id, sample_data("E1", "M1"))
            .await
            .unwrap();
        assert_eq!(updated.leave_status, LeaveStatus::Rejected);
        assert_eq!(updated.rejection_reason.as_deref(), Some("no cover"));

        let pending = h.service.submit(sample_data("E2", "M1"), None).await.unwrap();
        let without_reason = LeaveRequestData {
            leave_status: Some(LeaveStatus::Rejected),
            ..sample_data("E2", "M1")
        };
        assert!(matches!(
            h.service.update(pending.id, without_reason).await.unwrap_err(),
            LeaveError::InvalidInput(_)
        ));
        assert_eq!(
            h.service.get(pending.id).await.unwrap().leave_status,
            LeaveStatus::Pending
        );

        let with_reason = LeaveRequestData {
            leave_status: Some(LeaveStatus::Rejected),
            rejection_reason: Some("overlaps release".into()),
            ..sample_data("E2", "M1")
        };
        let updated = h.service.update(pending.id, with_reason).await.unwrap();
        assert_eq!(updated.leave_status, LeaveStatus::Rejected);
        assert_eq!(updated.rejection_reason.as_deref(), Some("overlaps release"));

        // a stray reason on a pending record is dropped
        let other = h.service.submit(sample_data("E3", "M1"), None).await.unwrap();
        let stray = LeaveRequestData {
            rejection_reason: Some("typo".into()),
            ..sample_data("E3", "M1")
        };
        let updated = h.service.update(other.id, stray).await.unwrap();
        assert_eq!(updated.rejection_reason, None);
    }

    #[actix_web::test]
    async fn delete_removes_and_confirms() {
        let h = harness();
        let leave = h.service.submit(sample_data("E1", "M1"), None).await.unwrap();

        let message = h.service.delete(leave.id).await.unwrap();
        assert_eq!(message, format!("Leave request {} deleted successfully", leave.id));
        assert_eq!(h.repo.len(), 0);
        assert!(matches!(
            h.service.delete(leave.id).await.unwrap_err(),
            LeaveError::NotFound(_)
        ));
    }

    #[actix_web::test]
    async fn manager_status_listing_matches_both_fields_in_order() {
        let h = harness();
        let first = h.service.submit(sample_data("E1", "M1"), None).await.unwrap();
        let other_manager = h.service.submit(sample_data("E2", "M2"), None).await.unwrap();
        let approved = h.service.submit(sample_data("E3", "M1"), None).await.unwrap();
        let last = h.service.submit(sample_data("E4", "M1"), None).await.unwrap();
        h.service.approve(approved.id).await.unwrap();

        let pending = h
            .service
            .list_by_manager_and_status("M1", LeaveStatus::Pending)
            .await
            .unwrap();
        assert_eq!(
            pending.iter().map(|l| l.id).collect::<Vec<_>>(),
            vec![first.id, last.id]
        );

        let all_m1 = h.service.list_by_manager("M1").await.unwrap();
        assert_eq!(all_m1.len(), 3);
        assert!(all_m1.iter().all(|l| l.id != other_manager.id));
        assert_eq!(h.service.list_all().await.unwrap().len(), 4);
    }

    #[actix_web::test]
    async fn employee_listings_split_by_status() {
        let h = harness();
        let a = h.service.submit(sample_data("E1", "M1"), None).await.unwrap();
        let b = h.service.submit(sample_data("E1", "M1"), None).await.unwrap();
        h.service.submit(sample_data("E1", "M1"), None).await.unwrap();
        h.service.approve(a.id).await.unwrap();
        h.service.reject(b.id, "busy").await.unwrap();

        for status in [LeaveStatus::Pending, LeaveStatus::Approved, LeaveStatus::Rejected] {
            let found = h.service.list_for_employee("E1", status).await.unwrap();
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].leave_status, status);
        }

        assert_eq!(h.service.list_by_employee("E1").await.unwrap().len(), 3);
        assert!(h.service.list_by_employee("nobody").await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn store_failures_surface_as_store_errors() {
        let (ledger, _orphans) = UploadLedger::new(Duration::from_secs(60));
        let service = LeaveService::new(
            Arc::new(BrokenRepository),
            Arc::new(MemoryStorage::default()),
            ledger,
            LeavePolicy::default(),
        );

        assert!(matches!(service.list_all().await.unwrap_err(), LeaveError::Store(_)));
        assert!(matches!(service.approve(1).await.unwrap_err(), LeaveError::NotFound(1)));
    }
}
