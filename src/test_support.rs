//! Shared fixtures for unit and HTTP tests.

use crate::model::leave_request::{
    LeaveQuery, LeaveRequest, LeaveRequestData, LeaveStatus, LeaveType,
};
use crate::repository::{LeaveRepository, RepositoryError, RepositoryResult};
use crate::storage::{DocumentStorage, StorageError, StoredDocument};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn sample_data(employee_id: &str, manager_id: &str) -> LeaveRequestData {
    LeaveRequestData {
        employee_id: employee_id.to_string(),
        first_name: "John".into(),
        last_name: "Doe".into(),
        email: "john.doe@company.com".into(),
        position: "Engineer".into(),
        phone: "+8801712345678".into(),
        manager_id: manager_id.to_string(),
        manager_name: "Jane Roe".into(),
        manager_email: "jane.roe@company.com".into(),
        leave_type: Some(LeaveType::Vacation),
        // Mon 2024-03-04 .. Fri 2024-03-08
        leave_start_date: Some(date(2024, 3, 4)),
        leave_end_date: Some(date(2024, 3, 8)),
        leave_reason: Some("family trip".into()),
        ..Default::default()
    }
}

pub fn sample_leave(employee_id: &str, manager_id: &str) -> LeaveRequest {
    LeaveRequest {
        id: 0,
        employee_id: employee_id.to_string(),
        first_name: "John".into(),
        last_name: "Doe".into(),
        email: "john.doe@company.com".into(),
        position: "Engineer".into(),
        phone: "+8801712345678".into(),
        manager_id: manager_id.to_string(),
        manager_name: "Jane Roe".into(),
        manager_email: "jane.roe@company.com".into(),
        leave_type: LeaveType::Vacation,
        leave_status: LeaveStatus::Pending,
        leave_start_date: date(2024, 3, 4),
        leave_end_date: date(2024, 3, 8),
        leave_reason: None,
        comments: None,
        duration_type: None,
        duration: None,
        medical_document: None,
        rejection_reason: None,
        created_at: None,
    }
}

/// Document storage kept in a map; can be told to fail.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    pub(crate) blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    pub fail_uploads: bool,
    pub fail_deletes: bool,
}

impl MemoryStorage {
    pub fn contains(&self, blob_name: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(blob_name)
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn blob_names(&self) -> Vec<String> {
        self.blobs.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl DocumentStorage for MemoryStorage {
    async fn upload(
        &self,
        blob_name: &str,
        _content_type: Option<&str>,
        data: &[u8],
    ) -> Result<StoredDocument, StorageError> {
        if self.fail_uploads {
            return Err(StorageError::Rejected {
                status: 503,
                blob: blob_name.to_string(),
            });
        }
        self.blobs
            .lock()
            .unwrap()
            .insert(blob_name.to_string(), data.to_vec());
        Ok(StoredDocument {
            blob_name: blob_name.to_string(),
            url: format!("https://blobs.test/docs/{}", blob_name),
        })
    }

    async fn delete(&self, blob_name: &str) -> Result<(), StorageError> {
        if self.fail_deletes {
            return Err(StorageError::Rejected {
                status: 503,
                blob: blob_name.to_string(),
            });
        }
        self.blobs.lock().unwrap().remove(blob_name);
        Ok(())
    }
}

/// Repository whose writes always fail.
#[derive(Clone, Default)]
pub struct BrokenRepository;

#[async_trait]
impl LeaveRepository for BrokenRepository {
    async fn insert(&self, _leave: &LeaveRequest) -> RepositoryResult<LeaveRequest> {
        Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn find(&self, _id: u64) -> RepositoryResult<Option<LeaveRequest>> {
        Ok(None)
    }

    async fn save(&self, _leave: &LeaveRequest) -> RepositoryResult<Option<LeaveRequest>> {
        Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn delete(&self, _id: u64) -> RepositoryResult<bool> {
        Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn list(&self, _query: &LeaveQuery) -> RepositoryResult<Vec<LeaveRequest>> {
        Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }
}
