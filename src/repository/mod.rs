//! Persistence for leave requests.
//!
//! The lifecycle only talks to [`LeaveRepository`]; the MySQL store is used in
//! production and the in-memory store for local runs and tests.

mod memory;
mod mysql;

pub use memory::InMemoryLeaveRepository;
pub use mysql::MySqlLeaveRepository;

use crate::model::leave_request::{LeaveQuery, LeaveRequest};
use async_trait::async_trait;
use derive_more::Display;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[derive(Debug, Display)]
pub enum RepositoryError {
    #[display(fmt = "Database error: {}", _0)]
    Database(sqlx::Error),

    /// A stored row could not be mapped back to a leave request
    #[display(fmt = "Corrupt leave row: {}", _0)]
    Corrupt(String),
}

impl std::error::Error for RepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RepositoryError::Database(e) => Some(e),
            RepositoryError::Corrupt(_) => None,
        }
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        RepositoryError::Database(e)
    }
}

/// Store of leave request records.
///
/// Listing is always ordered by id, which is insertion order.
#[async_trait]
pub trait LeaveRepository: Send + Sync {
    /// Persists a new record. The `id` and `created_at` of `leave` are
    /// ignored and assigned by the store.
    async fn insert(&self, leave: &LeaveRequest) -> RepositoryResult<LeaveRequest>;

    async fn find(&self, id: u64) -> RepositoryResult<Option<LeaveRequest>>;

    /// Overwrites every mutable column of an existing record.
    /// Returns `None` if no record has `leave.id`.
    async fn save(&self, leave: &LeaveRequest) -> RepositoryResult<Option<LeaveRequest>>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: u64) -> RepositoryResult<bool>;

    async fn list(&self, query: &LeaveQuery) -> RepositoryResult<Vec<LeaveRequest>>;
}
