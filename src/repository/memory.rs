use super::{LeaveRepository, RepositoryResult};
use crate::model::leave_request::{LeaveQuery, LeaveRequest};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// In-memory leave store.
///
/// Records live in a `BTreeMap` keyed by id, so iteration order is insertion
/// order. Cloning shares the same underlying data.
#[derive(Clone, Default)]
pub struct InMemoryLeaveRepository {
    data: Arc<RwLock<MemoryData>>,
}

#[derive(Default)]
struct MemoryData {
    leaves: BTreeMap<u64, LeaveRequest>,
    next_id: u64,
}

impl InMemoryLeaveRepository {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.data
            .read()
            .map(|data| data.leaves.len())
            .unwrap_or_default()
    }
}

// A poisoned lock only means another request panicked mid-write; the map
// itself is still usable.
fn write(data: &RwLock<MemoryData>) -> std::sync::RwLockWriteGuard<'_, MemoryData> {
    data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn read(data: &RwLock<MemoryData>) -> std::sync::RwLockReadGuard<'_, MemoryData> {
    data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl LeaveRepository for InMemoryLeaveRepository {
    async fn insert(&self, leave: &LeaveRequest) -> RepositoryResult<LeaveRequest> {
        let mut data = write(&self.data);
        data.next_id += 1;

        let stored = LeaveRequest {
            id: data.next_id,
            created_at: Some(Utc::now()),
            ..leave.clone()
        };
        data.leaves.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find(&self, id: u64) -> RepositoryResult<Option<LeaveRequest>> {
        Ok(read(&self.data).leaves.get(&id).cloned())
    }

    async fn save(&self, leave: &LeaveRequest) -> RepositoryResult<Option<LeaveRequest>> {
        let mut data = write(&self.data);
        let Some(existing) = data.leaves.get_mut(&leave.id) else {
            return Ok(None);
        };

        *existing = LeaveRequest {
            created_at: existing.created_at,
            ..leave.clone()
        };
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: u64) -> RepositoryResult<bool> {
        Ok(write(&self.data).leaves.remove(&id).is_some())
    }

    async fn list(&self, query: &LeaveQuery) -> RepositoryResult<Vec<LeaveRequest>> {
        Ok(read(&self.data)
            .leaves
            .values()
            .filter(|leave| query.matches(leave))
            .cloned()
            .collect())
    }
}
