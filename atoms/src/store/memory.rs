use super::LedgerStore;
use crate::assignments::{Assignment, AssignmentUpdate, Status};
use crate::error::StoreError;
use crate::users::User;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<u32, User>,
    // keyed by (dossier_id, task_id), mirroring the DynamoDB PK/SK
    assignments: BTreeMap<(String, u32), Assignment>,
}

/// In-process ledger. Each mutation runs under a single write lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        let tables = Tables {
            users: users.into_iter().map(|u| (u.user_id, u)).collect(),
            assignments: BTreeMap::new(),
        };
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Number of ledger rows
    pub async fn assignment_count(&self) -> usize {
        self.tables.read().await.assignments.len()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn get_user(&self, user_id: u32) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn find_assignment(
        &self,
        task_id: u32,
        dossier_id: &str,
    ) -> Result<Option<Assignment>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .assignments
            .get(&(dossier_id.to_string(), task_id))
            .cloned())
    }

    async fn upsert_assignment(
        &self,
        task_id: u32,
        dossier_id: &str,
        assignee_id: u32,
    ) -> Result<Assignment, StoreError> {
        let mut tables = self.tables.write().await;
        let row = tables
            .assignments
            .entry((dossier_id.to_string(), task_id))
            .and_modify(|a| {
                a.assignee_id = assignee_id;
                a.status = Status::Todo;
            })
            .or_insert_with(|| Assignment {
                assignment_id: uuid::Uuid::new_v4().to_string(),
                task_id,
                dossier_id: dossier_id.to_string(),
                assignee_id,
                status: Status::Todo,
                assigned_at: chrono::Utc::now().to_rfc3339(),
            });
        Ok(row.clone())
    }

    async fn update_assignment(
        &self,
        task_id: u32,
        dossier_id: &str,
        expected_assignee: u32,
        update: AssignmentUpdate,
    ) -> Result<Option<Assignment>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables
            .assignments
            .get_mut(&(dossier_id.to_string(), task_id))
        else {
            return Ok(None);
        };
        if row.assignee_id != expected_assignee {
            return Ok(None);
        }
        if let Some(assignee_id) = update.assignee_id {
            row.assignee_id = assignee_id;
        }
        row.status = update.status;
        Ok(Some(row.clone()))
    }

    async fn list_assignments_for_user(
        &self,
        user_id: u32,
    ) -> Result<Vec<Assignment>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .assignments
            .values()
            .filter(|a| a.assignee_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_assignments_for_dossier(
        &self,
        dossier_id: &str,
    ) -> Result<Vec<Assignment>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .assignments
            .values()
            .filter(|a| a.dossier_id == dossier_id)
            .cloned()
            .collect())
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>, StoreError> {
        Ok(self.tables.read().await.assignments.values().cloned().collect())
    }
}
